use clap::{Parser, Subcommand};
use tracing::{info, warn};

mod backup;
mod client;
mod config;
mod errors;
mod list;
mod models;
mod ui;

#[derive(Parser)]
#[command(name = "backupdr-ondemand")]
#[command(version)]
#[command(about = "Trigger on-demand backups in Google Backup and DR", long_about = None)]
struct Cli {
    /// Management console API base URL (or BACKUPDR_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// OAuth2 access token (or BACKUPDR_ACCESS_TOKEN)
    #[arg(long, global = true)]
    access_token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trigger an on-demand backup of an application
    Run {
        /// SLA template name (or BACKUPDR_TEMPLATE_NAME)
        #[arg(short, long)]
        template: Option<String>,
        /// Policy name within the SLA template (or BACKUPDR_POLICY_NAME)
        #[arg(short, long)]
        policy: Option<String>,
        /// Application name (or BACKUPDR_APP_NAME, default: this host)
        #[arg(short, long)]
        app: Option<String>,
        /// Label to attach to the backup job
        #[arg(short, long)]
        label: Option<String>,
        /// Report what would change without contacting the service
        #[arg(long)]
        check: bool,
    },
    /// List SLA templates visible to the session
    Templates {
        /// Return data as JSON (for scripting)
        #[arg(short, long)]
        json: bool,
    },
    /// List the policies of one SLA template
    Policies {
        /// SLA template name (or BACKUPDR_TEMPLATE_NAME)
        #[arg(short, long)]
        template: Option<String>,
        /// Return data as JSON (for scripting)
        #[arg(short, long)]
        json: bool,
    },
    /// List applications visible to the session
    Apps {
        /// Return data as JSON (for scripting)
        #[arg(short, long)]
        json: bool,
    },
    /// Generate sample .env file
    Init,
}

fn init_logging() -> Result<(), crate::errors::BackupDrError> {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt::writer::MakeWriterExt, EnvFilter};

    // Create logs directory if it doesn't exist
    std::fs::create_dir_all("./logs")?;

    let file_appender = rolling::daily("./logs", "backupdr-ondemand.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the result object; diagnostics go to stderr and the file
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr.and(non_blocking))
        .with_env_filter(env_filter)
        .init();

    // Keep the guard alive
    std::mem::forget(_guard);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging first
    init_logging()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            template,
            policy,
            app,
            label,
            check,
        } => {
            // Every run failure, configuration included, is reported through
            // the result object on stdout.
            let result = backup::run_backup(
                cli.api_url,
                cli.access_token,
                template,
                policy,
                app,
                label,
                check,
            )
            .await;

            match result {
                Ok(outcome) => println!("{}", serde_json::to_string_pretty(&outcome)?),
                Err(err) => {
                    if err.is_pre_trigger() {
                        warn!(error = %err, "aborted before the backup request was issued");
                    } else {
                        warn!(error = %err, "backup request was sent but no job was confirmed");
                    }
                    let outcome = backup::Outcome::failure(&err);
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                    std::process::exit(1);
                }
            }
        }
        Commands::Templates { json } => {
            let config = config::Config::load(cli.api_url, cli.access_token)?;
            list::list_templates(config, json).await?;
        }
        Commands::Policies { template, json } => {
            let config = config::Config::load(cli.api_url, cli.access_token)?;
            list::list_policies(config, template, json).await?;
        }
        Commands::Apps { json } => {
            let config = config::Config::load(cli.api_url, cli.access_token)?;
            list::list_applications(config, json).await?;
        }
        Commands::Init => {
            init_env_file()?;
        }
    }

    Ok(())
}

fn init_env_file() -> Result<(), crate::errors::BackupDrError> {
    use std::fs;
    use std::path::Path;

    let env_file = ".env";
    if Path::new(env_file).exists() {
        warn!(file = %env_file, ".env file already exists, not overwriting");
        return Ok(());
    }

    let content = r#"# Google Backup and DR on-demand backup configuration
# Fill in your actual values below

# Management console API base URL
BACKUPDR_API_URL=https://bmc-000000-dot-us-central1.backupdr.googleusercontent.com/actifio

# OAuth2 access token, e.g. from: gcloud auth print-access-token
BACKUPDR_ACCESS_TOKEN=your_access_token_here

# Names used by the run command (flags override these)
BACKUPDR_TEMPLATE_NAME=snapshot_B-1d-14d
BACKUPDR_POLICY_NAME=daily
# BACKUPDR_APP_NAME=my-application

# Optional label attached to triggered jobs
# BACKUPDR_LABEL=adhoc
"#;

    fs::write(env_file, content)?;
    info!(file = %env_file, "Created sample .env file, please edit with your actual credentials");

    Ok(())
}
