use crate::client::ApiClient;
use crate::config::{self, Config};
use crate::errors::{BackupDrError, Result};
use crate::models::BackupRequest;
use crate::ui;
use serde::Serialize;
use tracing::{info, warn};

/// Result contract emitted on stdout: whether a backup job was started and
/// a human-readable message.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub changed: bool,
    pub msg: String,
}

impl Outcome {
    fn initiated(app_name: &str) -> Self {
        Self {
            changed: true,
            msg: format!("Backup initiated for application '{app_name}'"),
        }
    }

    fn would_initiate(app_name: &str) -> Self {
        Self {
            changed: true,
            msg: format!("Backup of application '{app_name}' would be initiated"),
        }
    }

    pub fn failure(err: &BackupDrError) -> Self {
        Self {
            changed: false,
            msg: err.to_string(),
        }
    }
}

/// Entry point for the run command: loads configuration, applies the
/// run-level flag overrides, then executes. Configuration failures travel
/// the same `Result` as every other failure so the caller renders a single
/// contract for all of them.
pub async fn run_backup(
    api_url: Option<String>,
    access_token: Option<String>,
    template: Option<String>,
    policy: Option<String>,
    app: Option<String>,
    label: Option<String>,
    check_mode: bool,
) -> Result<Outcome> {
    let mut config = Config::load(api_url, access_token)?;
    config.apply_run_overrides(template, policy, app, label);
    BackupRun::new(config, check_mode).execute().await
}

/// One on-demand backup invocation: session, entitlement check, the three
/// name lookups, then the trigger call. Strictly sequential, nothing retried;
/// any miss aborts before the backup request goes out.
pub struct BackupRun {
    config: Config,
    check_mode: bool,
}

impl BackupRun {
    pub fn new(config: Config, check_mode: bool) -> Self {
        Self { config, check_mode }
    }

    pub async fn execute(self) -> Result<Outcome> {
        if self.check_mode {
            return self.check_only();
        }

        let interactive = ui::stdin_is_interactive();
        if !interactive {
            // Without a terminal every name must be known before any call.
            self.require_names()?;
        }

        let session = ApiClient::new(&self.config).open_session().await?;
        if !session.has_backup_access() {
            return Err(BackupDrError::AccessDenied);
        }

        let templates = session.templates().await?;
        let template_name = match self.config.template_name.clone() {
            Some(name) => name,
            None => ui::pick_template_name(&templates)?,
        };
        let template_id = templates
            .iter()
            .find(|template| template.name == template_name)
            .map(|template| template.id)
            .ok_or_else(|| BackupDrError::TemplateNotFound(template_name.clone()))?;
        info!(template = %template_name, id = template_id, "resolved SLA template");

        let policies = session.policies(template_id).await?;
        let policy_name = match self.config.policy_name.clone() {
            Some(name) => name,
            None => ui::pick_policy_name(&policies, &template_name)?,
        };
        let policy_id = policies
            .iter()
            .find(|policy| policy.name == policy_name)
            .map(|policy| policy.id)
            .ok_or_else(|| BackupDrError::PolicyNotFound {
                policy: policy_name.clone(),
                template: template_name.clone(),
            })?;
        info!(policy = %policy_name, id = policy_id, "resolved SLA policy");

        let applications = session.applications().await?;
        let app_name = match self.config.app_name.clone() {
            Some(name) => name,
            None if interactive => ui::pick_application_name(&applications)?,
            None => config::short_hostname().ok_or_else(missing_app_name)?,
        };
        let app_id = applications
            .iter()
            .find(|app| app.name == app_name)
            .map(|app| app.id)
            .ok_or_else(|| BackupDrError::ApplicationNotFound(app_name.clone()))?;
        info!(app = %app_name, id = app_id, "resolved application");

        let request = BackupRequest::new(policy_id).with_label(self.config.label.clone());
        let reply = session
            .trigger_backup(app_id, &request)
            .await
            .map_err(|err| unconfirmed_trigger(&app_name, err))?;

        if !(200..=204).contains(&reply.status) {
            warn!(app = %app_name, status = reply.status, "backup request rejected");
            return Err(BackupDrError::BackupRejected {
                app: app_name,
                status: reply.status,
                body: reply.body,
            });
        }

        info!(app = %app_name, status = reply.status, "backup initiated");
        Ok(Outcome::initiated(&app_name))
    }

    /// Check mode reports the would-be change without contacting the
    /// service; it also never prompts.
    fn check_only(&self) -> Result<Outcome> {
        let app_name = self.require_names()?;
        info!(app = %app_name, "check mode, not contacting the service");
        Ok(Outcome::would_initiate(&app_name))
    }

    /// Batch use and check mode need every name up front. The application
    /// name may still fall back to the short hostname.
    fn require_names(&self) -> Result<String> {
        require_name(
            self.config.template_name.as_deref(),
            "SLA template name",
            "--template or BACKUPDR_TEMPLATE_NAME",
        )?;
        require_name(
            self.config.policy_name.as_deref(),
            "SLA policy name",
            "--policy or BACKUPDR_POLICY_NAME",
        )?;
        self.app_name_or_hostname().ok_or_else(missing_app_name)
    }

    fn app_name_or_hostname(&self) -> Option<String> {
        self.config.app_name.clone().or_else(config::short_hostname)
    }
}

fn require_name(value: Option<&str>, what: &str, hint: &str) -> Result<String> {
    value
        .map(|v| v.to_string())
        .ok_or_else(|| BackupDrError::ConfigurationError(format!("missing {what}; pass {hint}")))
}

fn missing_app_name() -> BackupDrError {
    BackupDrError::ConfigurationError(
        "missing application name; pass --app or BACKUPDR_APP_NAME".to_string(),
    )
}

/// Once the trigger call is on the wire a transport failure no longer means
/// the service did nothing, so it must not classify as pre-trigger.
fn unconfirmed_trigger(app_name: &str, err: BackupDrError) -> BackupDrError {
    match err {
        BackupDrError::HttpError(source) => BackupDrError::TriggerUnconfirmed {
            app: app_name.to_string(),
            source,
        },
        other => other,
    }
}
