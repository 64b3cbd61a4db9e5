use crate::errors::{BackupDrError, Result};
use std::env;

/// Runtime configuration for a single invocation. The API URL and token are
/// required and come from CLI flags with environment fallback; the lookup
/// names may additionally be filled in later by interactive selection.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub access_token: String,
    pub template_name: Option<String>,
    pub policy_name: Option<String>,
    pub app_name: Option<String>,
    pub label: Option<String>,
}

impl Config {
    pub fn load(api_url: Option<String>, access_token: Option<String>) -> Result<Self> {
        dotenv::dotenv().ok();

        let api_url = required(
            flag_or_env(api_url, "BACKUPDR_API_URL").map(|v| normalize_api_url(&v)),
            "management API base URL (--api-url or BACKUPDR_API_URL)",
        )?;

        let access_token = required(
            flag_or_env(access_token, "BACKUPDR_ACCESS_TOKEN").map(|v| normalize_token(&v)),
            "access token (--access-token or BACKUPDR_ACCESS_TOKEN)",
        )?;

        Ok(Config {
            api_url,
            access_token,
            template_name: flag_or_env(None, "BACKUPDR_TEMPLATE_NAME"),
            policy_name: flag_or_env(None, "BACKUPDR_POLICY_NAME"),
            app_name: flag_or_env(None, "BACKUPDR_APP_NAME"),
            label: flag_or_env(None, "BACKUPDR_LABEL"),
        })
    }

    /// CLI flags take precedence over values picked up from the environment.
    pub fn apply_run_overrides(
        &mut self,
        template: Option<String>,
        policy: Option<String>,
        app: Option<String>,
        label: Option<String>,
    ) {
        if template.is_some() {
            self.template_name = template;
        }
        if policy.is_some() {
            self.policy_name = policy;
        }
        if app.is_some() {
            self.app_name = app;
        }
        if label.is_some() {
            self.label = label;
        }
    }
}

/// First DNS label of the machine hostname, the default application name
/// when none is configured.
pub fn short_hostname() -> Option<String> {
    let raw = hostname::get().ok()?.to_string_lossy().to_string();
    let short = raw.split('.').next().unwrap_or("").trim();
    if short.is_empty() {
        None
    } else {
        Some(short.to_string())
    }
}

fn flag_or_env(flag: Option<String>, var: &str) -> Option<String> {
    flag.or_else(|| env::var(var).ok())
        .filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, hint: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(BackupDrError::ConfigurationError(format!(
            "missing {hint}"
        ))),
    }
}

/// The service rejects doubled slashes in paths, so the base URL is stored
/// without any trailing ones.
fn normalize_api_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Tokens pasted from `gcloud auth print-access-token` tend to carry a
/// trailing newline.
fn normalize_token(raw: &str) -> String {
    raw.trim_end().to_string()
}
