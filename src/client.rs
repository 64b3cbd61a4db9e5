use crate::config::Config;
use crate::errors::{BackupDrError, Result};
use crate::models::{ApplicationItem, BackupRequest, ItemList, SessionInfo, SlaItem, TriggerReply};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Header carrying the session ID on every call after login.
pub const SESSION_HEADER: &str = "backupdr-management-session";

/// Entitlement a session must hold to invoke BackupNow.
pub const BACKUP_ACCESS_RIGHT: &str = "Access to Backup & Recover";

/// Unauthenticated entry point for the management API. Consumed by
/// `open_session`, which upgrades it to a [`ManagementSession`].
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_url.clone(),
            access_token: config.access_token.clone(),
        }
    }

    /// Exchanges the bearer credential for a management session. The session
    /// is short-lived and simply dropped afterwards; the service expires it.
    pub async fn open_session(self) -> Result<ManagementSession> {
        let url = format!("{}/session", self.base_url);
        debug!(url = %url, "establishing management session");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            debug!(status = %response.status(), "session request rejected");
            return Err(BackupDrError::AuthenticationFailed);
        }

        let session: SessionInfo = match response.json().await {
            Ok(session) => session,
            Err(err) if err.is_decode() => {
                return Err(BackupDrError::MalformedResponse(format!(
                    "session response is not valid JSON: {err}"
                )))
            }
            Err(err) => return Err(err.into()),
        };

        let session_id = session.id.ok_or_else(|| {
            BackupDrError::MalformedResponse(
                "failed to get session ID on authentication".to_string(),
            )
        })?;

        info!(session = %session_id, "management session established");

        Ok(ManagementSession {
            http: self.http,
            base_url: self.base_url,
            session_id,
            rights: session.rights.into_iter().map(|right| right.id).collect(),
        })
    }
}

/// An authenticated management session. Holds the session ID and the
/// entitlements the service granted; valid for this process run only.
#[derive(Debug)]
pub struct ManagementSession {
    http: reqwest::Client,
    base_url: String,
    session_id: String,
    rights: Vec<String>,
}

impl ManagementSession {
    pub fn has_backup_access(&self) -> bool {
        self.rights.iter().any(|right| right == BACKUP_ACCESS_RIGHT)
    }

    pub async fn templates(&self) -> Result<Vec<SlaItem>> {
        self.get_items("slt").await
    }

    pub async fn policies(&self, template_id: u64) -> Result<Vec<SlaItem>> {
        self.get_items(&format!("slt/{template_id}/policy")).await
    }

    pub async fn applications(&self) -> Result<Vec<ApplicationItem>> {
        self.get_items("application").await
    }

    /// Issues the backup request and hands back status and body verbatim;
    /// the caller decides which statuses count as accepted.
    pub async fn trigger_backup(
        &self,
        app_id: u64,
        request: &BackupRequest,
    ) -> Result<TriggerReply> {
        let url = format!("{}/application/{}/backup", self.base_url, app_id);
        info!(url = %url, policy = request.policy.id, "requesting on-demand backup");

        let response = self
            .http
            .post(&url)
            .header(SESSION_HEADER, self.session_header())
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(TriggerReply { status, body })
    }

    /// Lookup responses that cannot be parsed resolve like an empty list,
    /// so the caller reports the entity as not found. Transport failures
    /// still surface as errors.
    async fn get_items<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, "lookup request");

        let response = self
            .http
            .get(&url)
            .header(SESSION_HEADER, self.session_header())
            .send()
            .await?;

        let status = response.status();
        match response.json::<ItemList<T>>().await {
            Ok(list) => Ok(list.items),
            Err(err) if err.is_decode() => {
                debug!(url = %url, status = %status, error = %err, "unparseable lookup response, treating as empty");
                Ok(Vec::new())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn session_header(&self) -> String {
        format!("Actifio {}", self.session_id)
    }
}
