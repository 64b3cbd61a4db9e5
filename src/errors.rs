use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackupDrError>;

/// Error enum for the on-demand backup tool using thiserror
#[derive(Error, Debug)]
pub enum BackupDrError {
    // Failures reported by the management API
    #[error("Failed authentication - ensure your access token is valid and fresh")]
    AuthenticationFailed,

    #[error("Unexpected response from the management API: {0}")]
    MalformedResponse(String),

    #[error("You do not have access to invoke BackupNow")]
    AccessDenied,

    // Name-resolution misses, one per entity kind
    #[error("Failed to retrieve SLA template '{0}'")]
    TemplateNotFound(String),

    #[error("Failed to retrieve SLA template policy '{policy}' for SLA template '{template}'")]
    PolicyNotFound { policy: String, template: String },

    #[error("Failed to retrieve application '{0}'")]
    ApplicationNotFound(String),

    #[error("Failed to initiate backup of application '{app}' (HTTP {status}: {body})")]
    BackupRejected {
        app: String,
        status: u16,
        body: String,
    },

    // Transport failure on the trigger call itself; the request may
    // already have reached the service
    #[error("Failed to confirm backup of application '{app}' ({source})")]
    TriggerUnconfirmed {
        app: String,
        #[source]
        source: reqwest::Error,
    },

    // Local failures
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // Automatic conversions from library errors
    #[error(transparent)]
    HttpError(#[from] reqwest::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    DialogueError(#[from] dialoguer::Error),
}

impl BackupDrError {
    /// True when the failure happened before the backup-trigger call,
    /// i.e. the service is guaranteed not to have started a backup.
    pub fn is_pre_trigger(&self) -> bool {
        !matches!(
            self,
            BackupDrError::BackupRejected { .. } | BackupDrError::TriggerUnconfirmed { .. }
        )
    }
}
