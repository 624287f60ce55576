use std::sync::Arc;

use tracing::error;

use foodconnect_db::Database;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub settings: Settings,
}

/// Runtime switches. The defaults reproduce the open, lenient behavior clients rely on today.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    /// Include the underlying error text in 500 responses.
    pub expose_errors: bool,
    /// Require `X-User-Id` to match the owner on every mutating route.
    pub enforce_ownership: bool,
    /// Reject status changes the lifecycle table does not allow.
    pub strict_transitions: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            expose_errors: true,
            enforce_ownership: false,
            strict_transitions: false,
        }
    }
}

impl AppStateInner {
    pub fn new(db: Database, settings: Settings) -> AppState {
        Arc::new(Self { db, settings })
    }

    /// Build the `map_err` adapter for an unexpected failure: log it and answer 500
    /// with the handler's message.
    pub fn internal(&self, message: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError + use<> {
        let expose = self.settings.expose_errors;
        move |err| {
            error!("{}: {:#}", message, err);
            ApiError::Internal {
                message,
                detail: expose.then(|| format!("{:#}", err)),
            }
        }
    }
}

/// Run blocking storage (or hashing) work off the async runtime.
pub async fn blocking<F, T>(state: &AppState, f: F) -> anyhow::Result<T>
where
    F: FnOnce(&AppStateInner) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))?
}
