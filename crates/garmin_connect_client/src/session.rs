//! On-disk persistence for the authenticated session token.

use crate::{GarminError, SessionToken};
use std::path::{Path, PathBuf};

/// Persists the session token between runs so a fresh credential login is
/// only needed when the service rejects the stored token.
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored token. A missing or undecodable file is a signal
    /// ("no usable session"), not an error; validity against the service is
    /// only determined at use time.
    pub fn load(&self) -> Option<SessionToken> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "stored session undecodable");
                None
            }
        }
    }

    /// Overwrite any previously stored token.
    pub fn save(&self, token: &SessionToken) -> Result<(), GarminError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir).map_err(|e| GarminError::Config(e.to_string()))?;
        }
        let raw = serde_json::to_string(token).map_err(|e| GarminError::Config(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| GarminError::Config(e.to_string()))
    }
}
