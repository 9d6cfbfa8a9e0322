//! On-disk session directory, reused across restarts to avoid re-pairing.

use super::error::Result;
use std::path::{Path, PathBuf};

/// Credential directory for one client id: `<root>/session-<client_id>`.
#[derive(Debug, Clone)]
pub struct SessionStore {
    client_id: String,
    dir: PathBuf,
}

impl SessionStore {
    /// Create the directory tree if absent.
    pub fn open(root: impl AsRef<Path>, client_id: &str) -> Result<Self> {
        let dir = root.as_ref().join(format!("session-{}", sanitize(client_id)));

        if !dir.exists() {
            tracing::debug!("Session: creating session directory {}", dir.display());
            std::fs::create_dir_all(&dir)?;
        }

        Ok(Self {
            client_id: client_id.to_string(),
            dir,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a file inside the session directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// True once a transport has written anything into the session directory.
    pub fn has_credentials(&self) -> bool {
        std::fs::read_dir(&self.dir)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }
}

/// Keep client ids usable as a single path component.
fn sanitize(client_id: &str) -> String {
    client_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
