use super::token::AuthorizationToken;
use crate::error::AppResult;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persistence for the OAuth credential
pub trait CredentialStore {
    /// `Ok(None)` when nothing has been stored yet
    fn load(&self) -> AppResult<Option<AuthorizationToken>>;

    /// Overwrite whatever was stored before
    fn save(&self, token: &AuthorizationToken) -> AppResult<()>;
}

/// Token kept as JSON in a single file
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> AppResult<Option<AuthorizationToken>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let token = AuthorizationToken::from_json(&contents)?;
        Ok(Some(token))
    }

    fn save(&self, token: &AuthorizationToken) -> AppResult<()> {
        fs::write(&self.path, token.to_json()?)?;
        debug!("Saved token to {}", self.path.display());
        Ok(())
    }
}
