//! Persistence of the Matrix login between runs.
//!
//! The session directory holds:
//! - `session`: JSON file with the user session and the last sync token
//! - `sqlite`: the state store of the Matrix SDK, encrypted with the passphrase

use std::path::Path;

use anyhow::{Context, bail};
use log::{debug, trace};
use matrix_sdk::authentication::matrix;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::utils::get_path;

/// Content of the session file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Session {
    /// The Matrix user session containing authentication credentials.
    user_session: matrix::MatrixSession,

    /// The latest sync token, omitted until the first sync.
    #[serde(skip_serializing_if = "Option::is_none")]
    sync_token: Option<String>,
}

/// Session directory of the bot.
///
/// # Examples
///
/// ```no_run
/// use herald::matrix::session::SessionStore;
///
/// # async fn example() -> Result<(), anyhow::Error> {
/// let store = SessionStore::open("/var/lib/herald/session").await?;
/// if !store.has_session() {
///     // first start, log in with the password
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionStore {
    /// Session loaded at start, if any
    session: Option<Session>,
    /// `dir_path/sqlite`
    sqlite_path: String,
    /// `dir_path/session`
    session_path: String,
}

impl SessionStore {
    /// Opens the session directory, creating it when missing.
    ///
    /// A missing or unreadable session file is not an error: the store then
    /// starts without a session and the bot logs in again.
    pub async fn open(dir_path: &str) -> Result<SessionStore, anyhow::Error> {
        debug!("opening session directory {}", dir_path);

        fs::create_dir_all(dir_path)
            .await
            .with_context(|| format!("cannot create session directory {}", dir_path))?;

        let sqlite_path = get_path(dir_path, "sqlite");
        let session_path = get_path(dir_path, "session");

        let session = match SessionStore::read_session(&session_path).await {
            Ok(session) => Some(session),
            Err(e) => {
                debug!("no usable session: {}", e);
                None
            }
        };

        Ok(SessionStore {
            session,
            sqlite_path,
            session_path,
        })
    }

    async fn read_session(session_path: &str) -> Result<Session, anyhow::Error> {
        if !Path::new(session_path).exists() {
            bail!("session file does not exist");
        }

        let session_data = fs::read_to_string(session_path).await?;
        let session: Session = serde_json::from_str(&session_data)?;
        Ok(session)
    }

    /// Whether a session was found when the store was opened.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn sqlite_path(&self) -> &str {
        &self.sqlite_path
    }

    pub fn user_session(&self) -> Option<&matrix::MatrixSession> {
        self.session.as_ref().map(|s| &s.user_session)
    }

    /// Token to resume the sync from, if one was stored.
    pub fn sync_token(&self) -> Option<String> {
        self.session.as_ref().and_then(|s| s.sync_token.clone())
    }

    /// Stores the sync token next to the user session.
    ///
    /// # Errors
    ///
    /// Fails when the session file is missing, invalid or cannot be written.
    pub async fn persist_sync_token(&self, sync_token: String) -> anyhow::Result<()> {
        trace!("persist sync token {}", sync_token);

        let mut session = SessionStore::read_session(&self.session_path).await?;
        session.sync_token = Some(sync_token);
        fs::write(&self.session_path, serde_json::to_string(&session)?).await?;

        Ok(())
    }

    /// Writes a new session file, without sync token.
    pub async fn persist_user_session(&self, user_session: &matrix::MatrixSession) -> anyhow::Result<()> {
        trace!("persist user session");

        let session = Session {
            user_session: user_session.clone(),
            sync_token: None,
        };
        fs::write(&self.session_path, serde_json::to_string(&session)?).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use matrix_sdk::{SessionMeta, SessionTokens, authentication::matrix::MatrixSession as SdkMatrixSession};
    use tempfile::TempDir;

    use super::*;

    fn create_test_user_session() -> SdkMatrixSession {
        SdkMatrixSession {
            meta: SessionMeta {
                user_id: "@herald:example.org".try_into().unwrap(),
                device_id: "DEVICEID".into(),
            },
            tokens: SessionTokens {
                access_token: "access_token".to_string(),
                refresh_token: None,
            },
        }
    }

    fn create_session_json(sync_token: Option<&str>) -> String {
        let session = Session {
            user_session: create_test_user_session(),
            sync_token: sync_token.map(str::to_owned),
        };
        serde_json::to_string(&session).unwrap()
    }

    fn dir_path(temp_dir: &TempDir) -> String {
        temp_dir.path().to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn test_open_without_session() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = dir_path(&temp_dir);

        let store = SessionStore::open(&dir_path).await.unwrap();

        assert!(!store.has_session());
        assert_eq!(store.sqlite_path(), get_path(&dir_path, "sqlite"));
        assert!(store.user_session().is_none());
        assert!(store.sync_token().is_none());
    }

    #[tokio::test]
    async fn test_open_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = get_path(&dir_path(&temp_dir), "nested/session");

        let store = SessionStore::open(&dir_path).await.unwrap();

        assert!(!store.has_session());
        assert!(Path::new(&dir_path).is_dir());
    }

    #[tokio::test]
    async fn test_open_with_existing_session() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = dir_path(&temp_dir);
        fs::write(get_path(&dir_path, "session"), create_session_json(Some("s72594_4483")))
            .await
            .unwrap();

        let store = SessionStore::open(&dir_path).await.unwrap();

        assert!(store.has_session());
        assert_eq!(
            store.user_session().unwrap().meta.user_id.to_string(),
            "@herald:example.org"
        );
        assert_eq!(store.sync_token(), Some("s72594_4483".to_string()));
    }

    #[tokio::test]
    async fn test_open_ignores_invalid_session_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = dir_path(&temp_dir);
        fs::write(get_path(&dir_path, "session"), "invalid json").await.unwrap();

        let store = SessionStore::open(&dir_path).await.unwrap();

        assert!(!store.has_session());
    }

    #[tokio::test]
    async fn test_read_session_file_does_not_exist() {
        let temp_dir = TempDir::new().unwrap();
        let session_path = get_path(&dir_path(&temp_dir), "nonexistent_session");

        let result = SessionStore::read_session(&session_path).await;

        assert!(result.unwrap_err().to_string().contains("session file does not exist"));
    }

    #[tokio::test]
    async fn test_persist_user_session() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = dir_path(&temp_dir);
        let store = SessionStore::open(&dir_path).await.unwrap();

        store.persist_user_session(&create_test_user_session()).await.unwrap();

        let content = fs::read_to_string(get_path(&dir_path, "session")).await.unwrap();
        let session: Session = serde_json::from_str(&content).unwrap();
        assert_eq!(session.user_session.meta.user_id.to_string(), "@herald:example.org");
        assert!(session.sync_token.is_none());
        assert!(!content.contains("sync_token"));
    }

    #[tokio::test]
    async fn test_persist_sync_token_keeps_user_session() {
        let temp_dir = TempDir::new().unwrap();
        let dir_path = dir_path(&temp_dir);
        let store = SessionStore::open(&dir_path).await.unwrap();
        store.persist_user_session(&create_test_user_session()).await.unwrap();

        store.persist_sync_token("s1_2_3".to_string()).await.unwrap();

        let reopened = SessionStore::open(&dir_path).await.unwrap();
        assert_eq!(reopened.sync_token(), Some("s1_2_3".to_string()));
        assert_eq!(
            reopened.user_session().unwrap().meta.device_id.to_string(),
            "DEVICEID"
        );
    }

    #[tokio::test]
    async fn test_persist_sync_token_without_session_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::open(&dir_path(&temp_dir)).await.unwrap();

        assert!(store.persist_sync_token("s1_2_3".to_string()).await.is_err());
    }
}
