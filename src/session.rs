use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::RemoteConfig;
use crate::errors::{AppError, AppResult};

const SESSION_FILE_NAME: &str = "session.json";

/// An authenticated Supabase session, validated against the auth endpoint at
/// startup.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: SecretString,
    pub user_email: Option<String>,
}

/// Session provider backed by Supabase auth. The access token is written to
/// `session.json` in the data dir by the login shell; this client only reads
/// and deletes it.
pub struct SupabaseSession {
    http: Client,
    auth_base: String,
    anon_key: SecretString,
    token_path: PathBuf,
}

#[derive(Deserialize)]
struct StoredToken {
    access_token: SecretString,
}

#[derive(Deserialize)]
struct AuthUser {
    email: Option<String>,
}

impl SupabaseSession {
    pub fn new(http: Client, remote: &RemoteConfig, data_dir: &Path) -> Self {
        Self {
            http,
            auth_base: format!("{}/auth/v1", remote.supabase_url),
            anon_key: remote.supabase_key.clone(),
            token_path: data_dir.join(SESSION_FILE_NAME),
        }
    }

    /// Resolve the current session, if any. A missing token file, or an auth
    /// endpoint answering 401/403, means no session; the caller redirects to
    /// login before any core state is built.
    pub async fn get_session(&self) -> AppResult<Option<Session>> {
        let Some(token) = self.stored_token()? else {
            return Ok(None);
        };

        let response = self
            .http
            .get(format!("{}/user", self.auth_base))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(token.expose_secret())
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                debug!("stored session token is no longer valid");
                Ok(None)
            }
            status if status.is_success() => {
                let user: AuthUser = response.json().await?;
                Ok(Some(Session {
                    access_token: token,
                    user_email: user.email,
                }))
            }
            status => Err(AppError::Session(format!(
                "auth endpoint answered {status}"
            ))),
        }
    }

    /// Invalidate the session server-side and drop the stored token. Local
    /// cleanup happens even when the logout call fails.
    pub async fn sign_out(&self) -> AppResult<()> {
        if let Some(token) = self.stored_token()? {
            let result = self
                .http
                .post(format!("{}/logout", self.auth_base))
                .header("apikey", self.anon_key.expose_secret())
                .bearer_auth(token.expose_secret())
                .send()
                .await;
            if let Err(err) = result {
                warn!(?err, "logout request failed; clearing local session anyway");
            }
        }
        match fs::remove_file(&self.token_path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    fn stored_token(&self) -> AppResult<Option<SecretString>> {
        let contents = match fs::read_to_string(&self.token_path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AppError::Io(err)),
        };
        let stored: StoredToken = serde_json::from_str(&contents)?;
        Ok(Some(stored.access_token))
    }
}
