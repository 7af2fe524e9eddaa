use std::env;
use std::path::Path;

use spdlog::{debug, warn};

pub const ACCESS_TOKEN_VAR: &str = "INSTAGRAM_ACCESS_TOKEN";
pub const USER_ID_VAR: &str = "INSTAGRAM_USER_ID";

#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub access_token: String,
    pub user_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"***")
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl Credentials {
    /// Builds credentials from a variable lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Option<Credentials>
        where
            F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let access_token = read(ACCESS_TOKEN_VAR)?;
        let user_id = read(USER_ID_VAR)?;
        Some(Credentials { access_token, user_id })
    }

    /// Loads `env_file` into the process environment (if given) and reads the credentials from it.
    pub fn from_env(env_file: Option<&Path>) -> Option<Credentials> {
        if let Some(path) = env_file {
            match dotenvy::from_path(path) {
                Ok(()) => debug!("Environment loaded from {}", path.display()),
                Err(e) => warn!("Could not load env file {}: {}", path.display(), e),
            }
        }

        let credentials = Self::from_lookup(|name| env::var(name).ok());
        if credentials.is_none() {
            warn!("{} / {} not set, Instagram client disabled", ACCESS_TOKEN_VAR, USER_ID_VAR);
        }
        credentials
    }
}
