use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::auth::{Capability, Principal};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite database file (tilde is expanded)
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_db_path() -> PathBuf {
    PathBuf::from("videometa.db")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Require credentials for write requests. When disabled every request
    /// acts as an administrator.
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    pub name: String,

    /// Bcrypt hash of the application password (generate with
    /// `videometa hash-password`), checked against HTTP Basic credentials
    #[serde(default)]
    pub password_hash: Option<String>,

    /// API key accepted as `Authorization: Bearer <key>`
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<Capability>,
}

fn default_capabilities() -> Vec<Capability> {
    vec![Capability::Read, Capability::EditPosts]
}

impl UserConfig {
    pub fn principal(&self) -> Principal {
        Principal::user(self.name.clone(), self.capabilities.iter().copied())
    }
}

impl AuthConfig {
    pub fn find_user(&self, name: &str) -> Option<&UserConfig> {
        self.users.iter().find(|u| u.name == name)
    }

    pub fn find_by_api_key(&self, key: &str) -> Option<&UserConfig> {
        self.users
            .iter()
            .find(|u| u.api_key.as_deref() == Some(key))
    }
}
