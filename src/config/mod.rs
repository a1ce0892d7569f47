mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    expand_paths(&mut config);

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./videometa.toml",
        "./config.toml",
        "~/.config/videometa/config.toml",
        "/etc/videometa/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

fn expand_paths(config: &mut Config) {
    let raw = config.server.db_path.to_string_lossy();
    let expanded = shellexpand::tilde(raw.as_ref()).into_owned();
    config.server.db_path = PathBuf::from(expanded);
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.auth.enabled && config.auth.users.is_empty() {
        anyhow::bail!("Auth is enabled but no users are configured");
    }

    for user in &config.auth.users {
        if user.name.trim().is_empty() {
            anyhow::bail!("Auth user with empty name");
        }
        if user.password_hash.is_none() && user.api_key.is_none() {
            anyhow::bail!(
                "User '{}' has neither a password hash nor an API key",
                user.name
            );
        }
        if user.capabilities.is_empty() {
            tracing::warn!("User '{}' has no capabilities", user.name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Capability;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.db_path, PathBuf::from("videometa.db"));
        assert!(!config.auth.enabled);
    }

    #[test]
    fn loads_users() {
        let file = write_config(
            r#"
[server]
port = 9000
db_path = "/var/lib/videometa/meta.db"

[auth]
enabled = true

[[auth.users]]
name = "publisher"
api_key = "k1"
capabilities = ["read", "edit_posts", "publish_posts"]

[[auth.users]]
name = "reader"
password_hash = "$2b$04$abc"
capabilities = ["read"]
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.auth.users.len(), 2);

        let publisher = config.auth.find_by_api_key("k1").unwrap();
        assert!(publisher.principal().has(Capability::PublishPosts));
        assert!(!config
            .auth
            .find_user("reader")
            .unwrap()
            .principal()
            .has(Capability::EditPosts));
    }

    #[test]
    fn capabilities_default_to_editor() {
        let file = write_config(
            r#"
[[auth.users]]
name = "bot"
api_key = "k"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(
            config.auth.users[0].capabilities,
            vec![Capability::Read, Capability::EditPosts]
        );
    }

    #[test]
    fn rejects_port_zero() {
        let file = write_config("[server]\nport = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("port cannot be 0"));
    }

    #[test]
    fn rejects_enabled_auth_without_users() {
        let file = write_config("[auth]\nenabled = true\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn rejects_user_without_credentials() {
        let file = write_config("[[auth.users]]\nname = \"ghost\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn explicit_missing_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config_or_default(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
