//! Environment-sourced application settings.
//!
//! Every variable is prefixed with `NANOBOT_WEB_`. Settings are read once at
//! startup and then shared immutably with the token codec and the remote
//! clients.

use std::{fmt, net::SocketAddr, str::FromStr, time::Duration};

use thiserror::Error;

use crate::Session;

/// Prefix shared by all environment variables.
pub const ENV_PREFIX: &str = "NANOBOT_WEB_";

/// Signing secret used when none is configured.
pub const DEFAULT_SECRET_KEY: &str = "nanobot-web-change-me-in-production";

const DEFAULT_TOKEN_TTL_MINUTES: u64 = 720;
const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Settings error.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

/// Remote filesystem locations of the agent's configuration tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePaths {
    /// Agent config document.
    pub config: String,
    /// Agent workspace root (skills, memory, AGENTS.md).
    pub workspace: String,
    /// Cron jobs file maintained by the agent CLI.
    pub cron_jobs: String,
    /// Log file written when the agent is started detached.
    pub log_file: String,
}

impl Default for RemotePaths {
    fn default() -> Self {
        Self {
            config: "~/.nanobot/config.json".to_string(),
            workspace: "~/.nanobot/workspace".to_string(),
            cron_jobs: "~/.nanobot/cron/jobs.json".to_string(),
            log_file: "/tmp/nanobot.log".to_string(),
        }
    }
}

impl RemotePaths {
    /// Directory holding workspace skills.
    #[must_use]
    pub fn skills_dir(&self) -> String {
        format!("{}/skills", self.workspace)
    }

    /// `SKILL.md` path for a workspace skill.
    #[must_use]
    pub fn skill_file(&self, name: &str) -> String {
        format!("{}/skills/{name}/SKILL.md", self.workspace)
    }

    /// Directory holding memory files.
    #[must_use]
    pub fn memory_dir(&self) -> String {
        format!("{}/memory", self.workspace)
    }

    /// Agent instructions file.
    #[must_use]
    pub fn agents_md(&self) -> String {
        format!("{}/AGENTS.md", self.workspace)
    }
}

/// Connection target used when a login request leaves fields out.
#[derive(Clone, PartialEq, Eq)]
pub struct DefaultTarget {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for DefaultTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultTarget")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl DefaultTarget {
    /// Fill the gaps of a partial login with the configured defaults.
    #[must_use]
    pub fn complete(
        &self,
        host: Option<String>,
        port: Option<u16>,
        username: Option<String>,
        password: Option<String>,
    ) -> Session {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Session {
            host: non_empty(host).unwrap_or_else(|| self.host.clone()),
            port: port.unwrap_or(self.port),
            username: non_empty(username).unwrap_or_else(|| self.username.clone()),
            password: password.unwrap_or_else(|| self.password.clone()),
        }
    }
}

/// Process-wide configuration.
#[derive(Clone)]
pub struct Settings {
    /// HMAC secret for access tokens.
    pub secret_key: String,
    /// Validity window of an access token.
    pub token_ttl: Duration,
    /// Default SSH target.
    pub default_target: DefaultTarget,
    /// Remote paths of the agent's files.
    pub paths: RemotePaths,
    /// Address the HTTP server binds to.
    pub bind: SocketAddr,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("token_ttl", &self.token_ttl)
            .field("default_target", &self.default_target)
            .field("paths", &self.paths)
            .field("bind", &self.bind)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Load settings from the process environment.
    ///
    /// # Errors
    /// Returns error if a numeric or address variable cannot be parsed.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// `lookup` receives the full variable name, prefix included.
    ///
    /// # Errors
    /// Returns error if a numeric or address variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let string = |name: &str, default: &str| var(name).unwrap_or_else(|| default.to_string());

        let defaults = RemotePaths::default();
        let ttl_minutes: u64 = parse_var(&var, "ACCESS_TOKEN_EXPIRE_MINUTES", DEFAULT_TOKEN_TTL_MINUTES)?;

        Ok(Self {
            secret_key: string("SECRET_KEY", DEFAULT_SECRET_KEY),
            token_ttl: Duration::from_secs(ttl_minutes.saturating_mul(60)),
            default_target: DefaultTarget {
                host: string("DEFAULT_SSH_HOST", ""),
                port: parse_var(&var, "DEFAULT_SSH_PORT", 22)?,
                username: string("DEFAULT_SSH_USER", "root"),
                password: string("DEFAULT_SSH_PASSWORD", ""),
            },
            paths: RemotePaths {
                config: string("NANOBOT_CONFIG_PATH", &defaults.config),
                workspace: string("NANOBOT_WORKSPACE_PATH", &defaults.workspace),
                cron_jobs: string("NANOBOT_CRON_PATH", &defaults.cron_jobs),
                log_file: string("NANOBOT_LOG_PATH", &defaults.log_file),
            },
            bind: match var("BIND") {
                Some(raw) => parse_value("BIND", &raw)?,
                None => parse_value("BIND", DEFAULT_BIND)?,
            },
        })
    }

    /// Whether the built-in signing secret is still in use.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_MINUTES * 60),
            default_target: DefaultTarget {
                host: String::new(),
                port: 22,
                username: "root".to_string(),
                password: String::new(),
            },
            paths: RemotePaths::default(),
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
        }
    }
}

fn parse_var<T, F>(var: &F, name: &str, default: T) -> Result<T, SettingsError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    var(name).map_or(Ok(default), |raw| parse_value(name, &raw))
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T, SettingsError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| SettingsError::Invalid {
        key: format!("{ENV_PREFIX}{name}"),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert!(settings.uses_default_secret());
        assert_eq!(settings.token_ttl, Duration::from_secs(720 * 60));
        assert_eq!(settings.default_target.port, 22);
        assert_eq!(settings.default_target.username, "root");
        assert_eq!(settings.paths, RemotePaths::default());
        assert_eq!(settings.bind.to_string(), "127.0.0.1:8000");
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("NANOBOT_WEB_SECRET_KEY", "s3cret"),
            ("NANOBOT_WEB_ACCESS_TOKEN_EXPIRE_MINUTES", "5"),
            ("NANOBOT_WEB_DEFAULT_SSH_HOST", "10.1.1.1"),
            ("NANOBOT_WEB_DEFAULT_SSH_PORT", "2222"),
            ("NANOBOT_WEB_NANOBOT_WORKSPACE_PATH", "/srv/nanobot"),
            ("NANOBOT_WEB_BIND", "0.0.0.0:9000"),
        ]))
        .unwrap();

        assert!(!settings.uses_default_secret());
        assert_eq!(settings.token_ttl, Duration::from_secs(300));
        assert_eq!(settings.default_target.host, "10.1.1.1");
        assert_eq!(settings.default_target.port, 2222);
        assert_eq!(settings.paths.workspace, "/srv/nanobot");
        assert_eq!(settings.paths.skill_file("web"), "/srv/nanobot/skills/web/SKILL.md");
        assert_eq!(settings.paths.config, "~/.nanobot/config.json");
        assert_eq!(settings.bind.port(), 9000);
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let err = Settings::from_lookup(lookup(&[("NANOBOT_WEB_DEFAULT_SSH_PORT", "ssh")]))
            .unwrap_err();
        assert!(err.to_string().contains("NANOBOT_WEB_DEFAULT_SSH_PORT"));
    }

    #[test]
    fn test_default_target_fills_gaps() {
        let target = Settings::default().default_target;
        let session = target.complete(Some("host".into()), None, Some("  ".into()), Some("pw".into()));
        assert_eq!(session.host, "host");
        assert_eq!(session.port, 22);
        assert_eq!(session.username, "root");
        assert_eq!(session.password, "pw");
    }

    #[test]
    fn test_debug_hides_secrets() {
        let mut settings = Settings::default();
        settings.secret_key = "very-secret".into();
        settings.default_target.password = "pw-123".into();
        let debug = format!("{settings:?}");
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("pw-123"));
    }
}
