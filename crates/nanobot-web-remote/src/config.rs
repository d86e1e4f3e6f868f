//! The agent's `config.json`.
//!
//! The document is untyped JSON. Updates are read-modify-write on the whole
//! file with no locking, so concurrent writers can lose updates.

use nanobot_web_core::RemoteShell;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{Nanobot, NanobotError};

/// Config document root.
pub type ConfigDocument = Map<String, Value>;

/// Parse a config document; anything but a JSON object counts as absent.
#[must_use]
pub fn parse_config(raw: &str) -> Option<ConfigDocument> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            debug!("Config root is not an object");
            None
        }
        Err(e) => {
            debug!(error = %e, "Config is not valid JSON");
            None
        }
    }
}

impl<R: RemoteShell> Nanobot<R> {
    /// Read the config document; `None` if missing, empty or malformed.
    ///
    /// # Errors
    /// Returns error if the remote command cannot run.
    pub async fn config(&mut self) -> Result<Option<ConfigDocument>, NanobotError> {
        let path = self.paths().config.clone();
        Ok(self.read(&path).await?.as_deref().and_then(parse_config))
    }

    /// Read the config document, starting from `{}` when there is none.
    ///
    /// # Errors
    /// Returns error if the remote command cannot run.
    pub async fn config_or_default(&mut self) -> Result<ConfigDocument, NanobotError> {
        Ok(self.config().await?.unwrap_or_default())
    }

    /// Overwrite the config document.
    ///
    /// # Errors
    /// Returns error if encoding or the remote write fails.
    pub async fn save_config(&mut self, config: &ConfigDocument) -> Result<(), NanobotError> {
        let content = serde_json::to_string_pretty(config)?;
        let path = self.paths().config.clone();
        self.write(&path, &content, "Failed to save config").await?;
        info!(path, "Saved nanobot config");
        Ok(())
    }

    /// One top-level section of an existing config.
    ///
    /// # Errors
    /// Returns `NotFound` if there is no config or no such section.
    pub async fn section(&mut self, name: &str) -> Result<Value, NanobotError> {
        let mut config = self
            .config()
            .await?
            .ok_or_else(|| NanobotError::NotFound("Config not found".to_string()))?;
        config
            .remove(name)
            .ok_or_else(|| NanobotError::NotFound(format!("Section '{name}' not found")))
    }

    /// One top-level section, or `{}` when it or the config is missing.
    ///
    /// # Errors
    /// Returns error if the remote command cannot run.
    pub async fn section_or_default(&mut self, name: &str) -> Result<Value, NanobotError> {
        Ok(self
            .config()
            .await?
            .and_then(|mut config| config.remove(name))
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    /// Replace one top-level section, keeping every other section.
    ///
    /// # Errors
    /// Returns error if the read or the write fails.
    pub async fn replace_section(&mut self, name: &str, value: Value) -> Result<(), NanobotError> {
        let mut config = self.config_or_default().await?;
        config.insert(name.to_string(), value);
        self.save_config(&config).await
    }

    /// Replace `section.key`, creating the section if needed.
    ///
    /// # Errors
    /// Returns error if the read or the write fails.
    pub async fn replace_entry(
        &mut self,
        section: &str,
        key: &str,
        value: Value,
    ) -> Result<(), NanobotError> {
        let mut config = self.config_or_default().await?;
        let entry = config
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(map) = entry {
            map.insert(key.to_string(), value);
        }
        self.save_config(&config).await
    }
}

#[cfg(test)]
mod tests {
    use nanobot_web_core::RemotePaths;
    use serde_json::json;

    use super::*;
    use crate::testing::ScriptedShell;

    #[test]
    fn test_parse_config() {
        assert!(parse_config("").is_none());
        assert!(parse_config("  \n").is_none());
        assert!(parse_config("{not json").is_none());
        assert!(parse_config("[1, 2]").is_none());
        let config = parse_config(r#"{"agents": {"defaults": {}}}"#).unwrap();
        assert!(config.contains_key("agents"));
    }

    #[tokio::test]
    async fn test_missing_file_is_absent() {
        let mut bot = Nanobot::new(ScriptedShell::new(), RemotePaths::default());
        assert!(bot.config().await.unwrap().is_none());
        assert!(matches!(
            bot.section("channels").await,
            Err(NanobotError::NotFound(m)) if m == "Config not found"
        ));
        assert_eq!(bot.section_or_default("channels").await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_missing_section_is_not_found() {
        let shell = ScriptedShell::new().ok("cat ", r#"{"tools": {"exec": {}}}"#);
        let mut bot = Nanobot::new(shell, RemotePaths::default());
        assert_eq!(bot.section("tools").await.unwrap(), json!({"exec": {}}));
        assert!(matches!(
            bot.section("gateway").await,
            Err(NanobotError::NotFound(m)) if m == "Section 'gateway' not found"
        ));
    }

    #[tokio::test]
    async fn test_save_writes_pretty_json() {
        let shell = ScriptedShell::new().ok("cat >", "");
        let mut bot = Nanobot::new(shell, RemotePaths::default());
        let config = parse_config(r#"{"a": {"b": 1}}"#).unwrap();
        bot.save_config(&config).await.unwrap();

        let shell = bot.into_inner();
        let write = shell.matching("cat >")[0];
        assert!(write.contains("\n{\n  \"a\": {\n    \"b\": 1\n  }\n}\nNANOBOT_EOF"));
    }
}
