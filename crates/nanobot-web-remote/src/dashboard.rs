//! Dashboard overview: status plus a digest of the config.

use nanobot_web_core::RemoteShell;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::{Nanobot, NanobotError, NanobotStatus, config::ConfigDocument};

/// Model shown when the config names none.
pub const DEFAULT_MODEL: &str = "anthropic/claude-opus-4-5";
/// Provider shown when the config names none.
pub const DEFAULT_PROVIDER: &str = "auto";
/// Token limit shown when the config sets none.
pub const DEFAULT_MAX_TOKENS: u64 = 8192;
/// Temperature shown when the config sets none.
pub const DEFAULT_TEMPERATURE: f64 = 0.1;
/// Workspace shown when the config sets none.
pub const DEFAULT_WORKSPACE: &str = "~/.nanobot/workspace";

/// Everything the overview page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Process and host status.
    pub status: NanobotStatus,
    /// Agent defaults.
    pub config_summary: ConfigSummary,
    /// Chat channels.
    pub channels: ChannelSummary,
    /// LLM providers.
    pub providers: ProviderSummary,
    /// Tool settings.
    pub tools: ToolsSummary,
}

/// Agent defaults; values are passed through as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSummary {
    /// `agents.defaults.model`.
    pub model: Value,
    /// `agents.defaults.provider`.
    pub provider: Value,
    /// `agents.defaults.maxTokens` or `max_tokens`.
    pub max_tokens: Value,
    /// `agents.defaults.temperature`.
    pub temperature: Value,
    /// `agents.defaults.workspace`.
    pub workspace: Value,
}

/// Configured chat channels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChannelSummary {
    /// Names of channels with a truthy `enabled`.
    pub enabled: Vec<String>,
    /// Number of channel entries.
    pub total: usize,
}

/// Configured LLM providers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProviderSummary {
    /// Names of providers with a non-empty API key.
    pub active: Vec<String>,
    /// Number of provider entries.
    pub total: usize,
}

/// Tool settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolsSummary {
    /// Names of configured MCP servers.
    pub mcp_servers: Vec<String>,
    /// Whether file tools are confined to the workspace, as stored.
    pub restrict_to_workspace: Value,
}

/// Config digest shown next to the status.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDigest {
    /// Agent defaults.
    pub config_summary: ConfigSummary,
    /// Chat channels.
    pub channels: ChannelSummary,
    /// LLM providers.
    pub providers: ProviderSummary,
    /// Tool settings.
    pub tools: ToolsSummary,
}

/// JSON truthiness: null, false, zero and empty values are false.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// First present key among `keys`.
fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| map.get(*key))
}

fn object<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    map.get(key).and_then(Value::as_object)
}

/// Summarize a config document.
#[must_use]
pub fn summarize(config: &ConfigDocument) -> ConfigDigest {
    let empty = Map::new();
    let defaults = object(config, "agents")
        .and_then(|agents| object(agents, "defaults"))
        .unwrap_or(&empty);
    let channels = object(config, "channels").unwrap_or(&empty);
    let providers = object(config, "providers").unwrap_or(&empty);
    let tools = object(config, "tools").unwrap_or(&empty);

    let default = |keys: &[&str], fallback: Value| lookup(defaults, keys).cloned().unwrap_or(fallback);

    let channel_entries = channels
        .iter()
        .filter_map(|(name, entry)| entry.as_object().map(|entry| (name, entry)));
    let provider_entries = providers
        .iter()
        .filter_map(|(name, entry)| entry.as_object().map(|entry| (name, entry)));

    ConfigDigest {
        config_summary: ConfigSummary {
            model: default(&["model"], json!(DEFAULT_MODEL)),
            provider: default(&["provider"], json!(DEFAULT_PROVIDER)),
            max_tokens: default(&["maxTokens", "max_tokens"], json!(DEFAULT_MAX_TOKENS)),
            temperature: default(&["temperature"], json!(DEFAULT_TEMPERATURE)),
            workspace: default(&["workspace"], json!(DEFAULT_WORKSPACE)),
        },
        channels: ChannelSummary {
            enabled: channel_entries
                .clone()
                .filter(|(_, entry)| entry.get("enabled").is_some_and(truthy))
                .map(|(name, _)| name.clone())
                .collect(),
            total: channel_entries.count(),
        },
        providers: ProviderSummary {
            active: provider_entries
                .clone()
                .filter(|(_, entry)| lookup(entry, &["apiKey", "api_key"]).is_some_and(truthy))
                .map(|(name, _)| name.clone())
                .collect(),
            total: provider_entries.count(),
        },
        tools: ToolsSummary {
            mcp_servers: lookup(tools, &["mcpServers", "mcp_servers"])
                .and_then(Value::as_object)
                .map(|servers| servers.keys().cloned().collect())
                .unwrap_or_default(),
            restrict_to_workspace: lookup(tools, &["restrictToWorkspace", "restrict_to_workspace"])
                .cloned()
                .unwrap_or(Value::Bool(false)),
        },
    }
}

impl<R: RemoteShell> Nanobot<R> {
    /// Status plus config digest; a missing config summarizes as `{}`.
    ///
    /// # Errors
    /// Returns error if the connection fails.
    pub async fn dashboard(&mut self) -> Result<Dashboard, NanobotError> {
        let status = self.status().await?;
        let config = self.config_or_default().await?;
        let ConfigDigest {
            config_summary,
            channels,
            providers,
            tools,
        } = summarize(&config);
        Ok(Dashboard {
            status,
            config_summary,
            channels,
            providers,
            tools,
        })
    }
}
