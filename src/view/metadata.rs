use serde::Serialize;
use serde_json::Value;

use crate::client::ConfigProperties;

/// Config keys not listed in the config panel.
const HIDDEN_CONFIG_KEYS: [&str; 3] = ["app.version", "MAIN_JS_VERSION", "last_prompt"];

/// Static data fetched once at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppMetadata {
    pub config: Option<ConfigProperties>,
    pub version: Option<String>,
    pub status: Option<String>,
}

/// Configuration overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigPanelView {
    pub app_version: String,
    pub client_version: String,
    pub last_prompt: String,
    /// Remaining properties as `(key, display value)`, sorted by key
    pub entries: Vec<(String, String)>,
}

/// One-line summary of the backend models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    pub database_plan: String,
    pub chat_model: String,
    pub embedding_model: String,
}

impl AppMetadata {
    /// `app.version` from the config, else the version endpoint.
    pub fn display_version(&self) -> Option<String> {
        self.config
            .as_ref()
            .and_then(|c| c.get("app.version"))
            .map(display_value)
            .or_else(|| self.version.clone())
    }

    pub fn config_panel(&self, last_prompt: Option<&str>) -> Option<ConfigPanelView> {
        let config = self.config.as_ref()?;
        let entries = config
            .iter()
            .filter(|(key, _)| !HIDDEN_CONFIG_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), display_value(value)))
            .collect();

        Some(ConfigPanelView {
            app_version: self
                .display_version()
                .unwrap_or_else(|| "unknown".to_string()),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            last_prompt: last_prompt.unwrap_or("(none)").to_string(),
            entries,
        })
    }

    pub fn connection_info(&self) -> Option<ConnectionInfo> {
        let config = self.config.as_ref()?;
        let get = |key: &str| {
            config
                .get(key)
                .map(display_value)
                .unwrap_or_else(|| "?".to_string())
        };
        Some(ConnectionInfo {
            database_plan: get("embed-db.plan"),
            chat_model: get("chat-model.model_name"),
            embedding_model: get("embed-model.model_name"),
        })
    }
}

/// Strings unquoted, everything else as JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
