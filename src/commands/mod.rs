//! Command implementations

pub mod apply;
pub mod ensure;
pub mod fact;

use anyhow::{Context as AnyhowContext, Result, bail};
use jirakit::{ConnectionSettings, JiraClient};
use serde_json::{Map, Value};

use crate::cli::ConnectionArgs;

impl ConnectionArgs {
    /// Settings given on the command line
    pub fn settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            timeout: self.timeout,
            validate_certs: self.insecure.then_some(false),
        }
    }
}

/// Build a client; command-line settings win over `fallback`, which wins
/// over the environment.
pub fn connect(args: &ConnectionArgs, fallback: ConnectionSettings) -> Result<JiraClient> {
    let config = args
        .settings()
        .or(fallback)
        .resolve()
        .context("Incomplete Jira connection settings")?;
    log::debug!("connecting to {} as {}", config.base_url, config.username);
    Ok(JiraClient::new(&config))
}

/// Parse `name=value` pairs into a JSON object.
///
/// Values that parse as JSON keep their type (`10000`, `true`, `["a"]`);
/// anything else is a string. Quote a value to force a string: `key="123"`.
pub fn parse_params(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut params = Map::new();
    for pair in pairs {
        let Some((name, raw)) = pair.split_once('=') else {
            bail!("Invalid parameter '{pair}', expected name=value");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("Invalid parameter '{pair}', name is empty");
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        params.insert(name.to_string(), value);
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_params_types() {
        let params = parse_params(&pairs(&[
            "group_name=developers",
            "avatar_id=10200",
            "active=false",
            "users=[\"alice\",\"bob\"]",
            "key=\"123\"",
            "jql=project = PRJ1",
        ]))
        .unwrap();

        assert_eq!(params["group_name"], json!("developers"));
        assert_eq!(params["avatar_id"], json!(10200));
        assert_eq!(params["active"], json!(false));
        assert_eq!(params["users"], json!(["alice", "bob"]));
        assert_eq!(params["key"], json!("123"));
        assert_eq!(params["jql"], json!("project = PRJ1"));
    }

    #[test]
    fn test_parse_params_rejects_malformed() {
        assert!(parse_params(&pairs(&["novalue"])).is_err());
        assert!(parse_params(&pairs(&["=x"])).is_err());
    }

    #[test]
    fn test_command_line_settings_win() {
        let args = ConnectionArgs {
            url: Some("https://cli.example.com".to_string()),
            insecure: true,
            ..Default::default()
        };
        let manifest = ConnectionSettings {
            url: Some("https://manifest.example.com".to_string()),
            username: Some("bot".to_string()),
            ..Default::default()
        };

        let merged = args.settings().or(manifest);
        assert_eq!(merged.url.as_deref(), Some("https://cli.example.com"));
        assert_eq!(merged.username.as_deref(), Some("bot"));
        assert_eq!(merged.validate_certs, Some(false));
        assert_eq!(args.settings().validate_certs, Some(false));
        assert_eq!(ConnectionArgs::default().settings().validate_certs, None);
    }
}
