//! Evaluation context
//!
//! Attributes describing the request a feature is evaluated for.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Evaluation context (request attributes)
///
/// Well-known identity fields are typed; anything else lives in
/// `properties`. Unknown keys are kept as-is, never rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_time: Option<String>,

    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from loose key/value attributes.
    ///
    /// Recognizes both `camelCase` and `snake_case` spellings of the
    /// identity fields. Every other key becomes a custom property.
    ///
    /// ```
    /// use armature_features::Context;
    ///
    /// let context = Context::from_attributes([("userId", "42"), ("plan", "pro")]);
    /// assert_eq!(context.user_id.as_deref(), Some("42"));
    /// assert_eq!(context.get("plan"), Some("pro"));
    /// ```
    pub fn from_attributes<I, K, V>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut context = Self::new();
        for (key, value) in attributes {
            let key = key.into();
            let value = value.into();
            match key.as_str() {
                "userId" | "user_id" => context.user_id = Some(value),
                "sessionId" | "session_id" => context.session_id = Some(value),
                "remoteAddress" | "remote_address" => context.remote_address = Some(value),
                "environment" => context.environment = Some(value),
                "appName" | "app_name" => context.app_name = Some(value),
                "currentTime" | "current_time" => context.current_time = Some(value),
                _ => {
                    context.properties.insert(key, value);
                }
            }
        }
        context
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_remote_address(mut self, remote_address: impl Into<String>) -> Self {
        self.remote_address = Some(remote_address.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_current_time(mut self, current_time: impl Into<String>) -> Self {
        self.current_time = Some(current_time.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute by name, identity fields first.
    pub fn get(&self, key: &str) -> Option<&str> {
        let field = match key {
            "userId" | "user_id" => &self.user_id,
            "sessionId" | "session_id" => &self.session_id,
            "remoteAddress" | "remote_address" => &self.remote_address,
            "environment" => &self.environment,
            "appName" | "app_name" => &self.app_name,
            "currentTime" | "current_time" => &self.current_time,
            _ => return self.properties.get(key).map(|s| s.as_str()),
        };
        field.as_deref()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let context = Context::new()
            .with_user_id("user-1")
            .with_session_id("session-9")
            .with_property("tier", "gold");

        assert_eq!(context.get("userId"), Some("user-1"));
        assert_eq!(context.get("session_id"), Some("session-9"));
        assert_eq!(context.get("tier"), Some("gold"));
        assert_eq!(context.get("remoteAddress"), None);
    }

    #[test]
    fn test_unknown_keys_preserved() {
        let context = Context::from_attributes([
            ("user_id", "u"),
            ("remoteAddress", "10.0.0.1"),
            ("favourite-colour", "green"),
            ("", "empty-key"),
        ]);

        assert_eq!(context.user_id.as_deref(), Some("u"));
        assert_eq!(context.remote_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(context.properties.len(), 2);
        assert_eq!(context.get("favourite-colour"), Some("green"));
        assert_eq!(context.get(""), Some("empty-key"));
    }

    #[test]
    fn test_wire_shape() {
        let context = Context::new()
            .with_user_id("42")
            .with_app_name("shop")
            .with_property("region", "eu");

        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json["userId"], "42");
        assert_eq!(json["appName"], "shop");
        assert_eq!(json["properties"]["region"], "eu");
        assert!(json.get("sessionId").is_none());
    }

    #[test]
    fn test_display_is_json() {
        let context = Context::new().with_user_id("7");
        assert!(context.to_string().contains("\"userId\":\"7\""));
    }
}
