//! Feature variants
//!
//! A [`Variant`] is the sub-configuration the engine selected for a feature,
//! together with the state of the feature itself.

use crate::error::Result;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Name of the variant returned when none applies.
pub const DISABLED_VARIANT_NAME: &str = "disabled";

static DISABLED_VARIANT: Lazy<Variant> = Lazy::new(|| Variant {
    name: DISABLED_VARIANT_NAME.to_string(),
    payload: None,
    enabled: false,
    feature_enabled: false,
});

/// Variant payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantPayload {
    /// Payload kind: `string`, `json`, `csv` or `number`
    #[serde(rename = "type")]
    pub payload_type: String,

    /// Raw payload value
    pub value: String,
}

impl VariantPayload {
    pub fn new(payload_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            payload_type: payload_type.into(),
            value: value.into(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new("string", value)
    }

    pub fn json(value: impl Into<String>) -> Self {
        Self::new("json", value)
    }

    /// Decode the raw value as JSON.
    pub fn as_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.value)?)
    }
}

/// Variant as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineVariant {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<VariantPayload>,

    #[serde(default)]
    pub enabled: bool,

    #[serde(default, rename = "featureEnabled", alias = "feature_enabled")]
    pub feature_enabled: bool,
}

impl EngineVariant {
    pub fn new(name: impl Into<String>, feature_enabled: bool) -> Self {
        Self {
            name: name.into(),
            payload: None,
            enabled: true,
            feature_enabled,
        }
    }

    pub fn with_payload(mut self, payload: VariantPayload) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Selected variant of a feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Variant name
    pub name: String,

    /// Optional payload attached to the variant
    pub payload: Option<VariantPayload>,

    /// Whether the variant itself is enabled
    pub enabled: bool,

    /// Whether the parent feature is enabled
    pub feature_enabled: bool,
}

impl Variant {
    /// The shared "no variant" value.
    ///
    /// ```
    /// use armature_features::Variant;
    ///
    /// let disabled = Variant::disabled();
    /// assert_eq!(disabled.name, "disabled");
    /// assert!(!disabled.feature_enabled);
    /// ```
    pub fn disabled() -> &'static Variant {
        &DISABLED_VARIANT
    }

    pub fn is_disabled_variant(&self) -> bool {
        self == Self::disabled()
    }

    /// Parse an engine variant from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: EngineVariant = serde_json::from_str(json)?;
        Ok(raw.into())
    }
}

impl From<EngineVariant> for Variant {
    fn from(raw: EngineVariant) -> Self {
        Self {
            name: raw.name,
            payload: raw.payload,
            enabled: raw.enabled,
            feature_enabled: raw.feature_enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_sentinel_is_shared() {
        let a = Variant::disabled();
        let b = Variant::disabled();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.name, DISABLED_VARIANT_NAME);
        assert!(a.payload.is_none());
        assert!(!a.enabled);
        assert!(!a.feature_enabled);
        assert!(a.is_disabled_variant());
    }

    #[test]
    fn test_from_json() {
        let variant = Variant::from_json(
            r#"{"name":"blue","payload":{"type":"json","value":"{\"size\":3}"},"enabled":true,"featureEnabled":true}"#,
        )
        .unwrap();

        assert_eq!(variant.name, "blue");
        assert!(variant.enabled);
        assert!(variant.feature_enabled);
        let payload = variant.payload.unwrap().as_json().unwrap();
        assert_eq!(payload["size"], 3);
    }

    #[test]
    fn test_from_json_snake_case_and_defaults() {
        let variant = Variant::from_json(r#"{"name":"red","feature_enabled":true}"#).unwrap();
        assert!(variant.feature_enabled);
        assert!(!variant.enabled);
        assert!(variant.payload.is_none());
        assert!(!variant.is_disabled_variant());
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(Variant::from_json("{\"payload\":1}").is_err());
    }

    #[test]
    fn test_string_payload_not_json() {
        let payload = VariantPayload::string("plain text");
        assert!(payload.as_json().is_err());
    }
}
