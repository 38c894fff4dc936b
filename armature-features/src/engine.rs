//! Evaluation engine seam
//!
//! The [`Engine`] trait is what the client consumes: toggle state, variant
//! selection and usage counters. Matching toggle definitions against a
//! context is entirely the engine's business.
//!
//! [`StaticEngine`] is an in-memory implementation over a fixed table of
//! toggle states, for embedding, local development and tests.

use crate::context::Context;
use crate::variant::{DISABLED_VARIANT_NAME, EngineVariant, VariantPayload};
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;

/// Feature evaluation engine.
pub trait Engine: Send + Sync {
    /// Toggle state for `feature`, or `None` when the feature is unknown.
    fn enabled(&self, feature: &str, context: &Context) -> Option<bool>;

    /// Variant for `feature`, or `None` when the feature is unknown.
    fn get_variant(&self, feature: &str, context: &Context) -> Option<EngineVariant>;

    /// Record one evaluation of `feature` with its outcome.
    fn count_toggle(&self, feature: &str, enabled: bool);

    /// Record one selection of `variant` for `feature`.
    fn count_variant(&self, feature: &str, variant: &str);
}

/// Usage counters of a single toggle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToggleStats {
    pub yes: u64,
    pub no: u64,
    pub variants: HashMap<String, u64>,
}

/// Usage counters accumulated since `start`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsBucket {
    pub start: DateTime<Utc>,
    pub toggles: HashMap<String, ToggleStats>,
}

impl MetricsBucket {
    pub fn new() -> Self {
        Self {
            start: Utc::now(),
            toggles: HashMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.toggles.is_empty()
    }

    pub fn toggle(&self, feature: &str) -> Option<&ToggleStats> {
        self.toggles.get(feature)
    }

    /// Total number of toggle evaluations recorded.
    pub fn total_evaluations(&self) -> u64 {
        self.toggles.values().map(|t| t.yes + t.no).sum()
    }

    fn entry(&mut self, feature: &str) -> &mut ToggleStats {
        self.toggles.entry(feature.to_string()).or_default()
    }
}

impl Default for MetricsBucket {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
struct StaticToggle {
    enabled: bool,
    variant: Option<(String, Option<VariantPayload>)>,
}

/// In-memory engine over a fixed toggle table
///
/// # Examples
///
/// ```
/// use armature_features::{Context, Engine, StaticEngine};
///
/// let engine = StaticEngine::new()
///     .with_toggle("beta", true)
///     .with_variant("checkout", true, "one-click", None);
///
/// let context = Context::new();
/// assert_eq!(engine.enabled("beta", &context), Some(true));
/// assert_eq!(engine.enabled("missing", &context), None);
/// ```
#[derive(Debug, Default)]
pub struct StaticEngine {
    toggles: RwLock<HashMap<String, StaticToggle>>,
    metrics: Mutex<MetricsBucket>,
}

impl StaticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_toggle(self, feature: impl Into<String>, enabled: bool) -> Self {
        self.set_toggle(feature, enabled);
        self
    }

    pub fn with_variant(
        self,
        feature: impl Into<String>,
        enabled: bool,
        variant: impl Into<String>,
        payload: Option<VariantPayload>,
    ) -> Self {
        self.toggles.write().insert(
            feature.into(),
            StaticToggle {
                enabled,
                variant: Some((variant.into(), payload)),
            },
        );
        self
    }

    /// Add or replace a toggle, keeping any configured variant.
    pub fn set_toggle(&self, feature: impl Into<String>, enabled: bool) {
        self.toggles
            .write()
            .entry(feature.into())
            .and_modify(|t| t.enabled = enabled)
            .or_insert(StaticToggle {
                enabled,
                variant: None,
            });
    }

    pub fn remove_toggle(&self, feature: &str) -> bool {
        self.toggles.write().remove(feature).is_some()
    }

    /// Snapshot of the counters without resetting them.
    pub fn metrics(&self) -> MetricsBucket {
        self.metrics.lock().clone()
    }

    /// Drain the counters, starting a fresh bucket.
    pub fn take_metrics(&self) -> MetricsBucket {
        std::mem::take(&mut *self.metrics.lock())
    }
}

impl Engine for StaticEngine {
    fn enabled(&self, feature: &str, _context: &Context) -> Option<bool> {
        self.toggles.read().get(feature).map(|t| t.enabled)
    }

    fn get_variant(&self, feature: &str, _context: &Context) -> Option<EngineVariant> {
        let toggles = self.toggles.read();
        let toggle = toggles.get(feature)?;

        let variant = match (&toggle.variant, toggle.enabled) {
            (Some((name, payload)), true) => EngineVariant {
                name: name.clone(),
                payload: payload.clone(),
                enabled: true,
                feature_enabled: true,
            },
            _ => EngineVariant {
                name: DISABLED_VARIANT_NAME.to_string(),
                payload: None,
                enabled: false,
                feature_enabled: toggle.enabled,
            },
        };

        Some(variant)
    }

    fn count_toggle(&self, feature: &str, enabled: bool) {
        let mut metrics = self.metrics.lock();
        let stats = metrics.entry(feature);
        if enabled {
            stats.yes += 1;
        } else {
            stats.no += 1;
        }
    }

    fn count_variant(&self, feature: &str, variant: &str) {
        let mut metrics = self.metrics.lock();
        *metrics
            .entry(feature)
            .variants
            .entry(variant.to_string())
            .or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tri_state() {
        let engine = StaticEngine::new()
            .with_toggle("on", true)
            .with_toggle("off", false);
        let context = Context::new();

        assert_eq!(engine.enabled("on", &context), Some(true));
        assert_eq!(engine.enabled("off", &context), Some(false));
        assert_eq!(engine.enabled("unknown", &context), None);
    }

    #[test]
    fn test_variant_selection() {
        let engine = StaticEngine::new()
            .with_variant("color", true, "blue", Some(VariantPayload::string("#00f")))
            .with_variant("paused", false, "red", None)
            .with_toggle("plain", true);
        let context = Context::new();

        let blue = engine.get_variant("color", &context).unwrap();
        assert_eq!(blue.name, "blue");
        assert!(blue.enabled && blue.feature_enabled);
        assert_eq!(blue.payload.unwrap().value, "#00f");

        let paused = engine.get_variant("paused", &context).unwrap();
        assert_eq!(paused.name, DISABLED_VARIANT_NAME);
        assert!(!paused.feature_enabled);

        let plain = engine.get_variant("plain", &context).unwrap();
        assert_eq!(plain.name, DISABLED_VARIANT_NAME);
        assert!(!plain.enabled);
        assert!(plain.feature_enabled);

        assert!(engine.get_variant("unknown", &context).is_none());
    }

    #[test]
    fn test_set_toggle_keeps_variant() {
        let engine = StaticEngine::new().with_variant("color", false, "blue", None);
        engine.set_toggle("color", true);

        let variant = engine.get_variant("color", &Context::new()).unwrap();
        assert_eq!(variant.name, "blue");

        assert!(engine.remove_toggle("color"));
        assert!(!engine.remove_toggle("color"));
        assert_eq!(engine.enabled("color", &Context::new()), None);
    }

    #[test]
    fn test_counters() {
        let engine = StaticEngine::new();
        engine.count_toggle("a", true);
        engine.count_toggle("a", true);
        engine.count_toggle("a", false);
        engine.count_variant("a", "blue");

        let metrics = engine.metrics();
        let stats = metrics.toggle("a").unwrap();
        assert_eq!(stats.yes, 2);
        assert_eq!(stats.no, 1);
        assert_eq!(stats.variants.get("blue"), Some(&1));
        assert_eq!(metrics.total_evaluations(), 3);
    }

    #[test]
    fn test_bucket_serialization() {
        let engine = StaticEngine::new();
        engine.count_toggle("checkout", true);
        engine.count_toggle("checkout", false);
        engine.count_variant("checkout", "one-click");

        let json = serde_json::to_value(engine.take_metrics()).unwrap();
        assert!(json["start"].is_string());
        assert_eq!(json["toggles"]["checkout"]["yes"], 1);
        assert_eq!(json["toggles"]["checkout"]["no"], 1);
        assert_eq!(json["toggles"]["checkout"]["variants"]["one-click"], 1);
    }

    #[test]
    fn test_take_metrics_resets() {
        let engine = StaticEngine::new();
        engine.count_toggle("a", false);

        let drained = engine.take_metrics();
        assert_eq!(drained.total_evaluations(), 1);
        assert!(engine.metrics().is_empty());
        assert!(engine.metrics().start >= drained.start);
    }
}
