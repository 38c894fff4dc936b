//! Client configuration
//!
//! Process-level settings shared by every [`FeatureClient`](crate::FeatureClient):
//! static context fields and the global metrics switch.
//!
//! # Environment Variables
//!
//! - `ARMATURE_FEATURES_APP_NAME` - Application name stamped on contexts
//! - `ARMATURE_FEATURES_ENVIRONMENT` - Environment stamped on contexts
//! - `ARMATURE_FEATURES_DISABLE_METRICS=1|0` - Turn usage metrics off for all clients

use crate::error::{FeatureError, Result};
use once_cell::sync::Lazy;
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ARMATURE_FEATURES";

static GLOBAL: Lazy<Arc<Configuration>> = Lazy::new(|| {
    let config = Configuration::from_env().unwrap_or_else(|e| {
        tracing::warn!("Falling back to default feature configuration: {}", e);
        Configuration::default()
    });
    Arc::new(config)
});

/// Feature client configuration.
#[derive(Debug, Default)]
pub struct Configuration {
    /// Application name, copied into contexts that lack one
    pub app_name: Option<String>,

    /// Environment name, copied into contexts that lack one
    pub environment: Option<String>,

    disable_metrics: AtomicBool,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_disable_metrics(self, disabled: bool) -> Self {
        self.disable_metrics.store(disabled, Ordering::Relaxed);
        self
    }

    /// Load configuration from `ARMATURE_FEATURES_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// `lookup` receives the full variable name, prefix included.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}_{}", ENV_PREFIX, name));

        let disable_metrics = match var("DISABLE_METRICS") {
            Some(value) => parse_bool(&format!("{}_DISABLE_METRICS", ENV_PREFIX), &value)?,
            None => false,
        };

        Ok(Self {
            app_name: var("APP_NAME").filter(|s| !s.is_empty()),
            environment: var("ENVIRONMENT").filter(|s| !s.is_empty()),
            disable_metrics: AtomicBool::new(disable_metrics),
        })
    }

    /// Process-wide configuration, built from the environment on first use.
    pub fn global() -> Arc<Configuration> {
        Arc::clone(&GLOBAL)
    }

    /// Whether usage metrics are switched off for every client.
    #[inline]
    pub fn disable_metrics(&self) -> bool {
        self.disable_metrics.load(Ordering::Relaxed)
    }

    pub fn set_disable_metrics(&self, disabled: bool) {
        self.disable_metrics.store(disabled, Ordering::Relaxed);
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(FeatureError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
