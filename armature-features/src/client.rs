//! Feature client
//!
//! [`FeatureClient`] answers "is this feature on" and "which variant applies"
//! for a bound [`Context`], resolving defaults for features the engine does
//! not know and reporting usage counts back to the engine.

use crate::config::Configuration;
use crate::context::Context;
use crate::engine::Engine;
use crate::variant::Variant;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Decides whether usage counts reach the engine.
///
/// Counting happens only while neither this instance nor the
/// [`Configuration`] has metrics switched off.
pub struct MetricsGate {
    instance_disabled: AtomicBool,
    configuration: Arc<Configuration>,
}

impl MetricsGate {
    pub fn new(disabled: bool, configuration: Arc<Configuration>) -> Self {
        Self {
            instance_disabled: AtomicBool::new(disabled),
            configuration,
        }
    }

    #[inline]
    pub fn is_metrics_enabled(&self) -> bool {
        !self.instance_disabled.load(Ordering::Relaxed) && !self.configuration.disable_metrics()
    }

    pub fn disable(&self) {
        self.instance_disabled.store(true, Ordering::Relaxed);
    }

    /// Clear the instance override.
    ///
    /// Has no visible effect while the configuration disables metrics.
    pub fn enable(&self) {
        if self.configuration.disable_metrics() {
            tracing::warn!(
                "Feature client is configured to not use metrics! Calling enable_metrics will have no effect."
            );
        }
        self.instance_disabled.store(false, Ordering::Relaxed);
    }
}

/// Feature flag evaluation client
///
/// # Examples
///
/// ```
/// use armature_features::*;
/// use std::sync::Arc;
///
/// let engine = Arc::new(StaticEngine::new().with_toggle("beta", true));
/// let client = FeatureClient::builder(engine)
///     .context(Context::new().with_user_id("user-123"))
///     .configuration(Arc::new(Configuration::new()))
///     .build();
///
/// assert!(client.is_enabled("beta"));
/// assert!(!client.is_enabled("new-feature"));
/// assert!(client.is_enabled_or("new-feature", true));
/// assert_eq!(client.get_variant("new-feature").name, "disabled");
/// ```
pub struct FeatureClient {
    engine: Arc<dyn Engine>,
    context: Context,
    metrics: MetricsGate,
}

impl FeatureClient {
    /// Client with an empty context and the global configuration.
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self::builder(engine).build()
    }

    pub fn builder(engine: Arc<dyn Engine>) -> FeatureClientBuilder {
        FeatureClientBuilder::new(engine)
    }

    /// Context every evaluation of this client uses.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Whether `feature` is enabled, `false` when the engine does not know it.
    pub fn is_enabled(&self, feature: &str) -> bool {
        self.is_enabled_or(feature, false)
    }

    /// Whether `feature` is enabled, `default_value` when the engine does not know it.
    pub fn is_enabled_or(&self, feature: &str, default_value: bool) -> bool {
        self.evaluate(feature, default_value, None::<fn(&str, &Context) -> bool>)
    }

    /// Like [`is_enabled_or`](Self::is_enabled_or), with a computed fallback.
    ///
    /// The default for an unknown feature becomes
    /// `default_value || fallback(feature, context)`. The fallback runs before
    /// the engine is consulted and is skipped when `default_value` is `true`.
    pub fn is_enabled_with_fallback<F>(&self, feature: &str, default_value: bool, fallback: F) -> bool
    where
        F: FnOnce(&str, &Context) -> bool,
    {
        self.evaluate(feature, default_value, Some(fallback))
    }

    /// Whether `feature` is disabled, `true` when the engine does not know it.
    pub fn is_disabled(&self, feature: &str) -> bool {
        self.is_disabled_or(feature, true)
    }

    pub fn is_disabled_or(&self, feature: &str, default_value: bool) -> bool {
        !self.is_enabled_or(feature, !default_value)
    }

    pub fn is_disabled_with_fallback<F>(&self, feature: &str, default_value: bool, fallback: F) -> bool
    where
        F: FnOnce(&str, &Context) -> bool,
    {
        !self.is_enabled_with_fallback(feature, !default_value, fallback)
    }

    /// Alias of [`is_enabled_or`](Self::is_enabled_or).
    pub fn enabled(&self, feature: &str, default_value: bool) -> bool {
        self.is_enabled_or(feature, default_value)
    }

    /// Alias of [`is_disabled_or`](Self::is_disabled_or).
    pub fn disabled(&self, feature: &str, default_value: bool) -> bool {
        self.is_disabled_or(feature, default_value)
    }

    /// Run `action` when `feature` is enabled.
    ///
    /// Returns the action's output untouched, or `None` when it did not run.
    pub fn if_enabled<F, R>(&self, feature: &str, default_value: bool, action: F) -> Option<R>
    where
        F: FnOnce() -> R,
    {
        self.is_enabled_or(feature, default_value).then(action)
    }

    /// Run `action` when `feature` is disabled.
    pub fn if_disabled<F, R>(&self, feature: &str, default_value: bool, action: F) -> Option<R>
    where
        F: FnOnce() -> R,
    {
        self.is_disabled_or(feature, default_value).then(action)
    }

    /// Variant of `feature`, the disabled variant when the engine does not know it.
    pub fn get_variant(&self, feature: &str) -> Cow<'static, Variant> {
        self.get_variant_or(feature, Variant::disabled())
    }

    /// Variant of `feature`, `fallback` itself when the engine does not know it.
    pub fn get_variant_or<'a>(&self, feature: &str, fallback: &'a Variant) -> Cow<'a, Variant> {
        let Some(raw) = self.engine.get_variant(feature, &self.context) else {
            tracing::debug!(feature, "Variants for feature not found");
            self.count_toggle(feature, false);
            return Cow::Borrowed(fallback);
        };

        let variant = Variant::from(raw);

        self.count_variant(feature, &variant.name);
        self.count_toggle(feature, variant.feature_enabled);

        Cow::Owned(variant)
    }

    pub fn disable_metrics(&self) {
        self.metrics.disable();
    }

    pub fn enable_metrics(&self) {
        self.metrics.enable();
    }

    pub fn is_metrics_enabled(&self) -> bool {
        self.metrics.is_metrics_enabled()
    }

    /// Alias of [`is_metrics_enabled`](Self::is_metrics_enabled).
    pub fn metrics_enabled(&self) -> bool {
        self.is_metrics_enabled()
    }

    fn evaluate<F>(&self, feature: &str, default_value: bool, fallback: Option<F>) -> bool
    where
        F: FnOnce(&str, &Context) -> bool,
    {
        tracing::debug!(feature, context = %self.context, "Evaluating feature");

        let default_value = match fallback {
            Some(fallback) => default_value || fallback(feature, &self.context),
            None => default_value,
        };

        match self.engine.enabled(feature, &self.context) {
            Some(enabled) => {
                self.count_toggle(feature, enabled);
                enabled
            }
            None => {
                tracing::debug!(feature, "Feature not found");
                self.count_toggle(feature, false);
                default_value
            }
        }
    }

    fn count_toggle(&self, feature: &str, enabled: bool) {
        if self.metrics.is_metrics_enabled() {
            self.engine.count_toggle(feature, enabled);
        }
    }

    fn count_variant(&self, feature: &str, variant: &str) {
        if self.metrics.is_metrics_enabled() {
            self.engine.count_variant(feature, variant);
        }
    }
}

impl fmt::Debug for FeatureClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureClient")
            .field("context", &self.context)
            .field("metrics_enabled", &self.is_metrics_enabled())
            .finish_non_exhaustive()
    }
}

/// Builder for [`FeatureClient`]
pub struct FeatureClientBuilder {
    engine: Arc<dyn Engine>,
    context: Context,
    disable_metrics: bool,
    configuration: Option<Arc<Configuration>>,
}

impl FeatureClientBuilder {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self {
            engine,
            context: Context::new(),
            disable_metrics: false,
            configuration: None,
        }
    }

    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn disable_metrics(mut self, disabled: bool) -> Self {
        self.disable_metrics = disabled;
        self
    }

    /// Use `configuration` instead of [`Configuration::global`].
    pub fn configuration(mut self, configuration: Arc<Configuration>) -> Self {
        self.configuration = Some(configuration);
        self
    }

    /// Build the client, filling the context's missing app name and
    /// environment from the configuration.
    pub fn build(self) -> FeatureClient {
        let configuration = self.configuration.unwrap_or_else(Configuration::global);

        let mut context = self.context;
        if context.app_name.is_none() {
            context.app_name = configuration.app_name.clone();
        }
        if context.environment.is_none() {
            context.environment = configuration.environment.clone();
        }

        FeatureClient {
            engine: self.engine,
            context,
            metrics: MetricsGate::new(self.disable_metrics, configuration),
        }
    }
}
