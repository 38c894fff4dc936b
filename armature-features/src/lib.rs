//! Feature Flags for Armature
//!
//! Evaluation client for feature flags: decides whether a feature is enabled
//! and which variant applies for a request context, while the flag matching
//! itself is delegated to a pluggable [`Engine`].
//!
//! # Features
//!
//! - 🚀 **Feature Checks** - `is_enabled` / `is_disabled` with defaults and fallbacks
//! - 🎯 **Context** - User, session and custom request attributes
//! - 📊 **Variants** - Named variants with payloads for experiments
//! - 📈 **Usage Metrics** - Per-toggle and per-variant counters, switchable at runtime
//!
//! # Quick Start
//!
//! ```
//! use armature_features::*;
//! use std::sync::Arc;
//!
//! let engine = Arc::new(StaticEngine::new().with_toggle("new-ui", true));
//! let client = FeatureClient::builder(engine)
//!     .context(Context::new().with_user_id("user-123"))
//!     .build();
//!
//! if client.is_enabled("new-ui") {
//!     // Show new UI
//! }
//! ```
//!
//! # Defaults and Fallbacks
//!
//! Features the engine does not know resolve to a default instead of failing.
//!
//! ```
//! use armature_features::*;
//! use std::sync::Arc;
//!
//! let client = FeatureClient::new(Arc::new(StaticEngine::new()));
//!
//! assert!(!client.is_enabled("unknown"));
//! assert!(client.is_enabled_or("unknown", true));
//! assert!(client.is_enabled_with_fallback("unknown", false, |_feature, context| {
//!     context.user_id.is_none()
//! }));
//! ```
//!
//! # Variants
//!
//! ```
//! use armature_features::*;
//! use std::sync::Arc;
//!
//! let engine = Arc::new(StaticEngine::new().with_variant(
//!     "button-color",
//!     true,
//!     "blue",
//!     Some(VariantPayload::string("#0000ff")),
//! ));
//! let client = FeatureClient::new(engine);
//!
//! let variant = client.get_variant("button-color");
//! assert_eq!(variant.name, "blue");
//! assert!(variant.feature_enabled);
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod variant;

pub use client::{FeatureClient, FeatureClientBuilder, MetricsGate};
pub use config::Configuration;
pub use context::Context;
pub use engine::{Engine, MetricsBucket, StaticEngine, ToggleStats};
pub use error::{FeatureError, Result};
pub use variant::{DISABLED_VARIANT_NAME, EngineVariant, Variant, VariantPayload};
