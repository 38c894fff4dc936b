// Error types for the feature client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Variant payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FeatureError>;
