//! Error type shared by the whole crate.

use thiserror::Error;

/// Everything that can go wrong while configuring, fitting or querying a tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A hyperparameter or collaborator setting is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A lookup table lacks a column the caller depends on.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// A feature name has no entry in the normalization table.
    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A sample is too short for a decision node on its traversal path.
    #[error("feature index {feature_index} out of bounds for a sample with {n_features} features")]
    FeatureIndexOutOfBounds {
        feature_index: usize,
        n_features: usize,
    },

    #[error("non-finite value in {0}")]
    NonFinite(String),

    #[error("tree wasn't built yet")]
    NotFitted,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TreeError>;
