//! Error types for Cataract Screen

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for loading, encoding and inference
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Model artifact missing, unreadable or structurally invalid
    #[error("model artifact unavailable: {0}")]
    ArtifactUnavailable(String),

    /// Categorical value outside the fixed encoding table
    #[error("no encoding for value '{value}' of field '{field}'")]
    EncodingMismatch { field: String, value: String },

    /// Assembled feature vector disagrees with the artifact's feature schema
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Classifier rejected the feature vector or produced malformed output
    #[error("inference failure: {0}")]
    InferenceFailure(String),

    /// Input outside its declared domain
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Dataset loading or query errors
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new artifact-unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::ArtifactUnavailable(msg.into())
    }

    /// Create a new encoding mismatch error
    pub fn encoding(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::EncodingMismatch {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a new schema mismatch error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    /// Create a new inference failure
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::InferenceFailure(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new dataset error
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ArtifactUnavailable(_) => "artifact_unavailable",
            Self::EncodingMismatch { .. } => "encoding_mismatch",
            Self::SchemaMismatch(_) => "schema_mismatch",
            Self::InferenceFailure(_) => "inference_failure",
            Self::InvalidInput(_) => "invalid_input",
            Self::Dataset(_) => "dataset_error",
            Self::Config(_) => "configuration_error",
            Self::Io(_) => "io_error",
            Self::Serialization(_) => "serialization_error",
        }
    }
}
