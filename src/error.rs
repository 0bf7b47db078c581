use crate::verifier::VerifyError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error("query cannot be empty")]
    QueryEmpty,

    #[error("at least one search field is required")]
    FieldsEmpty,

    #[error("document does not have a id field")]
    DocumentMissingId,

    #[error("batch contains no documents")]
    EmptyBatch,

    #[error("index '{0}' already exists with different keys")]
    IndexConflict(String),

    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Database(#[from] mongodb::error::Error),

    #[error("batch write failed: {0}")]
    WriteFailed(String),

    #[error("document encoding error: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("document decoding error: {0}")]
    Decode(#[from] bson::de::Error),

    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
