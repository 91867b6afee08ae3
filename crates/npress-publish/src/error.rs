use npress_store::StoreError;
use npress_templates::RenderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("{0} is required")]
    MissingInput(&'static str),
    #[error("encrypted content is not valid JSON")]
    InvalidContentFormat,
    #[error("encrypted content is missing ciphertext or hash")]
    MissingEncryptionData,
    #[error("no mapping found for post type `{0}`")]
    NoMapping(String),
    #[error("template file `{0}` not found in manifest")]
    TemplateNotFound(String),
    #[error("malformed document")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
