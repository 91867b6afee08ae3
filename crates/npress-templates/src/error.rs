use npress_store::StoreError;
use thiserror::Error;

/// The only hard failures in the rendering path.
///
/// Everything downstream of a fetched template body degrades per construct
/// instead of erroring; a page that cannot be fetched or decoded has nothing
/// to degrade to.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template unavailable")]
    TemplateUnavailable(#[from] StoreError),
    #[error("template body is not valid UTF-8")]
    InvalidEncoding(#[from] std::string::FromUtf8Error),
}
