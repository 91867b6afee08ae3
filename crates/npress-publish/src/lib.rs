//! The publish flow: from a content record to an advertised root.
//!
//! Given a publication's configuration and one content record, this crate
//! selects the template mapping for the record's post type, checks the
//! inputs, renders the page through `npress-templates`, stores it, rewrites
//! the publication's directory tree through `npress-dag`, and advertises
//! the new root address. Event subscription, signing, and data-source
//! queries stay outside; they reach this crate only through the
//! `ContentStore` and `RootPointer` interfaces and the already-fetched
//! record.

mod config;
mod error;
mod input;
mod path;
mod pipeline;
mod record;

pub use config::Collection;
pub use config::ManifestEntry;
pub use config::PublicationConfig;
pub use config::Ripple;
pub use config::TemplateManifest;
pub use config::TemplateMapping;
pub use error::PublishError;
pub use input::encrypted_payload;
pub use input::validate_inputs;
pub use input::EncryptedPayload;
pub use path::logical_path;
pub use path::DEFAULT_LANGUAGE;
pub use pipeline::Publisher;
pub use pipeline::PublishOutcome;
pub use pipeline::RootPointer;
pub use record::ContentRecord;
