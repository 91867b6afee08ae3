use npress_templates::PartialDescriptor;
use serde::Deserialize;

use crate::error::PublishError;

/// Per-publication configuration, fetched by content address. Unknown
/// fields are tolerated so publications can carry extra settings this
/// service does not interpret.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PublicationConfig {
    pub name: String,
    #[serde(alias = "template_cid")]
    pub template_address: String,
    pub encrypted: bool,
    pub mapping: Vec<TemplateMapping>,
}

/// Binds one post type to a template file, an output path template, and the
/// data collections the template pulls in.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TemplateMapping {
    pub reference: String,
    pub file: String,
    pub path: String,
    pub collections: Vec<Collection>,
    pub ripples: Vec<Ripple>,
}

/// A named data binding the mapping's template iterates over. The query is
/// opaque here; an external data source interprets it.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Collection {
    pub source: String,
    pub key: String,
    pub value: String,
    pub query: String,
    pub slug: String,
}

/// A follow-up regeneration triggered by publishing this post type, e.g. an
/// index page that lists the new post.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Ripple {
    pub query: String,
    pub value: String,
    pub post_type: String,
}

impl PublicationConfig {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PublishError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Pick the mapping for a record's post type: first by direct
    /// `reference` match, then by a collection whose `value` matches.
    pub fn select_mapping(&self, post_type: &str) -> Result<&TemplateMapping, PublishError> {
        self.mapping
            .iter()
            .find(|m| m.reference == post_type)
            .or_else(|| {
                self.mapping
                    .iter()
                    .find(|m| m.collections.iter().any(|c| c.value == post_type))
            })
            .ok_or_else(|| PublishError::NoMapping(post_type.to_string()))
    }
}

/// One file in a template bundle: its path inside the bundle and the
/// content address of its body.
#[derive(Clone, Debug, Deserialize)]
pub struct ManifestEntry {
    pub path: String,
    #[serde(alias = "cid")]
    pub address: String,
}

/// The template bundle listing, stored as a JSON array of entries.
#[derive(Clone, Debug, Deserialize)]
#[serde(transparent)]
pub struct TemplateManifest {
    entries: Vec<ManifestEntry>,
}

impl TemplateManifest {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PublishError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// The entry whose path contains the mapping's file name.
    #[must_use]
    pub fn template_entry(&self, file: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|entry| entry.path.contains(file))
    }

    /// Every entry filed under `partials/`.
    #[must_use]
    pub fn partials(&self) -> Vec<PartialDescriptor> {
        self.entries
            .iter()
            .filter(|entry| entry.path.contains("partials/"))
            .map(|entry| PartialDescriptor::new(&entry.path, &entry.address))
            .collect()
    }
}
