use npress_store::ContentStore;
use rustc_hash::FxHashMap;

use crate::normalize::clean_source;

/// Where a partial lives: its logical path in the template manifest and the
/// content address of its body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialDescriptor {
    pub path: String,
    pub address: String,
}

impl PartialDescriptor {
    #[must_use]
    pub fn new(path: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            address: address.into(),
        }
    }
}

/// Normalized partial bodies indexed by file stem.
///
/// `partials/blocks/header.hbs` registers as `header`. Resolution tolerates
/// per-partial failures: a body that cannot be fetched or decoded is simply
/// absent from the set, and the corresponding `{{> name}}` tags stay in the
/// output as literal text.
#[derive(Default)]
pub struct PartialSet {
    bodies: FxHashMap<String, String>,
}

impl PartialSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch and normalize every descriptor's body from the store.
    ///
    /// All partials reach a terminal state (indexed or skipped) before this
    /// returns, so expansion never observes a half-resolved set.
    #[must_use]
    pub fn resolve(store: &dyn ContentStore, descriptors: &[PartialDescriptor]) -> Self {
        let mut set = Self::new();
        for descriptor in descriptors {
            let bytes = match store.get(&descriptor.address) {
                Ok(bytes) => bytes,
                Err(error) => {
                    tracing::warn!(path = %descriptor.path, %error, "skipping partial");
                    continue;
                }
            };
            let Ok(text) = String::from_utf8(bytes) else {
                tracing::warn!(path = %descriptor.path, "partial body is not UTF-8, skipping");
                continue;
            };
            set.insert(file_stem(&descriptor.path), &clean_source(&text));
        }
        set
    }

    pub fn insert(&mut self, name: &str, body: &str) {
        self.bodies.insert(name.to_string(), body.to_string());
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bodies.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// Filename without directory or extension.
fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.split('.').next().unwrap_or(name)
}
