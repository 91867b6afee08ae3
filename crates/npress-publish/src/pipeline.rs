use npress_dag::apply_update;
use npress_dag::DagNode;
use npress_store::ContentStore;
use npress_store::StoreError;
use npress_templates::render_page;
use npress_templates::HelperRegistry;
use npress_templates::PartialSet;

use crate::config::PublicationConfig;
use crate::config::TemplateManifest;
use crate::error::PublishError;
use crate::input::validate_inputs;
use crate::path::logical_path;
use crate::record::ContentRecord;

/// Where the publication's current root address lives. Stands in for the
/// on-chain publication contract.
pub trait RootPointer {
    /// The currently advertised root address; empty when the publication
    /// has never published.
    fn current_root(&self) -> Result<String, StoreError>;
    fn advertise(&mut self, address: &str) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishOutcome {
    pub path: Vec<String>,
    pub page_address: String,
    pub root_address: String,
}

/// The sequential publish flow for one content event.
///
/// Steps run strictly in order: select mapping, validate inputs, fetch the
/// template bundle, resolve partials, render, store the page, rewrite the
/// tree, store it, advertise the new root. Nothing is stored or advertised
/// until rendering has fully succeeded, so a failed event leaves the
/// publication exactly as it was. Events racing on one root are the
/// orchestrator's problem; within an event, last writer wins.
pub struct Publisher<'a> {
    store: &'a dyn ContentStore,
    helpers: HelperRegistry,
}

impl<'a> Publisher<'a> {
    #[must_use]
    pub fn new(store: &'a dyn ContentStore) -> Self {
        Self {
            store,
            helpers: HelperRegistry::with_builtins(),
        }
    }

    /// Replace the stock helper registry, keeping the rest of the flow.
    #[must_use]
    pub fn with_helpers(store: &'a dyn ContentStore, helpers: HelperRegistry) -> Self {
        Self { store, helpers }
    }

    pub fn publish(
        &self,
        root: &mut dyn RootPointer,
        config: &PublicationConfig,
        record: &ContentRecord,
        signer_address: &str,
    ) -> Result<PublishOutcome, PublishError> {
        let mapping = config.select_mapping(&record.post_type)?;
        validate_inputs(Some(config), Some(mapping), Some(record), signer_address)?;

        let manifest = TemplateManifest::from_slice(&self.store.get(&config.template_address)?)?;
        let entry = manifest
            .template_entry(&mapping.file)
            .ok_or_else(|| PublishError::TemplateNotFound(mapping.file.clone()))?;
        let partials = PartialSet::resolve(self.store, &manifest.partials());

        let context = record.normalize();
        let page = render_page(self.store, &entry.address, &context, &self.helpers, &partials)?;
        let page_address = self.store.put(page.as_bytes())?;

        let current = root.current_root()?;
        let tree = self.fetch_tree(&current)?;
        let path = logical_path(&mapping.path, &record.slug, &record.language);
        let updated = apply_update(&tree, &path, &page_address);
        let root_address = self.store.put(&serde_json::to_vec(&updated)?)?;
        root.advertise(&root_address)?;

        tracing::info!(
            post_type = %record.post_type,
            slug = %record.slug,
            %page_address,
            %root_address,
            "published"
        );
        Ok(PublishOutcome {
            path,
            page_address,
            root_address,
        })
    }

    fn fetch_tree(&self, address: &str) -> Result<DagNode, PublishError> {
        if address.is_empty() {
            return Ok(DagNode::new());
        }
        Ok(serde_json::from_slice(&self.store.get(address)?)?)
    }
}
