use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

/// A bare content reference, the dag-json `{"/": "bafy..."}` object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkRef {
    #[serde(rename = "/")]
    pub address: String,
}

impl LinkRef {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// One record of the flat link index.
///
/// `name` is the full slash-joined logical path of the reference it mirrors,
/// not the final segment. `tsize` is carried but never computed; upserts
/// record it as zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    #[serde(rename = "Hash")]
    pub hash: LinkRef,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Tsize")]
    pub tsize: u64,
}

impl LinkRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            hash: LinkRef::new(address),
            name: name.into(),
            tsize: 0,
        }
    }
}

/// A named entry of a directory node.
///
/// Untagged on the wire: `{"/": ...}` objects deserialize as references,
/// other objects as nested nodes, everything else as a scalar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DagEntry {
    Link(LinkRef),
    Node(DagNode),
    Scalar(serde_json::Value),
}

impl DagEntry {
    #[must_use]
    pub fn link(address: impl Into<String>) -> Self {
        DagEntry::Link(LinkRef::new(address))
    }

    #[must_use]
    pub fn as_link(&self) -> Option<&LinkRef> {
        match self {
            DagEntry::Link(link) => Some(link),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_node(&self) -> Option<&DagNode> {
        match self {
            DagEntry::Node(node) => Some(node),
            _ => None,
        }
    }
}

/// A content-addressed directory node.
///
/// Entry order is preserved so a round-trip through the store reproduces the
/// same bytes, and therefore the same address, for an unchanged tree.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DagNode {
    #[serde(rename = "Links", default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkRecord>,
    #[serde(flatten)]
    pub entries: IndexMap<String, DagEntry>,
}

impl DagNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
