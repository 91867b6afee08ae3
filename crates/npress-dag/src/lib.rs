//! Content-addressed directory trees and the pure path-mutation algorithm.
//!
//! A [`DagNode`] mirrors the dag-json shape of an IPFS directory node: named
//! entries that are sub-nodes, `{"/": address}` content references, or
//! scalars, plus a flat `Links` index keyed by full slash-joined path. The
//! mutation entry point is [`apply_update`], which never touches its input
//! and returns a fresh tree value.

mod node;
mod update;

pub use node::DagEntry;
pub use node::DagNode;
pub use node::LinkRecord;
pub use node::LinkRef;
pub use update::apply_update;
pub use update::remove_entry;
pub use update::split_path;
pub use update::walk;
pub use update::DEFAULT_ENTRY;
