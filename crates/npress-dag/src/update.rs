use crate::node::DagEntry;
use crate::node::DagNode;
use crate::node::LinkRecord;

/// Entry written when an update targets the tree root itself.
pub const DEFAULT_ENTRY: &str = "index.html";

/// Split a slash-delimited logical path into its non-empty segments.
///
/// `""` and `"/"` both yield the empty path, which addresses the tree's
/// default entry.
#[must_use]
pub fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Insert a content reference at `path`, returning a new tree.
///
/// The input tree is never mutated. Missing intermediate segments become
/// empty nodes without any store fetch or validation of what the segment
/// previously held; an intermediate that is a scalar or reference is
/// overwritten with a fresh node rather than failing. The flat link index is
/// upserted under the full slash-joined path so both halves of the tree
/// invariant hold after every call.
#[must_use]
pub fn apply_update<S: AsRef<str>>(tree: &DagNode, path: &[S], address: &str) -> DagNode {
    let mut result = tree.clone();

    if path.is_empty() {
        tracing::debug!(address, "updating default entry at tree root");
        result
            .entries
            .insert(DEFAULT_ENTRY.to_string(), DagEntry::link(address));
        upsert_link(&mut result.links, DEFAULT_ENTRY, address);
        return result;
    }

    let full_path = path
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("/");
    tracing::debug!(path = %full_path, address, "updating tree at path");

    let mut current = &mut result;
    for segment in &path[..path.len() - 1] {
        let segment = segment.as_ref();
        let entry = current
            .entries
            .entry(segment.to_string())
            .or_insert_with(|| DagEntry::Node(DagNode::new()));
        if entry.as_node().is_none() {
            tracing::warn!(segment, "intermediate entry is not a node, replacing");
            *entry = DagEntry::Node(DagNode::new());
        }
        let DagEntry::Node(next) = entry else {
            unreachable!("entry was normalized to a node above")
        };
        current = next;
    }

    let leaf = path[path.len() - 1].as_ref();
    current
        .entries
        .insert(leaf.to_string(), DagEntry::link(address));

    upsert_link(&mut result.links, &full_path, address);
    result
}

/// Remove a root-level entry by name, returning a new tree.
///
/// The link index is deliberately left untouched; removal is a maintenance
/// utility, not part of the update flow.
#[must_use]
pub fn remove_entry(tree: &DagNode, name: &str) -> DagNode {
    let mut result = tree.clone();
    result.entries.shift_remove(name);
    result
}

/// Walk the nested structure along `path`.
#[must_use]
pub fn walk<'a, S: AsRef<str>>(tree: &'a DagNode, path: &[S]) -> Option<&'a DagEntry> {
    let (first, rest) = path.split_first()?;
    let mut entry = tree.entries.get(first.as_ref())?;
    for segment in rest {
        entry = entry.as_node()?.entries.get(segment.as_ref())?;
    }
    Some(entry)
}

/// Replace a matching record's address in place, preserving its position;
/// append when no record carries the name.
fn upsert_link(links: &mut Vec<LinkRecord>, name: &str, address: &str) {
    if let Some(record) = links.iter_mut().find(|record| record.name == name) {
        record.hash.address = address.to_string();
        record.tsize = 0;
    } else {
        links.push(LinkRecord::new(name, address));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_tree() -> DagNode {
        serde_json::from_str(
            r#"{
                "index.html": { "/": "bafyindex" },
                "about": { "/": "bafyabout" },
                "Links": [
                    { "Hash": { "/": "bafyindex" }, "Name": "index.html", "Tsize": 0 },
                    { "Hash": { "/": "bafyabout" }, "Name": "about", "Tsize": 0 }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn inserts_nested_reference_with_full_path_link() {
        let tree = DagNode::new();
        let updated = apply_update(&tree, &["a", "b"], "bafynew");

        let entry = walk(&updated, &["a", "b"]).unwrap();
        assert_eq!(entry, &DagEntry::link("bafynew"));

        let matching: Vec<_> = updated
            .links
            .iter()
            .filter(|record| record.name == "a/b")
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].hash.address, "bafynew");
    }

    #[test]
    fn update_is_idempotent() {
        let tree = seeded_tree();
        let once = apply_update(&tree, &["blog", "post"], "bafypost");
        let twice = apply_update(&once, &["blog", "post"], "bafypost");
        assert_eq!(once, twice);
        assert_eq!(
            twice.links.iter().filter(|r| r.name == "blog/post").count(),
            1
        );
    }

    #[test]
    fn input_tree_never_mutated() {
        let tree = seeded_tree();
        let before = tree.clone();
        let _ = apply_update(&tree, &["x"], "bafyx");
        assert_eq!(tree, before);
    }

    #[test]
    fn empty_path_replaces_only_default_entry() {
        let tree = seeded_tree();
        let updated = apply_update::<&str>(&tree, &[], "bafyfresh");

        assert_eq!(
            updated.entries.get(DEFAULT_ENTRY),
            Some(&DagEntry::link("bafyfresh"))
        );
        assert_eq!(updated.entries.get("about"), Some(&DagEntry::link("bafyabout")));

        let index = updated
            .links
            .iter()
            .find(|r| r.name == DEFAULT_ENTRY)
            .unwrap();
        assert_eq!(index.hash.address, "bafyfresh");
        let about = updated.links.iter().find(|r| r.name == "about").unwrap();
        assert_eq!(about.hash.address, "bafyabout");
        assert_eq!(updated.links.len(), 2);
    }

    #[test]
    fn upsert_preserves_record_position() {
        let tree = seeded_tree();
        let updated = apply_update(&tree, &["index.html"], "bafyv2");
        assert_eq!(updated.links[0].name, "index.html");
        assert_eq!(updated.links[0].hash.address, "bafyv2");
        assert_eq!(updated.links[1].name, "about");
    }

    #[test]
    fn scalar_intermediate_overwritten_with_node() {
        let mut tree = DagNode::new();
        tree.entries.insert(
            "blog".to_string(),
            DagEntry::Scalar(serde_json::json!("not a directory")),
        );

        let updated = apply_update(&tree, &["blog", "post"], "bafypost");
        assert_eq!(
            walk(&updated, &["blog", "post"]),
            Some(&DagEntry::link("bafypost"))
        );
    }

    #[test]
    fn missing_intermediates_created() {
        let updated = apply_update(&DagNode::new(), &["a", "b", "c"], "bafyc");
        assert_eq!(
            walk(&updated, &["a", "b", "c"]),
            Some(&DagEntry::link("bafyc"))
        );
        assert_eq!(updated.links.len(), 1);
        assert_eq!(updated.links[0].name, "a/b/c");
    }

    #[test]
    fn remove_entry_preserves_link_index() {
        let tree = seeded_tree();
        let removed = remove_entry(&tree, "about");
        assert!(removed.entries.get("about").is_none());
        assert_eq!(removed.links.len(), tree.links.len());
    }

    #[test]
    fn updated_tree_wire_shape() {
        let updated = apply_update(&DagNode::new(), &["blog", "post.html"], "bafypost");
        let json = serde_json::to_string_pretty(&updated).unwrap();
        insta::assert_snapshot!(json, @r#"
        {
          "Links": [
            {
              "Hash": {
                "/": "bafypost"
              },
              "Name": "blog/post.html",
              "Tsize": 0
            }
          ],
          "blog": {
            "post.html": {
              "/": "bafypost"
            }
          }
        }
        "#);
    }

    #[test]
    fn split_path_drops_empty_segments() {
        assert_eq!(split_path("/blog//post/"), vec!["blog", "post"]);
        assert!(split_path("/").is_empty());
        assert!(split_path("").is_empty());
    }
}
