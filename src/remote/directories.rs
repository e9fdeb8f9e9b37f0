//! Directory nodes and path assembly

use std::collections::{HashMap, HashSet};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::client::models::FileResource;

/// One folder in the remote tree. Cached indefinitely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryNode {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
}

impl From<FileResource> for DirectoryNode {
    fn from(file: FileResource) -> Self {
        Self {
            parent_id: file.parents.into_iter().next(),
            id: file.id,
            name: file.name,
        }
    }
}

/// Walk from `id` to the root and join folder names into a path.
///
/// A node without a parent is the root and contributes `/`. An ancestor that
/// is absent from `nodes` is treated as the root too. Cycles stop the walk.
pub fn build_path<'a>(id: &'a str, nodes: &'a HashMap<String, DirectoryNode>) -> String {
    let mut names: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut cursor = Some(id);

    while let Some(current) = cursor {
        if !seen.insert(current) {
            warn!("Directory cycle detected at {}", current);
            break;
        }
        cursor = match nodes.get(current) {
            Some(node) => match node.parent_id.as_deref() {
                Some(parent) => {
                    names.push(node.name.as_str());
                    Some(parent)
                }
                None => None,
            },
            None => None,
        };
    }

    names.reverse();
    format!("/{}", names.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, name: &str, parent: Option<&str>) -> (String, DirectoryNode) {
        (
            id.to_string(),
            DirectoryNode {
                id: id.to_string(),
                name: name.to_string(),
                parent_id: parent.map(str::to_string),
            },
        )
    }

    fn tree() -> HashMap<String, DirectoryNode> {
        HashMap::from([
            node("root", "My Drive", None),
            node("shots", "shots", Some("root")),
            node("year", "2023", Some("shots")),
        ])
    }

    #[test]
    fn test_root_path_is_slash() {
        assert_eq!(build_path("root", &tree()), "/");
    }

    #[test]
    fn test_nested_path() {
        assert_eq!(build_path("shots", &tree()), "/shots");
        assert_eq!(build_path("year", &tree()), "/shots/2023");
    }

    #[test]
    fn test_unknown_ancestor_treated_as_root() {
        let nodes = HashMap::from([node("orphan", "orphan", Some("gone"))]);
        assert_eq!(build_path("orphan", &nodes), "/orphan");
        assert_eq!(build_path("gone", &nodes), "/");
    }

    #[test]
    fn test_cycle_terminates() {
        let nodes = HashMap::from([node("a", "a", Some("b")), node("b", "b", Some("a"))]);
        assert_eq!(build_path("a", &nodes), "/b/a");
    }

    #[test]
    fn test_node_from_file_takes_first_parent() {
        let file = FileResource {
            id: "d".to_string(),
            name: "dir".to_string(),
            parents: vec!["p1".to_string(), "p2".to_string()],
        };

        let node = DirectoryNode::from(file);
        assert_eq!(node.parent_id.as_deref(), Some("p1"));
    }
}
