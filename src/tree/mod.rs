//! Resource tree model.
//!
//! # Data Flow
//! ```text
//! TreeProvider::fetch() (per request, per refresh)
//!     → ResourceTree (root, always a subtree)
//!     → traversal engine walks ResourceNode by ResourceNode
//! ```
//!
//! # Design Decisions
//! - A node is either a branch (`Subtree`) or opaque application data (`Leaf`)
//! - Leaves carry JSON values so file and database backed trees share one model
//! - `%handler` on a subtree names the handler for requests resolving to it

pub mod provider;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use provider::{JsonFileTree, ProviderError, SharedTree, StaticTree, TreeProvider, TreeSourceError};

/// Reserved key carrying a handler override.
pub const HANDLER_KEY: &str = "%handler";

/// Children of a branch node, keyed by path segment.
pub type SubtreeMap = BTreeMap<String, ResourceNode>;

/// A node of the resource tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceNode {
    /// A branch that traversal can descend into.
    Subtree(SubtreeMap),
    /// Terminal application data.
    Leaf(Value),
}

impl ResourceNode {
    /// Returns the children if this node is a branch.
    pub fn as_subtree(&self) -> Option<&SubtreeMap> {
        match self {
            ResourceNode::Subtree(map) => Some(map),
            ResourceNode::Leaf(_) => None,
        }
    }

    pub fn is_subtree(&self) -> bool {
        matches!(self, ResourceNode::Subtree(_))
    }

    /// The `%handler` override, when this is a branch carrying a string under that key.
    pub fn handler_override(&self) -> Option<&str> {
        match self.as_subtree()?.get(HANDLER_KEY)? {
            ResourceNode::Leaf(Value::String(name)) => Some(name),
            _ => None,
        }
    }

    /// Child lookup; always `None` on a leaf.
    pub fn child(&self, key: &str) -> Option<&ResourceNode> {
        self.as_subtree()?.get(key)
    }
}

impl From<Value> for ResourceNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => ResourceNode::Subtree(
                map.into_iter()
                    .map(|(key, child)| (key, ResourceNode::from(child)))
                    .collect(),
            ),
            other => ResourceNode::Leaf(other),
        }
    }
}

impl From<ResourceNode> for Value {
    fn from(node: ResourceNode) -> Self {
        match node {
            ResourceNode::Subtree(map) => Value::Object(
                map.into_iter()
                    .map(|(key, child)| (key, Value::from(child)))
                    .collect(),
            ),
            ResourceNode::Leaf(value) => value,
        }
    }
}

/// The root of a resource tree. Always a branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResourceTree(ResourceNode);

impl ResourceTree {
    pub fn new(root: SubtreeMap) -> Self {
        Self(ResourceNode::Subtree(root))
    }

    /// Parse a tree from JSON text. The document must be an object.
    pub fn from_json_str(text: &str) -> Result<Self, TreeSourceError> {
        let value: Value = serde_json::from_str(text)?;
        Self::try_from(value)
    }

    pub fn root(&self) -> &ResourceNode {
        &self.0
    }

    pub fn root_mut(&mut self) -> &mut SubtreeMap {
        match &mut self.0 {
            ResourceNode::Subtree(map) => map,
            // Only `new` and `try_from` build trees, and both guarantee a branch.
            ResourceNode::Leaf(_) => unreachable!("resource tree root is always a subtree"),
        }
    }
}

impl Default for ResourceTree {
    fn default() -> Self {
        Self::new(SubtreeMap::new())
    }
}

impl TryFrom<Value> for ResourceTree {
    type Error = TreeSourceError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match ResourceNode::from(value) {
            ResourceNode::Subtree(map) => Ok(Self::new(map)),
            ResourceNode::Leaf(_) => Err(TreeSourceError::NotAnObject),
        }
    }
}

impl<'de> Deserialize<'de> for ResourceTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}
