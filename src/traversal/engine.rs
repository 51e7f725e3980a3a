//! The traversal engine.
//!
//! # Responsibilities
//! - Walk the resource tree along the request tokens
//! - Decide at each step: descend, stop and name a handler, or fail
//! - Enforce the subpath limit when a lookup misses
//!
//! # Design Decisions
//! - Pure function over borrowed inputs; only the result is cloned out
//! - Handler names are a closed type so "no explicit name" never collides with
//!   a token that happens to be empty
//! - `%handler` overrides beat both strict and permissive naming

use std::fmt;

use serde::Serialize;

use crate::traversal::error::{TraversalError, TraversalResult};
use crate::traversal::limit::SubpathLimit;
use crate::tree::{ResourceNode, ResourceTree};

/// The handler elected by traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerName {
    /// No explicit name: dispatch to the handler registered under `""`.
    Default,
    /// A path token elected as the handler name.
    Token(String),
    /// Forced by a `%handler` key in the tree.
    Override(String),
}

impl HandlerName {
    /// Name used for handler map lookups. `Default` is the empty string.
    pub fn as_str(&self) -> &str {
        match self {
            HandlerName::Default => "",
            HandlerName::Token(name) | HandlerName::Override(name) => name,
        }
    }

    /// Naming rule for a step whose lookup `found` (or missed) `token`.
    fn elect(token: &str, found: bool, strict: bool) -> Self {
        if strict && found {
            HandlerName::Default
        } else {
            HandlerName::Token(token.to_owned())
        }
    }
}

impl fmt::Display for HandlerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HandlerName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Outcome of a successful traversal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Traversal {
    pub handler: HandlerName,
    pub current: ResourceNode,
    pub subpath: Vec<String>,
}

impl Traversal {
    pub fn handler_name(&self) -> &str {
        self.handler.as_str()
    }
}

/// Resolve `tokens` against `tree`.
///
/// Fails with `NotFound` when a lookup misses and more than `limit` tokens
/// remain after the missing one, and with `Internal` when `tokens` is empty.
pub fn traverse(
    tree: &ResourceTree,
    tokens: &[String],
    limit: SubpathLimit,
    strict: bool,
) -> TraversalResult<Traversal> {
    if tokens.is_empty() {
        return Err(TraversalError::internal("empty token path"));
    }
    let last = tokens.len() - 1;
    let mut current = tree.root();

    for (i, token) in tokens.iter().enumerate() {
        let remaining = &tokens[i + 1..];

        let children = match current {
            ResourceNode::Subtree(children) => children,
            ResourceNode::Leaf(_) => {
                // Leaves cannot be descended into.
                let handler = if i == last {
                    HandlerName::Default
                } else {
                    HandlerName::elect(token, false, strict)
                };
                return Ok(Traversal {
                    handler,
                    current: current.clone(),
                    subpath: remaining.to_vec(),
                });
            }
        };

        match children.get(token) {
            Some(child) if i == last => {
                let handler = match child.handler_override() {
                    Some(name) => HandlerName::Override(name.to_owned()),
                    None => HandlerName::elect(token, true, strict),
                };
                return Ok(Traversal {
                    handler,
                    current: child.clone(),
                    subpath: Vec::new(),
                });
            }
            Some(child) => current = child,
            None => {
                if tokens.len() == 1 || limit.admits(remaining.len()) {
                    return Ok(Traversal {
                        handler: HandlerName::elect(token, false, strict),
                        current: current.clone(),
                        subpath: remaining.to_vec(),
                    });
                }
                tracing::debug!(
                    path = ?tokens,
                    subpath_len = remaining.len(),
                    limit = %limit,
                    "Subpath exceeds limit"
                );
                return Err(TraversalError::not_found(tokens));
            }
        }
    }

    Err(TraversalError::internal(format!(
        "traversal exhausted tokens without a decision: {:?}",
        tokens
    )))
}
