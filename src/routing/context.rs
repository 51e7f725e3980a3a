//! Per-request traversal context.
//!
//! # Responsibilities
//! - Expose the resolved current object, token path, subpath and tree
//! - Re-run traversal on demand (`refresh`, `walk_back`)
//!
//! # Design Decisions
//! - Owned by the handler for the lifetime of the request, never shared
//! - `refresh` goes back to the provider; `walk_back` reuses the tree the
//!   context already holds
//! - Neither operation dispatches a handler

use std::sync::Arc;

use axum::http::Method;

use crate::config::RouterOptions;
use crate::traversal::{traverse, HandlerName, SubpathLimit, Traversal, TraversalError, TraversalResult};
use crate::tree::{ResourceNode, ResourceTree, SubtreeMap, TreeProvider};

/// Traversal state handed to a handler.
pub struct Context {
    tree: ResourceTree,
    current: ResourceNode,
    path: Vec<String>,
    subpath: Vec<String>,
    handler: HandlerName,
    method: Method,
    provider: Arc<dyn TreeProvider>,
    options: Arc<RouterOptions>,
}

impl Context {
    pub(crate) fn new(
        tree: ResourceTree,
        path: Vec<String>,
        traversal: Traversal,
        method: Method,
        provider: Arc<dyn TreeProvider>,
        options: Arc<RouterOptions>,
    ) -> Self {
        Self {
            tree,
            current: traversal.current,
            path,
            subpath: traversal.subpath,
            handler: traversal.handler,
            method,
            provider,
            options,
        }
    }

    /// The node traversal stopped at.
    pub fn current(&self) -> &ResourceNode {
        &self.current
    }

    /// Full token path of the request.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Tokens left over after the handler name.
    pub fn subpath(&self) -> &[String] {
        &self.subpath
    }

    /// The resource tree this context was resolved against.
    pub fn tree(&self) -> &ResourceTree {
        &self.tree
    }

    /// Handler name traversal produced. May differ from the handler that runs
    /// when the router fell back to its default handler.
    pub fn handler_name(&self) -> &str {
        self.handler.as_str()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Re-fetch the tree and re-resolve the original path against it.
    ///
    /// Overwrites tree, current object, subpath and handler name. On error the
    /// context is left unchanged.
    pub async fn refresh(&mut self) -> TraversalResult<()> {
        let tree = self
            .provider
            .fetch()
            .await
            .map_err(TraversalError::RootTree)?;
        let limit = self.options.subpath_limit(self.method.as_str());
        let traversal = traverse(&tree, &self.path, limit, self.options.strict_traversal)?;

        tracing::debug!(
            path = ?self.path,
            handler = %traversal.handler,
            subpath = ?traversal.subpath,
            "Context refreshed"
        );

        self.tree = tree;
        self.current = traversal.current;
        self.subpath = traversal.subpath;
        self.handler = traversal.handler;
        Ok(())
    }

    /// The branch reached after dropping the last `n` tokens of the path.
    ///
    /// Resolves against this context's tree with no subpath allowed. Dropping
    /// every token yields the root.
    pub fn walk_back(&self, n: usize) -> TraversalResult<SubtreeMap> {
        if n > self.path.len() {
            return Err(TraversalError::WalkBack(format!(
                "{} exceeds path length {}",
                n,
                self.path.len()
            )));
        }

        let prefix = if n == self.path.len() {
            vec![String::new()]
        } else {
            self.path[..self.path.len() - n].to_vec()
        };

        let traversal = traverse(
            &self.tree,
            &prefix,
            SubpathLimit::Max(0),
            self.options.strict_traversal,
        )?;

        match traversal.current {
            ResourceNode::Subtree(map) => Ok(map),
            ResourceNode::Leaf(_) => Err(TraversalError::WalkBack(format!(
                "node at /{} is not a subtree",
                prefix.join("/")
            ))),
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("handler", &self.handler)
            .field("subpath", &self.subpath)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ProviderError, SharedTree, StaticTree};
    use crate::traversal::tokenize;
    use serde_json::json;

    fn tree() -> ResourceTree {
        ResourceTree::try_from(json!({
            "foo": {
                "bar": { "baz": {}, "%handler": "bar" },
                "data": "leaf",
            }
        }))
        .unwrap()
    }

    fn options() -> Arc<RouterOptions> {
        Arc::new(RouterOptions::strict_defaults())
    }

    fn context(provider: Arc<dyn TreeProvider>, path: &str, method: Method) -> Context {
        let tree = tree();
        let tokens = tokenize(path);
        let opts = options();
        let traversal = traverse(
            &tree,
            &tokens,
            opts.subpath_limit(method.as_str()),
            opts.strict_traversal,
        )
        .unwrap();
        Context::new(tree, tokens, traversal, method, provider, opts)
    }

    fn static_context(path: &str) -> Context {
        context(Arc::new(StaticTree::new(tree())), path, Method::GET)
    }

    #[test]
    fn test_accessors() {
        let ctx = static_context("/foo/bar/edit/1");
        assert_eq!(ctx.path(), ["foo", "bar", "edit", "1"]);
        assert_eq!(ctx.subpath(), ["1"]);
        assert_eq!(ctx.handler_name(), "edit");
        assert_eq!(ctx.method(), &Method::GET);
        assert_eq!(ctx.current(), tree().root().child("foo").unwrap().child("bar").unwrap());
        assert_eq!(ctx.tree(), &tree());
    }

    #[test]
    fn test_walk_back() {
        let ctx = static_context("/foo/bar/baz");

        let foo = tree().root().child("foo").unwrap().as_subtree().unwrap().clone();
        assert_eq!(ctx.walk_back(2).unwrap(), foo);

        let bar = foo.get("bar").unwrap().as_subtree().unwrap().clone();
        assert_eq!(ctx.walk_back(1).unwrap(), bar);

        // Nothing dropped: the full path's own node.
        assert_eq!(ctx.walk_back(0).unwrap(), SubtreeMap::new());

        // Everything dropped: the root.
        assert_eq!(ctx.walk_back(3).unwrap(), tree().root().as_subtree().unwrap().clone());
    }

    #[test]
    fn test_walk_back_too_far() {
        let ctx = static_context("/foo/bar");
        assert!(matches!(ctx.walk_back(3), Err(TraversalError::WalkBack(_))));
    }

    #[test]
    fn test_walk_back_to_leaf_fails() {
        let ctx = static_context("/foo/data/view");
        assert!(matches!(ctx.walk_back(1), Err(TraversalError::WalkBack(_))));
    }

    #[test]
    fn test_walk_back_with_subpath_is_not_found() {
        let ctx = static_context("/foo/edit/1/2");
        // "/foo/edit/1" leaves a subpath of one token, but walk back allows none.
        assert!(matches!(ctx.walk_back(1), Err(TraversalError::NotFound { .. })));
        // "/foo/edit" resolves with an empty subpath.
        assert_eq!(ctx.walk_back(2).unwrap(), tree().root().child("foo").unwrap().as_subtree().unwrap().clone());
    }

    #[tokio::test]
    async fn test_refresh_sees_new_tree() {
        let shared = SharedTree::new(tree());
        let mut ctx = context(Arc::new(shared.clone()), "/foo/bar/qux", Method::GET);
        assert_eq!(ctx.handler_name(), "qux");

        shared.update(|t| {
            let foo = t.root_mut().get_mut("foo").unwrap();
            if let ResourceNode::Subtree(children) = foo {
                let bar = children.get_mut("bar").unwrap();
                if let ResourceNode::Subtree(bar) = bar {
                    bar.insert("qux".into(), ResourceNode::from(json!({ "v": 1 })));
                }
            }
        });

        ctx.refresh().await.unwrap();
        assert_eq!(ctx.handler_name(), "");
        assert_eq!(ctx.current(), &ResourceNode::from(json!({ "v": 1 })));
        assert!(ctx.subpath().is_empty());
        assert!(ctx.tree().root().child("foo").unwrap().child("bar").unwrap().child("qux").is_some());
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let mut ctx = static_context("/foo/bar/edit/1");
        ctx.refresh().await.unwrap();
        let (current, subpath) = (ctx.current().clone(), ctx.subpath().to_vec());
        ctx.refresh().await.unwrap();
        assert_eq!(ctx.current(), &current);
        assert_eq!(ctx.subpath(), subpath.as_slice());
    }

    #[tokio::test]
    async fn test_refresh_uses_request_verb_limit() {
        let shared = SharedTree::new(tree());
        let mut ctx = context(Arc::new(shared.clone()), "/foo/bar", Method::PUT);

        shared.update(|t| {
            t.root_mut().remove("foo");
        });

        // "/foo/bar" now misses at "foo" with one trailing token; PUT allows none.
        let err = ctx.refresh().await.unwrap_err();
        assert!(matches!(err, TraversalError::NotFound { .. }));
        // Unchanged on error.
        assert_eq!(ctx.handler_name(), "bar");
    }

    #[tokio::test]
    async fn test_refresh_provider_failure() {
        let failing = || async { Err::<ResourceTree, ProviderError>("backing store offline".into()) };
        let mut ctx = context(Arc::new(failing), "/foo", Method::GET);
        assert!(matches!(ctx.refresh().await, Err(TraversalError::RootTree(_))));
    }
}
