//! Resource tree providers.
//!
//! # Responsibilities
//! - Supply a fresh `ResourceTree` for every request and every `Context::refresh`
//! - Report backing-store failures as errors, never panics
//!
//! # Design Decisions
//! - Object safe (`Arc<dyn TreeProvider>`) so routers stay non-generic
//! - No caching: each `fetch` goes back to the source
//! - Any `Fn() -> Future` closure is a provider

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use futures_util::future::{BoxFuture, FutureExt};
use thiserror::Error;

use super::ResourceTree;

/// Error returned by a provider. Wrapped into `TraversalError::RootTree` by the router.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// Source of the resource tree.
pub trait TreeProvider: Send + Sync + 'static {
    fn fetch(&self) -> BoxFuture<'static, Result<ResourceTree, ProviderError>>;
}

impl<F, Fut> TreeProvider for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ResourceTree, ProviderError>> + Send + 'static,
{
    fn fetch(&self) -> BoxFuture<'static, Result<ResourceTree, ProviderError>> {
        (self)().boxed()
    }
}

/// Errors reading a tree from a file or JSON document.
#[derive(Debug, Error)]
pub enum TreeSourceError {
    #[error("failed to read resource tree {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid resource tree JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("resource tree root must be a JSON object")]
    NotAnObject,
}

/// Hands out a clone of a fixed tree.
#[derive(Debug, Clone)]
pub struct StaticTree {
    tree: Arc<ResourceTree>,
}

impl StaticTree {
    pub fn new(tree: ResourceTree) -> Self {
        Self { tree: Arc::new(tree) }
    }
}

impl TreeProvider for StaticTree {
    fn fetch(&self) -> BoxFuture<'static, Result<ResourceTree, ProviderError>> {
        let tree = ResourceTree::clone(&self.tree);
        async move { Ok::<_, ProviderError>(tree) }.boxed()
    }
}

/// An in-memory tree that handlers can modify.
///
/// Clones share the same tree, so a handler holding a clone can write and then
/// observe its own write through `Context::refresh`.
#[derive(Debug, Clone, Default)]
pub struct SharedTree {
    inner: Arc<RwLock<ResourceTree>>,
}

impl SharedTree {
    pub fn new(tree: ResourceTree) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Apply a mutation to the shared tree.
    pub fn update<R>(&self, f: impl FnOnce(&mut ResourceTree) -> R) -> R {
        let mut tree = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut tree)
    }

    /// Current contents.
    pub fn snapshot(&self) -> ResourceTree {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl TreeProvider for SharedTree {
    fn fetch(&self) -> BoxFuture<'static, Result<ResourceTree, ProviderError>> {
        let tree = self.snapshot();
        async move { Ok::<_, ProviderError>(tree) }.boxed()
    }
}

/// Reads and parses a JSON file on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileTree {
    path: PathBuf,
}

impl JsonFileTree {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the tree from disk.
    pub async fn load(path: &Path) -> Result<ResourceTree, TreeSourceError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| TreeSourceError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        ResourceTree::from_json_str(&text)
    }
}

impl TreeProvider for JsonFileTree {
    fn fetch(&self) -> BoxFuture<'static, Result<ResourceTree, ProviderError>> {
        let path = self.path.clone();
        async move { Ok::<_, ProviderError>(Self::load(&path).await?) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::ResourceNode;
    use serde_json::json;
    use std::io::Write;

    fn sample() -> ResourceTree {
        ResourceTree::try_from(json!({ "foo": { "bar": {} } })).unwrap()
    }

    #[tokio::test]
    async fn test_static_tree_returns_copy() {
        let provider = StaticTree::new(sample());
        let first = provider.fetch().await.unwrap();
        let second = provider.fetch().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first, sample());
    }

    #[tokio::test]
    async fn test_shared_tree_sees_updates() {
        let provider = SharedTree::new(sample());
        let writer = provider.clone();

        writer.update(|tree| {
            tree.root_mut()
                .insert("baz".to_string(), ResourceNode::Leaf(json!("new")));
        });

        let tree = provider.fetch().await.unwrap();
        assert_eq!(tree.root().child("baz"), Some(&ResourceNode::Leaf(json!("new"))));
    }

    #[tokio::test]
    async fn test_closure_provider() {
        let provider = || async { Ok::<_, ProviderError>(ResourceTree::default()) };
        let boxed: Arc<dyn TreeProvider> = Arc::new(provider);
        assert_eq!(boxed.fetch().await.unwrap(), ResourceTree::default());
    }

    #[tokio::test]
    async fn test_json_file_tree_reads_every_fetch() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"a": {{}}}}"#).unwrap();
        file.flush().unwrap();

        let provider = JsonFileTree::new(file.path());
        let tree = provider.fetch().await.unwrap();
        assert!(tree.root().child("a").is_some());

        std::fs::write(file.path(), r#"{"b": 1}"#).unwrap();
        let tree = provider.fetch().await.unwrap();
        assert!(tree.root().child("a").is_none());
        assert!(tree.root().child("b").is_some());
    }

    #[tokio::test]
    async fn test_json_file_tree_errors() {
        // The error carries the path, so the router's single log line names the file.
        let provider = JsonFileTree::new("/nonexistent/tree.json");
        let err = provider.fetch().await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tree.json"));

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[1, 2]").unwrap();
        let err = JsonFileTree::load(file.path()).await.unwrap_err();
        assert!(matches!(err, TreeSourceError::NotAnObject));
    }
}
