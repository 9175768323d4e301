//! Named print targets.
//!
//! A target is a rendered [`DocumentTree`] registered under an element id. Printing or exporting a
//! target holds a [`TargetGuard`] for the duration of the action; a second action on the same id
//! while the guard is alive fails with [`PrintError::TargetBusy`].

use crate::document::PrintableDocument;
use crate::markup::DocumentTree;
use crate::render::document_tree;
use crate::{PrintError, PrintResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Targets {
    trees: HashMap<String, DocumentTree>,
    busy: HashSet<String>,
}

/// Shared store of print targets. Cloning shares the store.
#[derive(Clone, Debug, Default)]
pub struct TargetRegistry {
    inner: Arc<Mutex<Targets>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Targets> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `tree` under `id`, replacing any previous tree with that id.
    pub fn register(&self, id: impl Into<String>, tree: DocumentTree) {
        let id = id.into();
        tracing::debug!(target_id = %id, "registered print target");
        self.lock().trees.insert(id, tree);
    }

    /// Renders `document` and registers the result under `id`.
    pub fn register_document(&self, id: impl Into<String>, document: &PrintableDocument) {
        self.register(id, document_tree(document));
    }

    pub fn remove(&self, id: &str) -> Option<DocumentTree> {
        self.lock().trees.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().trees.contains_key(id)
    }

    pub fn is_busy(&self, id: &str) -> bool {
        self.lock().busy.contains(id)
    }

    /// Marks `id` as in use and returns a snapshot of its tree.
    pub fn acquire(&self, id: &str) -> PrintResult<TargetGuard> {
        let mut targets = self.lock();
        let tree = targets
            .trees
            .get(id)
            .cloned()
            .ok_or_else(|| PrintError::TargetNotFound(id.to_string()))?;
        if !targets.busy.insert(id.to_string()) {
            return Err(PrintError::TargetBusy(id.to_string()));
        }
        Ok(TargetGuard {
            registry: self.clone(),
            id: id.to_string(),
            tree,
        })
    }
}

/// Exclusive use of one target. Releases the target when dropped.
#[derive(Debug)]
pub struct TargetGuard {
    registry: TargetRegistry,
    id: String,
    tree: DocumentTree,
}

impl TargetGuard {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }
}

impl Drop for TargetGuard {
    fn drop(&mut self) {
        self.registry.lock().busy.remove(&self.id);
    }
}
