//! Atomic policy snapshot store.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use crate::error::EngineResult;

use super::loader::PolicyLoader;
use super::types::{PolicyDocument, PolicySnapshot};

/// Holds the current policy snapshot and swaps it wholesale on update.
///
/// Readers take an `Arc` to the snapshot and evaluate against it for the
/// whole operation, so they never see a partially applied update. Updates
/// are validated before they become visible and bump the version.
#[derive(Debug)]
pub struct PolicyStore {
    current: ArcSwap<PolicySnapshot>,
}

impl PolicyStore {
    /// Creates a store holding `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPolicy`](crate::error::EngineError::InvalidPolicy)
    /// if the snapshot is invalid.
    pub fn new(snapshot: PolicySnapshot) -> EngineResult<Self> {
        snapshot.validate()?;
        Ok(Self {
            current: ArcSwap::from_pointee(snapshot),
        })
    }

    /// Creates a store from a policy directory.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        Self::new(PolicyLoader::load(path)?.into_snapshot())
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<PolicySnapshot> {
        self.current.load_full()
    }

    /// Replaces one policy document and returns the new snapshot version.
    ///
    /// Concurrent replacements of different documents are both kept; each
    /// gets its own version.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPolicy`](crate::error::EngineError::InvalidPolicy)
    /// (leaving the current snapshot untouched) if the document fails validation.
    pub fn replace(&self, document: PolicyDocument) -> EngineResult<u64> {
        document.validate()?;
        let domain = document.domain();

        let previous = self.current.rcu(|current| {
            let mut next = PolicySnapshot::clone(current);
            next.version += 1;
            match &document {
                PolicyDocument::Attendance(doc) => next.attendance = doc.clone(),
                PolicyDocument::Payroll(doc) => next.payroll = doc.clone(),
                PolicyDocument::Leave(doc) => next.leave = doc.clone(),
                PolicyDocument::Reward(doc) => next.reward = doc.clone(),
            }
            next
        });
        let version = previous.version + 1;

        info!(domain, version, "Replaced policy document");
        Ok(version)
    }
}
