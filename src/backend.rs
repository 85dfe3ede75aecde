use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use static_assertions::assert_impl_all;

use crate::{detector::DetectorCounters, index::BlockIndex};

/// One virtual backend's private cache state: its block index, its
/// page-reuse checksum table, and its detector counters.
///
/// Guarded by a single mutex: this backend's index lock covers its
/// `block_cache`, `page_checksums`, and counters together.
pub(crate) struct Backend {
	pub(crate) index: Mutex<BackendIndex>,
}

assert_impl_all!(Backend: Send, Sync);

#[derive(Default)]
pub(crate) struct BackendIndex {
	pub(crate) block_cache: BlockIndex,
	pub(crate) page_checksums: HashMap<u64, u64>,
	pub(crate) counters: DetectorCounters,
}

impl Backend {
	pub(crate) fn new() -> Self {
		Self {
			index: Mutex::new(BackendIndex::default()),
		}
	}
}

/// A handle to one virtual backend's cache state, returned by
/// [`crate::Cache::new_backend`] and passed to every subsequent
/// `fetch`/`store`/`invalidate_range` call for that backend.
///
/// Cloning shares the same underlying backend (it is an `Arc` handle);
/// distinct handles from distinct [`crate::Cache::new_backend`] calls never
/// share entries, so distinct backends may independently cache the same
/// block number.
#[derive(Clone)]
pub struct PerBackendIndex(pub(crate) Arc<Backend>);

impl PerBackendIndex {
	pub(crate) fn new() -> Self {
		Self(Arc::new(Backend::new()))
	}

	/// Snapshot of this backend's page-reuse counters.
	pub fn counters(&self) -> DetectorCounters {
		self.0.index.lock().counters
	}

	/// Number of blocks currently cached for this backend.
	pub fn len(&self) -> usize {
		self.0.index.lock().block_cache.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
