use std::collections::HashMap;

use crate::entry::CacheEntry;

/// One backend's `block_no -> CacheEntry` mapping.
///
/// A thin wrapper over a `HashMap`, not a bare alias: [`BlockIndex::insert`]
/// enforces the one-entry-per-block invariant itself rather than trusting
/// every call site to have checked first. The façade in `cache.rs` still
/// guards its own `insert` calls with a `lookup`/`contains_key` check so the
/// panic below is never reachable in practice; it exists so that a future
/// caller who forgets that guard fails loudly instead of silently clobbering
/// a live entry.
#[derive(Default)]
pub(crate) struct BlockIndex(HashMap<u64, CacheEntry>);

impl BlockIndex {
	pub(crate) fn lookup(&self, block_no: u64) -> Option<&CacheEntry> {
		self.0.get(&block_no)
	}

	pub(crate) fn lookup_mut(&mut self, block_no: u64) -> Option<&mut CacheEntry> {
		self.0.get_mut(&block_no)
	}

	pub(crate) fn contains(&self, block_no: u64) -> bool {
		self.0.contains_key(&block_no)
	}

	/// Inserts `entry` for `block_no`.
	///
	/// # Panics
	///
	/// Panics if `block_no` is already present. A block number appears in at
	/// most one entry per backend; a collision here means a caller inserted
	/// without first checking for an existing entry, which is an invariant
	/// violation the surrounding driver is entitled to crash on.
	pub(crate) fn insert(&mut self, block_no: u64, entry: CacheEntry) {
		if self.0.contains_key(&block_no) {
			panic!("duplicate insert for block {block_no}: already present in this backend's index");
		}
		self.0.insert(block_no, entry);
	}

	/// Removes and returns the entry for `block_no`, if any.
	pub(crate) fn remove(&mut self, block_no: u64) -> Option<CacheEntry> {
		self.0.remove(&block_no)
	}

	pub(crate) fn len(&self) -> usize {
		self.0.len()
	}

	/// Removes every entry, yielding each `(block_no, entry)` pair. Used by
	/// [`crate::cache::Cache::destroy_backend`] to drain a backend being torn
	/// down.
	pub(crate) fn drain(&mut self) -> impl Iterator<Item = (u64, CacheEntry)> + '_ {
		self.0.drain()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::pool::BlockPool;

	fn entry() -> CacheEntry {
		let pool = BlockPool::new(1);
		CacheEntry::fresh(pool.allocate().unwrap())
	}

	#[test]
	fn lookup_after_insert() {
		let mut index = BlockIndex::default();
		index.insert(7, entry());
		assert!(index.lookup(7).is_some());
		assert!(index.lookup(8).is_none());
		assert_eq!(index.len(), 1);
	}

	#[test]
	fn remove_returns_the_entry() {
		let mut index = BlockIndex::default();
		index.insert(1, entry());
		assert!(index.remove(1).is_some());
		assert!(index.lookup(1).is_none());
		assert_eq!(index.len(), 0);
	}

	// §4.2/§7: a block number appears in at most one entry per backend;
	// inserting a second entry for an already-present block number is an
	// invariant violation, not a recoverable error.
	#[test]
	#[should_panic(expected = "duplicate insert")]
	fn duplicate_insert_panics() {
		let mut index = BlockIndex::default();
		index.insert(3, entry());
		index.insert(3, entry());
	}

	#[test]
	fn drain_empties_the_index() {
		let mut index = BlockIndex::default();
		index.insert(1, entry());
		index.insert(2, entry());
		let drained: Vec<_> = index.drain().map(|(b, _)| b).collect();
		assert_eq!(drained.len(), 2);
		assert_eq!(index.len(), 0);
	}
}
