use std::sync::Arc;

use parking_lot::Mutex;
use static_assertions::assert_impl_all;

use crate::{
	backend::{Backend, PerBackendIndex},
	block::{self, Direction},
	consts::{self, BLOCK_BYTES, CACHE_SIZE_LIMIT, POOL_HEADROOM, SECTOR_SIZE},
	detector,
	entry::CacheEntry,
	page::Page,
	pool::BlockPool,
	recency::RecencyList,
};

/// Construction-time configuration for a [`Cache`].
///
/// A small struct with a `Default` pinned to the crate's tunable constants.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
	/// Process-wide cap on live entries across all backends.
	pub capacity: usize,
}

impl Default for CacheConfig {
	fn default() -> Self {
		Self {
			capacity: CACHE_SIZE_LIMIT,
		}
	}
}

/// The block-level read cache.
///
/// One `Cache` owns the global recency list and the preallocated block
/// pool; each virtual backend gets its own [`PerBackendIndex`] handle from
/// [`Cache::new_backend`]. See the crate root for the operations this
/// exposes; [`Cache::enforce_capacity`] documents the eviction locking
/// protocol.
pub struct Cache {
	recency: Mutex<RecencyState>,
	pool: BlockPool,
	capacity: usize,
}

assert_impl_all!(Cache: Send, Sync);

struct RecencyState {
	list: RecencyList,
}

impl Cache {
	/// # Panics
	///
	/// Panics if `config.capacity` is out of bounds (see
	/// [`consts::validate_capacity`]). An invalid capacity is a
	/// misconfiguration, not an opportunistic-degradation case, so it is not
	/// folded into a silent no-op the way allocation or mapping failures are.
	pub fn new(config: CacheConfig) -> Self {
		consts::validate_capacity(config.capacity).expect("invalid cache capacity");
		Self {
			recency: Mutex::new(RecencyState {
				list: RecencyList::new(),
			}),
			pool: BlockPool::new(config.capacity + POOL_HEADROOM),
			capacity: config.capacity,
		}
	}

	/// Creates a new, empty backend index.
	pub fn new_backend(&self) -> PerBackendIndex {
		PerBackendIndex::new()
	}

	/// Drains every entry belonging to `backend` from the global recency
	/// list and frees its pool slots. After this call the handle may be
	/// dropped; its entries will not be visited by eviction.
	pub fn destroy_backend(&self, backend: PerBackendIndex) {
		let mut index = backend.0.index.lock();
		for (_, entry) in index.block_cache.drain() {
			self.pool.free(entry.slot);
			if let Some(node_id) = entry.recency_node {
				let mut recency = self.recency.lock();
				recency.list.remove(node_id);
			}
		}
	}

	/// Current number of live entries across every backend.
	pub fn live_entries(&self) -> usize {
		self.recency.lock().list.len()
	}

	/// Copies a cached block into `page` if it is present and valid for
	/// `backend`. Returns `false` on any miss: unaligned sector, no such
	/// block cached, an invalid entry, or a page-mapping failure. Always
	/// observes `page`'s current contents against the page-reuse detector
	/// first, even on an eventual miss.
	pub fn fetch<P: Page>(
		&self,
		backend: &PerBackendIndex,
		page: &mut P,
		sector_number: u64,
		sector_count: u64,
	) -> bool {
		if !consts::is_block_aligned(sector_number) {
			return false;
		}
		let block_no = consts::block_number(sector_number);

		let mut index = backend.0.index.lock();
		if detector::observe(&mut index.page_checksums, &mut index.counters, page).is_err() {
			log::warn!("page mapping failed during fetch observe for block {block_no}; treating as a miss");
			return false;
		}

		let Some(entry) = index.block_cache.lookup(block_no) else {
			return false;
		};
		if !entry.valid {
			return false;
		}

		let bytes_to_copy = (sector_count as usize) * SECTOR_SIZE;
		let copy_result = self.pool.with_slot(entry.slot, |data| {
			page.with_bytes_mut(&mut |dst| dst[..bytes_to_copy].copy_from_slice(&data[..bytes_to_copy]))
		});
		let Ok(()) = copy_result else {
			log::warn!("page mapping failed while copying cached block {block_no} into page; treating as a miss");
			return false;
		};
		let node_id = entry.recency_node;
		drop(index);

		if let Some(node_id) = node_id {
			self.recency.lock().list.touch(node_id);
		}
		true
	}

	/// Copies `page`'s contents into the cache as the current value for the
	/// block at `sector_number`, allocating a pool slot if the block was not
	/// already cached. A failed mapping leaves no trace: an entry allocated
	/// for this call is torn back down rather than left invalid. Runs
	/// capacity enforcement afterwards, which may evict entries belonging
	/// to any backend.
	pub fn store<P: Page>(&self, backend: &PerBackendIndex, page: &mut P, sector_number: u64) {
		if !consts::is_block_aligned(sector_number) {
			return;
		}
		let block_no = consts::block_number(sector_number);

		let mut index = backend.0.index.lock();
		if !index.block_cache.contains(block_no) {
			let Some(slot) = self.pool.allocate() else {
				log::warn!("block pool exhausted; skipping cache insert for block {block_no}");
				return;
			};
			index.block_cache.insert(block_no, CacheEntry::fresh(slot));
		}

		let mut data = [0u8; BLOCK_BYTES];
		let copy_result = block::copy_block(page, &mut data, Direction::PageToBuffer);

		match copy_result {
			Ok(()) => {
				let entry = index
					.block_cache
					.lookup_mut(block_no)
					.expect("entry inserted or already present above");
				self.pool.with_slot_mut(entry.slot, |slot| *slot = data);
				entry.valid = true;

				let backend_weak = Arc::downgrade(&backend.0);
				let existing_node = entry.recency_node;
				let mut recency = self.recency.lock();
				match existing_node {
					Some(node_id) => recency.list.touch(node_id),
					None => {
						let node_id = recency.list.insert_tail(backend_weak, block_no);
						index
							.block_cache
							.lookup_mut(block_no)
							.expect("entry still present under our own index lock")
							.recency_node = Some(node_id);
					}
				}
				drop(recency);
			}
			Err(_) => {
				log::warn!("page mapping failed while storing block {block_no}; dropping the partial entry");
				if let Some(entry) = index.block_cache.remove(block_no) {
					self.pool.free(entry.slot);
					if let Some(node_id) = entry.recency_node {
						self.recency.lock().list.remove(node_id);
					}
				}
				drop(index);
				return;
			}
		}
		drop(index);

		self.enforce_capacity();
	}

	/// Drops every cached block in `[first_sector, first_sector +
	/// sector_count)` for `backend`, and forgets the page-reuse checksum
	/// recorded for each page in `pages` so a later observation of the same
	/// page is not misclassified as unchanged.
	pub fn invalidate_range<P: Page>(
		&self,
		backend: &PerBackendIndex,
		first_sector: u64,
		sector_count: u64,
		pages: &[P],
	) {
		let start_block = consts::block_number(first_sector);
		let end_block = start_block + (sector_count >> consts::LOG_BLOCK_SIZE);

		let mut index = backend.0.index.lock();
		for block_no in start_block..end_block {
			if let Some(entry) = index.block_cache.remove(block_no) {
				self.pool.free(entry.slot);
				if let Some(node_id) = entry.recency_node {
					self.recency.lock().list.remove(node_id);
				}
			}
		}
		for page in pages {
			detector::forget(&mut index.page_checksums, page.page_id());
		}
	}

	/// Evicts least-recently-touched entries, across all backends, until
	/// `live_entries <= capacity`.
	///
	/// The victim's backend is not known until the recency list is
	/// inspected, and may not be the caller's own, so this can't simply nest
	/// a lock acquisition inside the caller's already-held backend lock
	/// without risking deadlock against a concurrent eviction or store
	/// going the other way. Instead it peeks the head without holding any
	/// backend lock, upgrades the weak backend reference, then acquires
	/// locks in the mandated order (victim's index lock, then the recency
	/// lock) and re-checks that the peeked entry is still the head before
	/// acting. If anything moved in between, it retries from the top.
	fn enforce_capacity(&self) {
		loop {
			let (node_id, backend_weak, block_no) = {
				let recency = self.recency.lock();
				if recency.list.len() <= self.capacity {
					return;
				}
				match recency.list.peek_front() {
					Some(found) => found,
					None => return,
				}
			};

			let Some(victim) = backend_weak.upgrade() else {
				// The owning backend was destroyed concurrently; its
				// entries should already have been drained by
				// `destroy_backend`. Reclaim the now-dangling node
				// directly so we don't spin forever on it.
				let mut recency = self.recency.lock();
				if recency.list.is_still_front(node_id) {
					recency.list.remove(node_id);
				}
				continue;
			};

			let mut victim_index = victim.index.lock();
			let mut recency = self.recency.lock();
			if !recency.list.is_still_front(node_id) {
				// Raced with a concurrent touch or another evictor; the
				// entry we were about to reclaim is no longer the head.
				// Retry from the top rather than evicting the wrong one.
				continue;
			}

			if let Some(entry) = victim_index.block_cache.remove(block_no) {
				self.pool.free(entry.slot);
			}
			recency.list.pop_front();
		}
	}
}
