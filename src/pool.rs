use parking_lot::Mutex;

use crate::consts::BLOCK_BYTES;

/// A handle into a [`BlockPool`]'s storage. Opaque to callers outside this
/// crate; the only operations on it are through the pool that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSlot(usize);

/// Preallocated storage for cache-entry block data.
///
/// Every entry a backend's index can point at needs `BLOCK_BYTES` of
/// storage, and `store`/`fetch` run where blocking allocation is
/// forbidden: any allocator used here must accept an atomic/nowait flag
/// or be preallocated. This pool allocates all of its storage up front and
/// hands out slots from a freelist; [`BlockPool::allocate`] never blocks
/// and never grows, returning `None` instead of allocating past capacity.
pub struct BlockPool {
	slots: Mutex<PoolState>,
}

struct PoolState {
	blocks: Vec<Box<[u8; BLOCK_BYTES]>>,
	free: Vec<usize>,
}

impl BlockPool {
	/// Preallocates `capacity` block-sized slots.
	pub fn new(capacity: usize) -> Self {
		let blocks = (0..capacity)
			.map(|_| Box::new([0u8; BLOCK_BYTES]))
			.collect::<Vec<_>>();
		let free = (0..capacity).rev().collect();
		Self {
			slots: Mutex::new(PoolState { blocks, free }),
		}
	}

	/// Claims a free slot, or `None` if the pool is exhausted.
	pub fn allocate(&self) -> Option<PoolSlot> {
		self.slots.lock().free.pop().map(PoolSlot)
	}

	/// Returns a slot to the freelist. The slot must not be read through
	/// again after this call.
	pub fn free(&self, slot: PoolSlot) {
		self.slots.lock().free.push(slot.0);
	}

	/// Runs `f` against the slot's bytes, read-only.
	pub fn with_slot<R>(&self, slot: PoolSlot, f: impl FnOnce(&[u8; BLOCK_BYTES]) -> R) -> R {
		f(&self.slots.lock().blocks[slot.0])
	}

	/// Runs `f` against the slot's bytes, read-write.
	pub fn with_slot_mut<R>(
		&self,
		slot: PoolSlot,
		f: impl FnOnce(&mut [u8; BLOCK_BYTES]) -> R,
	) -> R {
		f(&mut self.slots.lock().blocks[slot.0])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn allocate_up_to_capacity_then_exhausts() {
		let pool = BlockPool::new(2);
		let a = pool.allocate().unwrap();
		let b = pool.allocate().unwrap();
		assert!(pool.allocate().is_none());

		pool.free(a);
		assert!(pool.allocate().is_some());
		let _ = b;
	}

	#[test]
	fn round_trips_bytes() {
		let pool = BlockPool::new(1);
		let slot = pool.allocate().unwrap();
		pool.with_slot_mut(slot, |data| data.fill(0x42));
		pool.with_slot(slot, |data| assert!(data.iter().all(|b| *b == 0x42)));
	}
}
