//! Tunable constants shared across the cache.

use thiserror::Error;

/// Block size, expressed as a power-of-two multiple of [`SECTOR_SIZE`].
pub const LOG_BLOCK_SIZE: u32 = 3;

/// Bytes per sector.
pub const SECTOR_SIZE: usize = 512;

/// Bytes per cache block: `2^LOG_BLOCK_SIZE * SECTOR_SIZE`.
pub const BLOCK_BYTES: usize = (1 << LOG_BLOCK_SIZE) * SECTOR_SIZE;

/// Default process-wide cap on live cache entries across all backends.
pub const CACHE_SIZE_LIMIT: usize = 20_000;

/// Slack above the configured capacity in the preallocated block pool, to
/// absorb the transient overshoot between an insert and the eviction loop
/// that follows it catching back up.
pub const POOL_HEADROOM: usize = 64;

/// Mask over the low bits of a sector number that must be zero for the
/// sector to be block-aligned.
const ALIGNMENT_MASK: u64 = (1 << LOG_BLOCK_SIZE) - 1;

/// `true` iff `sector_number` addresses the start of a block.
#[inline]
pub fn is_block_aligned(sector_number: u64) -> bool {
	sector_number & ALIGNMENT_MASK == 0
}

/// The block number containing `sector_number`. Only meaningful when
/// [`is_block_aligned`] holds for the caller's chosen sector.
#[inline]
pub fn block_number(sector_number: u64) -> u64 {
	sector_number >> LOG_BLOCK_SIZE
}

/// A [`crate::CacheConfig`] whose `capacity` cannot back a cache: the cache
/// must hold at least one live entry, never zero.
#[derive(Debug, Error)]
#[error("cache capacity {0} is invalid; must be at least 1")]
pub struct CapacityBoundsError(usize);

/// Bounds-checks a configured capacity. Grounds
/// [`crate::CacheConfig::capacity`] the same way [`is_block_aligned`] grounds
/// a sector number: a single place that rejects an out-of-range value before
/// it reaches the rest of the cache.
#[inline]
pub fn validate_capacity(capacity: usize) -> Result<(), CapacityBoundsError> {
	if capacity == 0 {
		return Err(CapacityBoundsError(capacity));
	}
	Ok(())
}
