use crate::{pool::PoolSlot, recency::NodeId};

/// A cached copy of one block, owned by exactly one backend's index.
///
/// There is no distinct `Fresh` variant: an entry is only ever inserted
/// into a backend's index at the moment it transitions towards valid (see
/// [`crate::cache::Cache::store`]), so `valid == false` is observable only
/// for the instant between insertion and the block copy completing, all
/// under the same index-lock critical section. There is no
/// invalid-but-retained state either: every path that would otherwise
/// produce one instead removes the entry.
pub struct CacheEntry {
	pub slot: PoolSlot,
	pub valid: bool,
	pub recency_node: Option<NodeId>,
}

impl CacheEntry {
	pub fn fresh(slot: PoolSlot) -> Self {
		Self {
			slot,
			valid: false,
			recency_node: None,
		}
	}
}
