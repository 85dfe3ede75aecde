use std::collections::HashMap;

use crate::{consts::BLOCK_BYTES, error::MappingFailed, page::Page};

/// Advisory counters maintained by [`observe`]. Nothing in the cache's
/// correctness depends on these; they only feed whoever wants visibility
/// into how often the host is recycling pages out from under us.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DetectorCounters {
	pub unrecognized_pages: u64,
	pub same_pages: u64,
	pub changed_pages: u64,
}

/// Sums every 64-bit word on a block-sized page. Deliberately
/// content-agnostic and cheap: collisions are tolerated, because this
/// value only ever feeds a counter, never a cache-hit decision.
fn checksum(bytes: &[u8; BLOCK_BYTES]) -> u64 {
	bytes
		.chunks_exact(8)
		.fold(0u64, |acc, word| acc.wrapping_add(u64::from_ne_bytes(word.try_into().unwrap())))
}

/// Observes `page`'s current contents against the checksum last recorded
/// for `page_id` in `checksums`, updating `counters` and `checksums`
/// accordingly.
///
/// Runs under the owning backend's index lock (the caller holds it), since
/// `checksums`/`counters` are both fields of that backend's index.
pub fn observe(
	checksums: &mut HashMap<u64, u64>,
	counters: &mut DetectorCounters,
	page: &impl Page,
) -> Result<(), MappingFailed> {
	let mut data = [0u8; BLOCK_BYTES];
	page.with_bytes(&mut |src| data.copy_from_slice(&src[..BLOCK_BYTES]))?;
	let new_sum = checksum(&data);
	let page_id = page.page_id();

	match checksums.get(&page_id).copied() {
		None => {
			counters.unrecognized_pages += 1;
			if checksums.try_reserve(1).is_ok() {
				checksums.insert(page_id, new_sum);
			} else {
				log::warn!(
					"page checksum table allocation failed; dropping page-reuse observation for page {page_id}"
				);
			}
		}
		Some(previous) if previous == new_sum => {
			counters.same_pages += 1;
			checksums.insert(page_id, new_sum);
		}
		Some(_) => {
			counters.changed_pages += 1;
			checksums.insert(page_id, new_sum);
		}
	}
	Ok(())
}

/// Forgets any checksum recorded for `page_id`, so a later observation of
/// the same page is treated as unrecognized rather than misclassified as
/// unchanged. Called by `invalidate_range` for every page it invalidates.
pub fn forget(checksums: &mut HashMap<u64, u64>, page_id: u64) {
	checksums.remove(&page_id);
}
