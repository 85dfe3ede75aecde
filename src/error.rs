use thiserror::Error;

/// A host page could not be mapped into addressable memory, or the
/// mapping could not be obtained without blocking.
///
/// This is the only error type that crosses a `Page` method boundary.
/// Every caller in this crate treats the cache as an opportunistic
/// optimization and folds this into that failure mode: a miss for `fetch`,
/// a silent no-op for `store`/`observe`. It is never returned from a
/// public [`crate::Cache`] method.
#[derive(Debug, Error)]
#[error("failed to map host page {page_id} into memory")]
pub struct MappingFailed {
	pub page_id: u64,
}
