use crate::error::MappingFailed;

#[cfg(test)]
use mockall::automock;

/// A host memory page, as seen by the surrounding I/O driver.
///
/// Implementors own whatever lifetime/refcounting scheme the frontend ring
/// uses for loaned pages; this crate only ever touches a page through the
/// two scoped-mapping methods below, so the mapping is guaranteed to be
/// released on every exit path, including an early return from the
/// closure.
#[cfg_attr(test, automock)]
pub trait Page {
	/// A value that identifies this host page for as long as the driver
	/// keeps lending it out. Stable across multiple `fetch`/`store` calls
	/// that reuse the same underlying page.
	fn page_id(&self) -> u64;

	/// Maps the page read-only, runs `f` against its bytes, then unmaps.
	fn with_bytes(&self, f: &mut dyn FnMut(&[u8])) -> Result<(), MappingFailed>;

	/// Maps the page read-write, runs `f` against its bytes, then unmaps.
	fn with_bytes_mut(&mut self, f: &mut dyn FnMut(&mut [u8])) -> Result<(), MappingFailed>;
}
