use crate::{consts::BLOCK_BYTES, error::MappingFailed, page::Page};

/// Which way [`copy_block`] moves bytes between a host page and a
/// block-sized buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	/// Page contents are copied out into the buffer (used by `store`).
	PageToBuffer,
	/// Buffer contents are copied into the page (used by `fetch`).
	BufferToPage,
}

/// Copies a full block (`BLOCK_BYTES`) between `page` and `buffer`.
///
/// There is no `start_offset`/`size` parameter: every call site in this
/// crate moves a whole block, and a partial-block variant would only exist
/// to serve boot-sector or filesystem-superblock parsing, which this crate
/// does not implement.
pub fn copy_block(
	page: &mut impl Page,
	buffer: &mut [u8; BLOCK_BYTES],
	direction: Direction,
) -> Result<(), MappingFailed> {
	match direction {
		Direction::PageToBuffer => page.with_bytes(&mut |src| {
			buffer.copy_from_slice(&src[..BLOCK_BYTES]);
		}),
		Direction::BufferToPage => {
			let src = *buffer;
			page.with_bytes_mut(&mut |dst| {
				dst[..BLOCK_BYTES].copy_from_slice(&src);
			})
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::page::MockPage;

	#[test]
	fn copies_page_into_buffer() {
		let mut page = MockPage::new();
		page.expect_with_bytes()
			.times(1)
			.returning(|f| {
				let data = [7u8; BLOCK_BYTES];
				f(&data);
				Ok(())
			});

		let mut buffer = [0u8; BLOCK_BYTES];
		copy_block(&mut page, &mut buffer, Direction::PageToBuffer).unwrap();
		assert!(buffer.iter().all(|b| *b == 7));
	}

	#[test]
	fn copies_buffer_into_page() {
		let mut page = MockPage::new();
		page.expect_with_bytes_mut().times(1).returning(|f| {
			let mut data = [0u8; BLOCK_BYTES];
			f(&mut data);
			assert!(data.iter().all(|b| *b == 9));
			Ok(())
		});

		let mut buffer = [9u8; BLOCK_BYTES];
		copy_block(&mut page, &mut buffer, Direction::BufferToPage).unwrap();
	}

	#[test]
	fn propagates_mapping_failure() {
		let mut page = MockPage::new();
		page.expect_with_bytes()
			.returning(|_| Err(MappingFailed { page_id: 1 }));

		let mut buffer = [0u8; BLOCK_BYTES];
		assert!(copy_block(&mut page, &mut buffer, Direction::PageToBuffer).is_err());
	}
}
