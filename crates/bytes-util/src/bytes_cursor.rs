use std::io;

use bytes::Bytes;

/// A cursor over a [`Bytes`] buffer, enabling zero-copy extraction.
pub type BytesCursor = io::Cursor<Bytes>;

/// Zero-copy reads on a [`BytesCursor`].
///
/// Extracted slices share the underlying buffer; no bytes are copied.
pub trait BytesCursorExt {
    /// Extracts everything between the current position and the end of the
    /// buffer, advancing the cursor to the end.
    fn extract_remaining(&mut self) -> Bytes;

    /// Extracts exactly `size` bytes, advancing the cursor past them.
    /// Fails with [`io::ErrorKind::UnexpectedEof`] if fewer remain.
    fn extract_bytes(&mut self, size: usize) -> io::Result<Bytes>;

    /// Number of bytes between the current position and the end.
    fn remaining_len(&self) -> usize;
}

impl BytesCursorExt for BytesCursor {
    fn extract_remaining(&mut self) -> Bytes {
        // Cannot fail: the size is exactly what is left.
        self.extract_bytes(self.remaining_len()).unwrap_or_default()
    }

    fn extract_bytes(&mut self, size: usize) -> io::Result<Bytes> {
        if size == 0 {
            return Ok(Bytes::new());
        }

        if size > self.remaining_len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "not enough bytes",
            ));
        }

        let position = self.position() as usize;
        let slice = self.get_ref().slice(position..position + size);
        self.set_position((position + size) as u64);

        Ok(slice)
    }

    fn remaining_len(&self) -> usize {
        self.get_ref()
            .len()
            .saturating_sub(self.position() as usize)
    }
}
