//! Positional byte buffers: an append-only writer and a cursor reader.

use borsh::BorshDeserialize;

#[derive(Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity) }
    }

    pub fn put(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Copy `bytes` and zero-fill up to `len`. Caller guarantees `bytes.len() <= len`.
    pub fn put_padded(&mut self, bytes: &[u8], len: usize) {
        self.buf.extend_from_slice(bytes);
        self.buf.resize(self.buf.len() + (len - bytes.len()), 0);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

/// Left-to-right reader with an explicit cursor. Never reads past the end.
#[derive(Debug)]
pub struct WireReader<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Consume exactly `n` bytes, or `None` if fewer remain.
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.cursor.checked_add(n)?;
        let out = self.data.get(self.cursor..end)?;
        self.cursor = end;
        Some(out)
    }

    /// Consume `n` bytes and borsh-decode them as `T`.
    pub fn read<T: BorshDeserialize>(&mut self, n: usize) -> Option<T> {
        let mut bytes = self.take(n)?;
        T::deserialize(&mut bytes).ok()
    }
}

/// Strip trailing zero bytes, keeping any interior zeros.
pub fn trim_trailing_zeros(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_refuses_to_overrun() {
        let mut r = WireReader::new(&[1, 2, 3]);
        assert_eq!(r.take(2), Some(&[1u8, 2][..]));
        assert_eq!(r.take(2), None);
        assert_eq!(r.position(), 2);
        assert_eq!(r.remaining(), 1);
    }

    #[test]
    fn reader_decodes_little_endian() {
        let mut r = WireReader::new(&[0x2a, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(r.read::<u64>(8), Some(42));
    }

    #[test]
    fn trim_keeps_interior_zeros() {
        assert_eq!(trim_trailing_zeros(b"a\0b\0\0"), b"a\0b");
        assert_eq!(trim_trailing_zeros(&[0, 0]), b"");
    }

    #[test]
    fn writer_pads_on_the_right() {
        let mut w = WireWriter::default();
        w.put_padded(b"ab", 4);
        assert_eq!(w.into_inner(), vec![b'a', b'b', 0, 0]);
    }
}
