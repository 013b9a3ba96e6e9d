//! Circular output window.
//!
//! Holds the most recently produced bytes for back-references and for the
//! literal decoder's match byte. The capacity comes from the stream header
//! and is not necessarily a power of two, so wraparound is an explicit
//! bounds check rather than a mask.

/// Smallest window the decoder allocates.
pub const MIN_WINDOW_SIZE: usize = 1 << 12;

#[derive(Debug, Clone)]
pub struct OutWindow {
    buf: Vec<u8>,
    /// Next write position
    pos: usize,
    /// Total bytes written
    total_written: u64,
}

impl OutWindow {
    /// Create a window holding at least `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity.max(MIN_WINDOW_SIZE)],
            pos: 0,
            total_written: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Whether a byte `distance + 1` positions back has been produced and is still held.
    #[inline]
    pub fn has_distance(&self, distance: u32) -> bool {
        u64::from(distance) < self.total_written && (distance as usize) < self.buf.len()
    }

    /// Append a byte.
    #[inline]
    pub fn put_byte(&mut self, byte: u8) {
        self.buf[self.pos] = byte;
        self.pos += 1;
        if self.pos == self.buf.len() {
            self.pos = 0;
        }
        self.total_written += 1;
    }

    /// Byte `distance + 1` positions behind the write cursor; 0 is the previous byte.
    ///
    /// Before anything is written this reads the zero-filled buffer, which is
    /// what the literal decoder expects as the "previous byte" at position 0.
    #[inline]
    pub fn get_byte(&self, distance: u32) -> u8 {
        let back = distance as usize + 1;
        let idx = if back <= self.pos {
            self.pos - back
        } else {
            self.buf.len() - (back - self.pos)
        };
        self.buf[idx]
    }

    /// Copy one byte from `distance + 1` back to the cursor and return it.
    ///
    /// Called once per output byte, so a copy may read what it just wrote.
    #[inline]
    pub fn copy_byte(&mut self, distance: u32) -> u8 {
        let byte = self.get_byte(distance);
        self.put_byte(byte);
        byte
    }

    /// Get the most recent `len` bytes from the window.
    #[cfg(test)]
    pub fn get_recent(&self, len: usize) -> Vec<u8> {
        let len = len.min(self.total_written as usize).min(self.buf.len());
        (0..len).rev().map(|d| self.get_byte(d as u32)).collect()
    }
}
