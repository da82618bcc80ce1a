//! Bounded line accumulation
//!
//! Bytes are collected until a `\n` terminator. Carriage returns are
//! dropped. Once a line exceeds the buffer capacity the remaining bytes of
//! that line are discarded; the kept prefix is still handed out once at the
//! terminator, so an over-length line yields at most one record.

use heapless::Vec;

/// Line terminator
pub const LINE_TERMINATOR: u8 = b'\n';

/// Byte accumulator for one line of at most `N` bytes
#[derive(Debug, Clone)]
pub struct LineBuffer<const N: usize> {
    buffer: Vec<u8, N>,
    /// The current line exceeded `N` bytes
    overflowed: bool,
    /// The buffer holds a completed line that was handed out by `feed`
    complete: bool,
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineBuffer<N> {
    /// Create an empty line buffer
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            overflowed: false,
            complete: false,
        }
    }

    /// Discard any partial line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.overflowed = false;
        self.complete = false;
    }

    /// Feed a single byte
    ///
    /// Returns the completed line (without terminator) when `byte` ends a
    /// non-empty line, truncated to `N` bytes if it overflowed. Returns
    /// `None` otherwise.
    pub fn feed(&mut self, byte: u8) -> Option<&[u8]> {
        if self.complete {
            self.reset();
        }

        match byte {
            LINE_TERMINATOR => {
                if self.buffer.is_empty() {
                    self.reset();
                    return None;
                }
                self.overflowed = false;
                self.complete = true;
                Some(self.buffer.as_slice())
            }
            b'\r' => None,
            _ => {
                if !self.overflowed && self.buffer.push(byte).is_err() {
                    // Keep scanning for the terminator, drop everything else
                    self.overflowed = true;
                }
                None
            }
        }
    }

    /// Number of bytes held for the current line
    pub fn len(&self) -> usize {
        if self.complete {
            0
        } else {
            self.buffer.len()
        }
    }

    /// Check if no partial line is held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the current line has been truncated
    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }
}
