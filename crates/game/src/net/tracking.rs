use super::protocol::{CLIENT_SEQUENCE_BITS, SERVER_SEQUENCE_BITS};

pub const DEFAULT_DROP_TOLERANCE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    #[error("stale sequence {sequence}, expected {expected}")]
    Stale { sequence: u32, expected: u32 },
    #[error("sequence {sequence} too far ahead of {expected}")]
    TooFarAhead { sequence: u32, expected: u32 },
}

/// Forward-only acceptance window over a wrapping sequence space.
/// Gaps inside the window are presumed lost and never requested again.
#[derive(Debug, Clone)]
pub struct SequenceWindow {
    expected: u32,
    tolerance: u32,
    mask: u32,
}

impl SequenceWindow {
    pub fn new(bits: u32, tolerance: u32) -> Self {
        Self {
            expected: 0,
            tolerance,
            mask: mask(bits),
        }
    }

    /// Window over inbound server sequences.
    pub fn server(tolerance: u32) -> Self {
        Self::new(SERVER_SEQUENCE_BITS, tolerance)
    }

    pub fn expected(&self) -> u32 {
        self.expected
    }

    /// Restarts the window so `sequence` is the last one accepted.
    pub fn sync(&mut self, sequence: u32) {
        self.expected = sequence.wrapping_add(1) & self.mask;
    }

    pub fn reset(&mut self) {
        self.expected = 0;
    }

    pub fn accept(&mut self, sequence: u32) -> Result<(), SequenceError> {
        let sequence = sequence & self.mask;
        let diff = sequence.wrapping_sub(self.expected) & self.mask;

        if diff < self.tolerance {
            self.sync(sequence);
            return Ok(());
        }

        let expected = self.expected;
        if diff > self.mask / 2 {
            Err(SequenceError::Stale { sequence, expected })
        } else {
            Err(SequenceError::TooFarAhead { sequence, expected })
        }
    }
}

/// Outbound sequence numbers, wrapping at the wire width.
#[derive(Debug, Clone)]
pub struct SequenceCounter {
    next: u32,
    mask: u32,
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new(CLIENT_SEQUENCE_BITS)
    }
}

impl SequenceCounter {
    pub fn new(bits: u32) -> Self {
        Self {
            next: 0,
            mask: mask(bits),
        }
    }

    pub fn peek(&self) -> u32 {
        self.next
    }

    pub fn next(&mut self) -> u32 {
        let sequence = self.next;
        self.next = self.next.wrapping_add(1) & self.mask;
        sequence
    }
}

fn mask(bits: u32) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1 << bits) - 1
    }
}
