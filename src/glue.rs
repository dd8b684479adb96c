//! Frame glue: bridges a stream-oriented byte source into completed
//! [`Buffer`]s by driving a pluggable frame decoder.
//!
//! The framer is a stateless callback function over a span; the only
//! persistent state across calls is the up-to-one-byte escape tail, held
//! here in `scratch`/`carry`. This lets the same glue be reused for any
//! byte-stuffed framing (SLIP today; HDLC or COBS could plug in later)
//! without the glue knowing the framer's internals.

use crate::buffer::{Buffer, SEGMENT_SIZE};
use core::cell::RefCell;

/// Stream-to-frame adapter holding a rolling carry of undecoded bytes and
/// any in-progress chain.
pub struct Glue {
    scratch: [u8; SEGMENT_SIZE],
    carry: usize,
    current: Option<Buffer>,
}

impl Glue {
    pub fn new() -> Self {
        Glue {
            scratch: [0u8; SEGMENT_SIZE],
            carry: 0,
            current: None,
        }
    }

    /// The unused tail of the scratch buffer, `[carry, SEGMENT_SIZE)`. The
    /// caller reads new bytes from the stream source into this span.
    pub fn write_span(&mut self) -> &mut [u8] {
        &mut self.scratch[self.carry..]
    }

    /// Processes `n` newly-appended bytes (via `write_span`) with `framer`,
    /// delivering each completed frame to `on_frame`.
    ///
    /// `framer` is called once as `framer(span, on_byte, on_end)` and must
    /// return the offset of its unconsumed prefix, exactly like
    /// [`crate::slip::decode`]. After it returns, any unconsumed tail is
    /// shifted to the front of `scratch` so it survives to the next call.
    pub fn handle(
        &mut self,
        n: usize,
        framer: impl FnOnce(&[u8], &mut dyn FnMut(u8), &mut dyn FnMut()) -> usize,
        mut on_frame: impl FnMut(Option<Buffer>),
    ) {
        let span_len = self.carry + n;
        let current = RefCell::new(self.current.take());

        let consumed = {
            let span = &self.scratch[..span_len];

            let mut on_byte = |b: u8| {
                let mut current = current.borrow_mut();
                let buffer = current.get_or_insert_with(Buffer::new);
                buffer.write_span()[0] = b;
                buffer.advance_filled(1);
            };
            let mut on_end = || {
                on_frame(current.borrow_mut().take());
            };

            framer(span, &mut on_byte, &mut on_end)
        };
        self.current = current.into_inner();

        self.scratch.copy_within(consumed..span_len, 0);
        self.carry = span_len - consumed;
    }
}

impl Default for Glue {
    fn default() -> Self {
        Glue::new()
    }
}
