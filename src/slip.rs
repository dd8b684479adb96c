//! SLIP (RFC 1055) framing: byte-stuffing transmit and stream-safe decode.

use crate::buffer::Buffer;

/// Frame delimiter.
pub const END: u8 = 0xc0;
/// Escape byte.
pub const ESC: u8 = 0xdb;
/// Escaped form of [`END`].
pub const ESC_END: u8 = 0xdc;
/// Escaped form of [`ESC`].
pub const ESC_ESC: u8 = 0xdd;

/// Emits one complete SLIP frame for `buffer`'s logical bytes: a bounding
/// `END`, each byte byte-stuffed, and a closing `END`.
pub fn transmit(buffer: &Buffer, mut sink: impl FnMut(u8)) {
    sink(END);
    for byte in buffer.bytes() {
        match byte {
            END => {
                sink(ESC);
                sink(ESC_END);
            }
            ESC => {
                sink(ESC);
                sink(ESC_ESC);
            }
            b => sink(b),
        }
    }
    sink(END);
}

/// Scans `span` left-to-right, invoking `on_byte` for each decoded byte and
/// `on_end` for each `END` delimiter, and returns the index of the first
/// byte **not** consumed (so the caller may retain a partial-escape tail).
///
/// A trailing `ESC` with no following byte in `span` is left un-consumed:
/// the returned offset points at that `ESC`, and no callback fires for it.
pub fn decode(span: &[u8], mut on_byte: impl FnMut(u8), mut on_end: impl FnMut()) -> usize {
    let mut i = 0;
    while i < span.len() {
        match span[i] {
            END => {
                on_end();
                i += 1;
            }
            ESC => {
                if i + 1 >= span.len() {
                    return i;
                }
                let mapped = match span[i + 1] {
                    ESC_END => END,
                    ESC_ESC => ESC,
                    other => other,
                };
                on_byte(mapped);
                i += 2;
            }
            b => {
                on_byte(b);
                i += 1;
            }
        }
    }
    i
}
