//! Debug formatting of byte spans into offset/hex/ascii lines.

const BYTES_PER_LINE: usize = 16;

/// Emits 16 bytes per line: two lowercase hex digits per byte followed by a
/// space, with printable ASCII mirrored in a parallel text column
/// (non-printables shown as `.`). The last partial line is truncated to
/// `k` chars with `k*3 - 1` hex chars. An empty input produces zero
/// callbacks.
pub fn dump(span: &[u8], mut callback: impl FnMut(usize, &str, &str)) {
    let mut hex_buf = [0u8; BYTES_PER_LINE * 3];
    let mut text_buf = [0u8; BYTES_PER_LINE];

    let mut offset = 0;
    while offset < span.len() {
        let chunk = &span[offset..(offset + BYTES_PER_LINE).min(span.len())];
        let k = chunk.len();

        for (i, &byte) in chunk.iter().enumerate() {
            hex_buf[i * 3] = HEX_DIGITS[(byte >> 4) as usize];
            hex_buf[i * 3 + 1] = HEX_DIGITS[(byte & 0xf) as usize];
            hex_buf[i * 3 + 2] = b' ';
            text_buf[i] = if is_printable(byte) { byte } else { b'.' };
        }

        let hex_len = k * 3 - 1;
        let hex_str = core::str::from_utf8(&hex_buf[..hex_len]).unwrap();
        let text_str = core::str::from_utf8(&text_buf[..k]).unwrap();
        callback(offset, hex_str, text_str);

        offset += k;
    }
}

const HEX_DIGITS: [u8; 16] = *b"0123456789abcdef";

fn is_printable(b: u8) -> bool {
    (0x20..=0x7e).contains(&b)
}
