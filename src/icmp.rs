//! ICMP header parsing and Echo Reply construction (RFC 792).
//!
//! Echo/Echo Reply are minimally modeled; other ICMP types parse their
//! 2-byte `type, code` head and checksum-verify but are not interpreted
//! further.

use crate::buffer::Buffer;
use crate::ipv4;
use crate::netorder::Consumer;
use core::fmt;

/// ICMP header size (type + code + checksum + rest-of-header word), the
/// fixed layout [`create_echo_reply`] writes for an Echo Reply.
pub const HEADER_SIZE: usize = 8;

/// Minimum bytes past the IPv4 header for [`parse`] to read a type, code,
/// and checksum: other ICMP types may carry no rest-of-header word at all.
pub const MIN_PARSE_SIZE: usize = 4;

/// ICMP type: Echo Reply.
pub const ECHO_REPLY: u8 = 0;
/// ICMP type: Echo Request.
pub const ECHO_REQUEST: u8 = 8;

/// A parsed ICMP header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub icmp_type: u8,
    pub code: u8,
}

/// Reasons [`parse`] can fail to produce a [`Header`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcmpError {
    /// Fewer than [`MIN_PARSE_SIZE`] bytes remain past the IPv4 header.
    NotEnoughData,
    /// Internet checksum over the ICMP payload was nonzero.
    ChecksumError,
}

impl fmt::Display for IcmpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IcmpError::NotEnoughData => write!(f, "not enough data for ICMP header"),
            IcmpError::ChecksumError => write!(f, "ICMP checksum mismatch"),
        }
    }
}

/// Parses the ICMP header following `ip_header` in `buffer`, verifying the
/// Internet checksum over the whole ICMP segment (header + payload).
pub fn parse(ip_header: &ipv4::Header, buffer: &Buffer) -> Result<Header, IcmpError> {
    let total = buffer.len();
    let icmp_offset = ip_header.header_size as usize;
    if total < icmp_offset + MIN_PARSE_SIZE {
        return Err(IcmpError::NotEnoughData);
    }

    let mut consumer = Consumer::new(buffer.bytes().skip(icmp_offset));
    let icmp_type = consumer.consume_u8();
    let code = consumer.consume_u8();

    let icmp_len = ip_header.total_length as usize - ip_header.header_size as usize;
    let checksum = ipv4::internet_checksum(buffer.bytes().skip(icmp_offset).take(icmp_len));
    if checksum != 0 {
        return Err(IcmpError::ChecksumError);
    }

    Ok(Header { icmp_type, code })
}

/// Builds an ICMP Echo Reply from an Echo Request's `ip_header`/`buffer`,
/// copying the request's payload verbatim and recomputing the outgoing
/// checksum (the builder is the only place that knows the full ICMP
/// payload length, per SPEC_FULL.md §4.6 / §9).
pub fn create_echo_reply(ip_header: &ipv4::Header, buffer: &Buffer) -> Buffer {
    // Identifier + sequence (the 4 bytes following type/code/checksum),
    // copied verbatim from the request.
    let header_tail_offset = ip_header.header_size as usize + 4;
    let data_offset = ip_header.header_size as usize + HEADER_SIZE;
    let data_length = ip_header.total_length as usize - data_offset;

    let mut response = Buffer::new();
    {
        // HEADER_SIZE (8) is far smaller than one segment, so this always
        // lands entirely in the freshly-allocated head segment.
        let span = &mut response.write_span()[..HEADER_SIZE];
        span[0] = ECHO_REPLY;
        span[1] = 0; // code
        span[2] = 0; // checksum placeholder, patched below
        span[3] = 0;
        for (i, b) in buffer.bytes().skip(header_tail_offset).take(4).enumerate() {
            span[4 + i] = b;
        }
    }
    response.advance_filled(HEADER_SIZE);

    for b in buffer.bytes().skip(data_offset).take(data_length) {
        response.write_span()[0] = b;
        response.advance_filled(1);
    }

    let checksum = ipv4::internet_checksum(response.bytes());
    response.head_mut().patch_checksum_field(2, checksum);
    response
}

/// Dispatches an incoming ICMP packet: returns `Some` reply buffer for Echo
/// Requests, `None` otherwise.
pub fn process(ip_header: &ipv4::Header, icmp_header: &Header, buffer: &Buffer) -> Option<Buffer> {
    if icmp_header.icmp_type == ECHO_REQUEST {
        Some(create_echo_reply(ip_header, buffer))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ICMP_ECHO_REQUEST: [u8; 84] = [
        0x45, 0x00, 0x00, 0x54, 0xf8, 0xbe, 0x40, 0x00, 0x40, 0x01, 0x87, 0xa8, 0xac, 0x1f, 0x31, 0x01,
        0xac, 0x1f, 0x31, 0x02, 0x08, 0x00, 0x21, 0xa3, 0xe0, 0xec, 0x00, 0x01, 0xe0, 0x8a, 0xc7, 0x5e,
        0x00, 0x00, 0x00, 0x00, 0x8e, 0xb2, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x11, 0x12, 0x13,
        0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f, 0x20, 0x21, 0x22, 0x23,
        0x24, 0x25, 0x26, 0x27, 0x28, 0x29, 0x2a, 0x2b, 0x2c, 0x2d, 0x2e, 0x2f, 0x30, 0x31, 0x32, 0x33,
        0x34, 0x35, 0x36, 0x37,
    ];

    fn buffer_from(data: &[u8]) -> Buffer {
        let mut buffer = Buffer::new();
        buffer.write_span()[..data.len()].copy_from_slice(data);
        buffer.advance_filled(data.len());
        buffer
    }

    #[test]
    fn parses_a_header_with_no_rest_of_header_word() {
        // Type + code + checksum only (4 bytes), no identifier/sequence:
        // a minimal but valid non-echo ICMP segment per RFC 792.
        let mut data: alloc::vec::Vec<u8> = ICMP_ECHO_REQUEST[..20].to_vec();
        data[2..4].copy_from_slice(&24u16.to_be_bytes()); // total_length
        data[10..12].copy_from_slice(&[0, 0]);
        let ip_checksum = ipv4::internet_checksum(data[..20].iter().copied());
        data[10..12].copy_from_slice(&ip_checksum.to_be_bytes());

        data.extend_from_slice(&[3, 0, 0, 0]); // type=3 (unreachable), code=0
        let icmp_checksum = ipv4::internet_checksum(data[20..24].iter().copied());
        data[22..24].copy_from_slice(&icmp_checksum.to_be_bytes());

        let buffer = buffer_from(&data);
        let ip_header = ipv4::parse_header(&buffer).unwrap();
        let icmp_header = parse(&ip_header, &buffer).unwrap();
        assert_eq!(icmp_header.icmp_type, 3);
        assert_eq!(icmp_header.code, 0);
    }

    #[test]
    fn fewer_than_four_bytes_past_ip_header_is_rejected() {
        let mut data: alloc::vec::Vec<u8> = ICMP_ECHO_REQUEST[..20].to_vec();
        data[2..4].copy_from_slice(&23u16.to_be_bytes());
        data[10..12].copy_from_slice(&[0, 0]);
        let ip_checksum = ipv4::internet_checksum(data[..20].iter().copied());
        data[10..12].copy_from_slice(&ip_checksum.to_be_bytes());
        data.extend_from_slice(&[3, 0, 0]); // only 3 bytes past the IP header

        let buffer = buffer_from(&data);
        let ip_header = ipv4::parse_header(&buffer).unwrap();
        assert_eq!(parse(&ip_header, &buffer), Err(IcmpError::NotEnoughData));
    }

    #[test]
    fn parses_echo_request() {
        let buffer = buffer_from(&ICMP_ECHO_REQUEST);
        let ip_header = ipv4::parse_header(&buffer).unwrap();
        let icmp_header = parse(&ip_header, &buffer).unwrap();
        assert_eq!(icmp_header.icmp_type, ECHO_REQUEST);
        assert_eq!(icmp_header.code, 0);
    }

    #[test]
    fn process_replies_to_echo_request() {
        let buffer = buffer_from(&ICMP_ECHO_REQUEST);
        let ip_header = ipv4::parse_header(&buffer).unwrap();
        let icmp_header = parse(&ip_header, &buffer).unwrap();
        let reply = process(&ip_header, &icmp_header, &buffer);
        assert!(reply.is_some());
    }

    #[test]
    fn process_ignores_non_echo_request() {
        let mut data = ICMP_ECHO_REQUEST;
        data[20] = ECHO_REPLY;
        // Recompute IP + ICMP checksums to keep the fixture valid.
        data[10] = 0;
        data[11] = 0;
        let ip_checksum = ipv4::internet_checksum(data[..20].iter().copied());
        data[10..12].copy_from_slice(&ip_checksum.to_be_bytes());
        data[22] = 0;
        data[23] = 0;
        let icmp_checksum = ipv4::internet_checksum(data[20..84].iter().copied());
        data[22..24].copy_from_slice(&icmp_checksum.to_be_bytes());

        let buffer = buffer_from(&data);
        let ip_header = ipv4::parse_header(&buffer).unwrap();
        let icmp_header = parse(&ip_header, &buffer).unwrap();
        assert!(process(&ip_header, &icmp_header, &buffer).is_none());
    }

    #[test]
    fn echo_reply_has_valid_checksum_and_matching_payload() {
        let buffer = buffer_from(&ICMP_ECHO_REQUEST);
        let ip_header = ipv4::parse_header(&buffer).unwrap();
        let reply = create_echo_reply(&ip_header, &buffer);

        let reply_bytes: alloc::vec::Vec<u8> = reply.bytes().collect();
        assert_eq!(reply_bytes[0], ECHO_REPLY);
        assert_eq!(reply_bytes[1], 0);
        assert_eq!(ipv4::internet_checksum(reply.bytes()), 0);

        let request_payload = &ICMP_ECHO_REQUEST[28..];
        assert_eq!(&reply_bytes[8..], request_payload);
        assert_eq!(&reply_bytes[4..8], &ICMP_ECHO_REQUEST[24..28]);
    }
}
