//! IPv4 header parsing and construction (RFC 791).
//!
//! Version 4 only. Options are accepted and checksum-verified on parse, but
//! never emitted by [`construct_header`]. Fragmentation is not supported:
//! a nonzero MF flag or fragment offset is rejected.

use crate::buffer::Buffer;
use crate::netorder::{Consumer, Producer};
use core::fmt;

/// Minimum (no-options) IPv4 header size in bytes.
pub const MIN_HEADER_SIZE: u16 = 20;

/// IPv4 protocol number for ICMP.
pub const PROTOCOL_ICMP: u8 = 1;
/// IPv4 protocol number for TCP.
#[allow(dead_code)]
pub const PROTOCOL_TCP: u8 = 6;
/// IPv4 protocol number for UDP.
#[allow(dead_code)]
pub const PROTOCOL_UDP: u8 = 17;

const FLAG_RESERVED: u16 = 1 << 15;
const FLAG_MF: u16 = 1 << 13;
const FRAGMENT_OFFSET_MASK: u16 = 0x1fff;

/// A parsed IPv4 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub tos: u8,
    pub total_length: u16,
    pub id: u16,
    pub flags: u16,
    pub frag: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: u16,
    pub source_addr: u32,
    pub dest_addr: u32,
    /// `20 + 4 * options_words`, derived from the wire IHL field.
    pub header_size: u16,
}

/// Reasons [`parse_header`] can fail to produce a [`Header`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ipv4Error {
    /// Buffer shorter than declared or required.
    NotEnoughData,
    /// Correctly formed but not handled (non-IPv4, fragmentation, MF set).
    Unsupported,
    /// Reserved bit set or other protocol-level invalid field.
    CorruptHeader,
    /// Internet checksum over the header was nonzero.
    ChecksumError,
}

impl fmt::Display for Ipv4Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ipv4Error::NotEnoughData => write!(f, "not enough data for IPv4 header"),
            Ipv4Error::Unsupported => write!(f, "unsupported IPv4 header (version, MF, or fragment offset)"),
            Ipv4Error::CorruptHeader => write!(f, "reserved flag bit set"),
            Ipv4Error::ChecksumError => write!(f, "IPv4 header checksum mismatch"),
        }
    }
}

/// RFC 1071 Internet checksum over a byte iterator of the given length.
///
/// Sums 16-bit big-endian words into a `u32`, folds carries back, and takes
/// the one's complement. An odd byte count pads the final byte as the high
/// byte of a final word with a zero low byte.
pub fn internet_checksum(mut bytes: impl Iterator<Item = u8>) -> u16 {
    let mut sum: u32 = 0;
    loop {
        let Some(hi) = bytes.next() else { break };
        let lo = bytes.next().unwrap_or(0);
        sum += u16::from_be_bytes([hi, lo]) as u32;
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xffff) + (sum >> 16);
    }
    !(sum as u16)
}

/// Parses an IPv4 header from `buffer`'s readable bytes, verifying the
/// Internet checksum. See SPEC_FULL.md §4.5 for the exact step ordering.
pub fn parse_header(buffer: &Buffer) -> Result<Header, Ipv4Error> {
    let total_readable = buffer.len();
    if total_readable < MIN_HEADER_SIZE as usize {
        return Err(Ipv4Error::NotEnoughData);
    }

    let mut consumer = Consumer::new(buffer.bytes());
    let version_ihl = consumer.consume_u8();
    if version_ihl >> 4 != 4 {
        return Err(Ipv4Error::Unsupported);
    }
    let header_size = ((version_ihl & 0xf) as u16) * 4;
    if total_readable < header_size as usize {
        return Err(Ipv4Error::NotEnoughData);
    }

    let tos = consumer.consume_u8();
    let total_length = consumer.consume_u16();
    let id = consumer.consume_u16();
    let flags_frag = consumer.consume_u16();
    let ttl = consumer.consume_u8();
    let protocol = consumer.consume_u8();
    let checksum = consumer.consume_u16();
    let source_addr = consumer.consume_u32();
    let dest_addr = consumer.consume_u32();

    if flags_frag & FLAG_RESERVED != 0 {
        return Err(Ipv4Error::CorruptHeader);
    }
    if flags_frag & FLAG_MF != 0 {
        return Err(Ipv4Error::Unsupported);
    }
    let frag = flags_frag & FRAGMENT_OFFSET_MASK;
    if frag != 0 {
        return Err(Ipv4Error::Unsupported);
    }

    if internet_checksum(buffer.bytes().take(header_size as usize)) != 0 {
        return Err(Ipv4Error::ChecksumError);
    }

    Ok(Header {
        tos,
        total_length,
        id,
        flags: flags_frag,
        frag,
        ttl,
        protocol,
        checksum,
        source_addr,
        dest_addr,
        header_size,
    })
}

/// Writes a canonical 20-byte IPv4 header (no options) at `buffer`'s current
/// write tail and advances its filled count by 20.
///
/// The version/IHL byte is `0x40 | ((header_size / 4) & 0xf)` — the source
/// this stack is distilled from computed this as `0x40 + (header_size/4) &
/// 0xf`, which due to operator precedence is actually `0x40 + ((header_size
/// / 4) & 0xf)`; the corrected, intended mask is implemented here.
///
/// Requires the tail segment to have at least 20 contiguous bytes of
/// writable space (true for any freshly-constructed [`Buffer`], which is
/// how this stack always calls it).
pub fn construct_header(header: &Header, buffer: &mut Buffer) {
    let ihl = (header.header_size / 4) as u8;
    let version_ihl = 0x40 | (ihl & 0xf);

    let mut header_bytes = [0u8; MIN_HEADER_SIZE as usize];
    let mut i = 0;
    {
        let mut producer = Producer::new(|b| {
            header_bytes[i] = b;
            i += 1;
        });
        producer.produce_u8(version_ihl);
        producer.produce_u8(header.tos);
        producer.produce_u16(header.total_length);
        producer.produce_u16(header.id);
        producer.produce_u16(header.flags | header.frag);
        producer.produce_u8(header.ttl);
        producer.produce_u8(header.protocol);
        producer.produce_u16(0); // checksum placeholder
        producer.produce_u32(header.source_addr);
        producer.produce_u32(header.dest_addr);
    }

    let checksum = internet_checksum(header_bytes.iter().copied());
    header_bytes[10..12].copy_from_slice(&checksum.to_be_bytes());

    buffer.write_span()[..MIN_HEADER_SIZE as usize].copy_from_slice(&header_bytes);
    buffer.advance_filled(MIN_HEADER_SIZE as usize);
}
