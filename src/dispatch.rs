//! End-to-end wiring: byte-stream source → frame glue → SLIP → IPv4 parse
//! → ICMP parse → optional reply construction → SLIP transmit → byte sink.
//!
//! The original specification this crate distills from explicitly leaves
//! this wiring unspecified ("no dispatcher linking received frames to
//! IPv4→ICMP→reply... leave this as an explicit integration point, not a
//! core component"). [`Stack`] is that integration point, grounded in
//! `examples/original_source/src/main.cpp`'s read loop and in
//! `kernel::net::ipv4::handle_ipv4` / `icmp::handle_icmp`'s dispatch chain.
//! It adds no new wire-format logic of its own.

use crate::buffer::Buffer;
use crate::config::NetConfig;
use crate::glue::Glue;
use crate::{icmp, ipv4, slip};

fn slip_framer(span: &[u8], on_byte: &mut dyn FnMut(u8), on_end: &mut dyn FnMut()) -> usize {
    slip::decode(span, on_byte, on_end)
}

/// Owns the frame-reassembly state and local configuration for one serial
/// link, and drives the full receive → parse → reply → transmit pipeline.
pub struct Stack {
    glue: Glue,
    config: NetConfig,
}

impl Stack {
    pub fn new(config: NetConfig) -> Self {
        Stack { glue: Glue::new(), config }
    }

    /// The unused tail of the glue's scratch buffer; read new stream bytes
    /// into this span before calling [`Stack::receive`].
    pub fn write_span(&mut self) -> &mut [u8] {
        self.glue.write_span()
    }

    /// Processes `n` newly-read bytes, replying through `sink` to any Echo
    /// Request addressed to us. Never surfaces an error to the caller: every
    /// §7 outcome below the SLIP layer is a drop, logged and discarded, per
    /// SPEC_FULL.md §7.
    pub fn receive(&mut self, n: usize, mut sink: impl FnMut(u8)) {
        let config = self.config;
        self.glue.handle(n, slip_framer, |frame| {
            let Some(buffer) = frame else {
                return;
            };
            Self::handle_frame(&config, &buffer, &mut sink);
        });
    }

    fn handle_frame(config: &NetConfig, buffer: &Buffer, sink: &mut impl FnMut(u8)) {
        let ip_header = match ipv4::parse_header(buffer) {
            Ok(header) => header,
            Err(e) => {
                log::debug!("dispatch: dropping frame, IPv4 parse failed: {}", e);
                return;
            }
        };

        if !config.accepts(ip_header.dest_addr) {
            log::debug!(
                "dispatch: dropping frame not addressed to us (dest=0x{:08x})",
                ip_header.dest_addr
            );
            return;
        }

        let icmp_header = match icmp::parse(&ip_header, buffer) {
            Ok(header) => header,
            Err(e) => {
                log::debug!("dispatch: dropping frame, ICMP parse failed: {}", e);
                return;
            }
        };

        let Some(icmp_reply) = icmp::process(&ip_header, &icmp_header, buffer) else {
            return;
        };

        log::info!(
            "dispatch: replying to echo request from 0x{:08x}",
            ip_header.source_addr
        );

        let reply_len = icmp_reply.len();
        let reply_header = ipv4::Header {
            tos: 0,
            total_length: ipv4::MIN_HEADER_SIZE + reply_len as u16,
            id: ip_header.id,
            flags: 0,
            frag: 0,
            ttl: 64,
            protocol: ipv4::PROTOCOL_ICMP,
            checksum: 0,
            source_addr: ip_header.dest_addr,
            dest_addr: ip_header.source_addr,
            header_size: ipv4::MIN_HEADER_SIZE,
        };

        let mut out = Buffer::new();
        ipv4::construct_header(&reply_header, &mut out);
        out.extend_with(icmp_reply);

        slip::transmit(&out, sink);
    }
}
