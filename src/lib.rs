//! Chained-buffer SLIP framing and IPv4/ICMP wire codecs.
//!
//! Built for hobby-OS and embedded network stacks that own their own byte
//! stream (a UART, a pty, a socket read loop) and need SLIP framing plus
//! enough of IPv4/ICMP to answer a ping, without pulling in a full routing
//! or transport-layer stack.
//!
//! [`buffer`] is the shared currency between layers: a chain of fixed-size
//! segments that [`glue`] fills frame-by-frame from SLIP-decoded bytes, and
//! that [`ipv4`]/[`icmp`] parse and construct against. [`dispatch`] wires
//! all of the above into one `receive` call for callers who just want Echo
//! Request in, Echo Reply out.

#![no_std]

extern crate alloc;

pub use buffer::Buffer;
pub use config::NetConfig;
pub use dispatch::Stack;

pub mod buffer;
pub mod config;
pub mod dispatch;
pub mod glue;
pub mod hexdump;
pub mod icmp;
pub mod ipv4;
pub mod netorder;
pub mod slip;
