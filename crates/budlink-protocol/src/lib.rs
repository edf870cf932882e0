//! Earbud Case Serial Protocol
//!
//! This crate provides types and utilities for talking to a wireless earbud
//! charging case over its RFCOMM serial channel. The case speaks a framed
//! binary protocol: every message travels between a start and an end marker,
//! carries its length in a 2-byte header, and ends its payload with a
//! CRC-16 trailer. The first payload byte is the message-type id.
//!
//! # Protocol Overview
//!
//! Traffic in both directions uses the same frame layout. Decoding feeds
//! received bytes into a [`Session`], which delimits frames, verifies
//! checksums, and merges decoded fields into an accumulating
//! [`DeviceStatus`]. Encoding resolves a symbolic message name through the
//! [`Registry`] and wraps the payload into a frame.
//!
//! Status payloads are versioned in-band: a revision byte at the front of
//! the data decides which trailing fields the firmware included. Decoders
//! here follow the revision, so newer firmware simply yields more fields.
//!
//! # Example
//!
//! ```rust,ignore
//! use budlink_protocol::{Command, Registry, Session};
//!
//! let registry = Registry::new();
//! let request = Command::ManagerInfo.encode(&registry)?;
//! // write `request` to the transport, then read back...
//!
//! let mut session = Session::new(registry);
//! session.feed(&received);
//! println!("battery: {:?}", session.status().get("battery_left"));
//! ```

pub mod checksum;

mod commands;
mod constants;
mod decode;
mod error;
mod frame;
mod registry;
mod session;

pub use commands::*;
pub use constants::*;
pub use decode::*;
pub use error::*;
pub use frame::*;
pub use registry::*;
pub use session::*;
