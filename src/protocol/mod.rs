//! Bit-level wire protocol spoken with the match server.
//!
//! Every frame carries exactly one packet: a 3-bit type tag followed by a
//! fixed payload, written most-significant bit first and zero-padded to a
//! whole byte.

mod bits;
mod error;
mod packet;

pub use bits::{BitReader, BitWriter};
pub use error::CodecError;
pub use packet::{ClientPacket, ClientPacketType, GameInfo, ServerPacket, ServerPacketType, TAG_BITS};
