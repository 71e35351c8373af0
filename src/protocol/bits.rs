//! MSB-first bit writer and reader.

use super::CodecError;
use tictactoe_board::InvalidArgument;
use tracing::instrument;

/// Accumulates booleans and fixed-width integers into bytes, MSB first.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    /// Completed bytes.
    bytes: Vec<u8>,
    /// Byte being filled.
    current: u8,
    /// Bits written into `current`, always below 8.
    used: u8,
}

impl BitWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one bit (`true` is 1).
    pub fn add_bool(&mut self, bit: bool) -> &mut Self {
        if bit {
            self.current |= 1 << (7 - self.used);
        }
        self.used += 1;
        if self.used == 8 {
            self.bytes.push(self.current);
            self.current = 0;
            self.used = 0;
        }
        self
    }

    /// Appends the low `width` bits of `value`, most significant first.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidArgument`] if `value` needs more than
    /// `width` bits.
    #[instrument(skip(self))]
    pub fn add_int(&mut self, value: u32, width: u32) -> Result<&mut Self, CodecError> {
        if value.checked_shr(width).unwrap_or(0) != 0 {
            return Err(InvalidArgument::new(format!(
                "Value {} does not fit into {} bits",
                value, width
            ))
            .into());
        }
        for i in (0..width).rev() {
            let bit = value.checked_shr(i).unwrap_or(0) & 1;
            self.add_bool(bit == 1);
        }
        Ok(self)
    }

    /// Returns the bytes written so far.
    ///
    /// A partially filled last byte is included with its unwritten low
    /// bits set to zero.
    pub fn bytes(&self) -> Vec<u8> {
        let mut bytes = self.bytes.clone();
        if self.used > 0 {
            bytes.push(self.current);
        }
        bytes
    }

    /// Consumes the writer, returning its bytes like [`BitWriter::bytes`].
    pub fn into_bytes(mut self) -> Vec<u8> {
        if self.used > 0 {
            self.bytes.push(self.current);
        }
        self.bytes
    }
}

/// Reads booleans and fixed-width integers from bytes, MSB first.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Index of the byte being read.
    byte: usize,
    /// Bits already consumed from that byte, always below 8.
    bit: u8,
}

impl<'a> BitReader<'a> {
    /// Creates a reader over one frame.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte: 0,
            bit: 0,
        }
    }

    /// Reads the next bit.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidPacket`] once the data is exhausted.
    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        let byte = self
            .data
            .get(self.byte)
            .ok_or_else(|| CodecError::invalid_packet("Packet too short"))?;
        let bit = (byte >> (7 - self.bit)) & 1;
        if self.bit == 7 {
            self.byte += 1;
            self.bit = 0;
        } else {
            self.bit += 1;
        }
        Ok(bit == 1)
    }

    /// Reads `width` bits as an unsigned integer, most significant first.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidArgument`] if `width` is zero or wider
    /// than 32 bits, and [`CodecError::InvalidPacket`] if the data runs out.
    #[instrument(skip(self))]
    pub fn read_int(&mut self, width: u32) -> Result<u32, CodecError> {
        if width < 1 || width > u32::BITS {
            return Err(InvalidArgument::new(format!("Cannot read an integer of {} bits", width)).into());
        }
        let mut value = 0u32;
        for _ in 0..width {
            value = (value << 1) | u32::from(self.read_bool()?);
        }
        Ok(value)
    }

    /// Checks that only zero padding remains.
    ///
    /// The rest of a partially consumed byte must be zero and no whole byte
    /// may be left unread.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidPacket`] on any trailing data.
    pub fn finish(self) -> Result<(), CodecError> {
        let remaining = self.data.len() - self.byte;
        if remaining == 0 {
            return Ok(());
        }
        let padding = self.data[self.byte] << self.bit;
        if remaining == 1 && self.bit > 0 && padding == 0 {
            return Ok(());
        }
        Err(CodecError::invalid_packet("Packet contains too much information"))
    }
}
