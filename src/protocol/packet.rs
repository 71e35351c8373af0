//! Packet types for both directions and their bit layouts.

use super::{BitReader, BitWriter, CodecError};
use tictactoe_board::{FieldCoordinate, GameCode, Symbol};
use tracing::{debug, instrument};

/// Width of the type tag that starts every packet.
pub const TAG_BITS: u32 = 3;

/// Width of one game code letter (`letter - 'A'`).
const LETTER_BITS: u32 = 5;

/// Width of a linear field index.
const FIELD_BITS: u32 = 4;

/// Tags of packets sent by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::FromRepr, strum::Display)]
#[repr(u8)]
pub enum ClientPacketType {
    /// Join the match with the given code.
    CodeSubmit = 0,
    /// Ask the server for a fresh [`GameInfo`].
    RequestCurrentStatus = 1,
    /// Place the local symbol.
    PlayerMakeMove = 2,
    /// Clear the board.
    BoardReset = 3,
    /// Swap symbols with the opponent.
    ToggleSymbol = 4,
}

impl ClientPacketType {
    /// Numeric tag on the wire.
    pub fn tag(self) -> u32 {
        u32::from(self as u8)
    }

    /// Looks up a tag; tags 5 to 7 are unused in this direction.
    pub fn from_tag(tag: u32) -> Option<Self> {
        u8::try_from(tag).ok().and_then(Self::from_repr)
    }
}

/// Tags of packets sent by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::FromRepr, strum::Display)]
#[repr(u8)]
pub enum ServerPacketType {
    /// A match code was assigned to this client.
    Welcome = 0,
    /// The server could not parse the last packet.
    PacketInvalid = 1,
    /// The opponent placed a symbol.
    OpponentMakeMove = 2,
    /// The opponent disconnected.
    OpponentLeave = 3,
    /// Full snapshot of the match.
    GameInfo = 4,
    /// The last action is not allowed right now.
    ActionInvalid = 5,
    /// No match exists for the submitted code.
    GameCodeInvalid = 6,
    /// The match already has two players.
    GameFull = 7,
}

impl ServerPacketType {
    /// Numeric tag on the wire.
    pub fn tag(self) -> u32 {
        u32::from(self as u8)
    }

    /// Looks up a tag.
    pub fn from_tag(tag: u32) -> Option<Self> {
        u8::try_from(tag).ok().and_then(Self::from_repr)
    }
}

/// A packet sent from the client to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientPacket {
    /// Join the match with this code.
    CodeSubmit(GameCode),
    /// Ask for a full snapshot.
    RequestCurrentStatus,
    /// Place the local symbol on a field.
    PlayerMakeMove(FieldCoordinate),
    /// Clear the board.
    BoardReset,
    /// Swap symbols with the opponent.
    ToggleSymbol,
}

impl ClientPacket {
    /// Returns the tag of this packet.
    pub fn packet_type(&self) -> ClientPacketType {
        match self {
            Self::CodeSubmit(_) => ClientPacketType::CodeSubmit,
            Self::RequestCurrentStatus => ClientPacketType::RequestCurrentStatus,
            Self::PlayerMakeMove(_) => ClientPacketType::PlayerMakeMove,
            Self::BoardReset => ClientPacketType::BoardReset,
            Self::ToggleSymbol => ClientPacketType::ToggleSymbol,
        }
    }

    /// Encodes this packet into one frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidArgument`] if a payload value does not
    /// fit its field.
    #[instrument]
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = BitWriter::new();
        writer.add_int(self.packet_type().tag(), TAG_BITS)?;
        match self {
            Self::CodeSubmit(code) => write_code(&mut writer, code)?,
            Self::PlayerMakeMove(coord) => write_field(&mut writer, *coord)?,
            Self::RequestCurrentStatus | Self::BoardReset | Self::ToggleSymbol => {}
        }
        Ok(writer.into_bytes())
    }

    /// Decodes one frame sent by a client.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidPacket`] for unknown tags, short frames,
    /// out-of-range values and trailing data.
    #[instrument]
    pub fn decode(frame: &[u8]) -> Result<Self, CodecError> {
        let mut reader = BitReader::new(frame);
        let tag = reader.read_int(TAG_BITS)?;
        let packet_type = ClientPacketType::from_tag(tag)
            .ok_or_else(|| CodecError::invalid_packet(format!("Unknown client packet type {}", tag)))?;
        let packet = match packet_type {
            ClientPacketType::CodeSubmit => Self::CodeSubmit(read_code(&mut reader)?),
            ClientPacketType::RequestCurrentStatus => Self::RequestCurrentStatus,
            ClientPacketType::PlayerMakeMove => Self::PlayerMakeMove(read_field(&mut reader)?),
            ClientPacketType::BoardReset => Self::BoardReset,
            ClientPacketType::ToggleSymbol => Self::ToggleSymbol,
        };
        reader.finish()?;
        Ok(packet)
    }
}

/// Full snapshot of a match as sent by the server.
///
/// The match code is not part of the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameInfo {
    /// The receiving player's symbol.
    pub symbol: Symbol,
    /// Whether the receiving player is on turn.
    pub on_turn: bool,
    /// Whether an opponent is connected.
    pub has_opponent: bool,
    /// Whether moves are permitted.
    pub game_active: bool,
    /// Cells in row-major order.
    pub cells: [Option<Symbol>; 9],
}

impl GameInfo {
    fn write(&self, writer: &mut BitWriter) {
        writer
            .add_bool(self.symbol.to_bit())
            .add_bool(self.on_turn)
            .add_bool(self.has_opponent)
            .add_bool(self.game_active);
        for cell in self.cells {
            match cell {
                Some(symbol) => writer.add_bool(true).add_bool(symbol.to_bit()),
                None => writer.add_bool(false),
            };
        }
    }

    fn read(reader: &mut BitReader<'_>) -> Result<Self, CodecError> {
        let symbol = Symbol::from_bit(reader.read_bool()?);
        let on_turn = reader.read_bool()?;
        let has_opponent = reader.read_bool()?;
        let game_active = reader.read_bool()?;
        let mut cells = [None; 9];
        for cell in &mut cells {
            if reader.read_bool()? {
                *cell = Some(Symbol::from_bit(reader.read_bool()?));
            }
        }
        Ok(Self {
            symbol,
            on_turn,
            has_opponent,
            game_active,
            cells,
        })
    }
}

/// A packet sent from the server to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerPacket {
    /// This client was assigned a match code.
    Welcome(GameCode),
    /// The server could not parse the last packet.
    PacketInvalid,
    /// The opponent placed a symbol on a field.
    OpponentMakeMove(FieldCoordinate),
    /// The opponent disconnected.
    OpponentLeave,
    /// Full snapshot of the match.
    GameInfo(GameInfo),
    /// The last action is not allowed right now.
    ActionInvalid,
    /// No match exists for the submitted code.
    GameCodeInvalid,
    /// The match already has two players.
    GameFull,
}

impl ServerPacket {
    /// Returns the tag of this packet.
    pub fn packet_type(&self) -> ServerPacketType {
        match self {
            Self::Welcome(_) => ServerPacketType::Welcome,
            Self::PacketInvalid => ServerPacketType::PacketInvalid,
            Self::OpponentMakeMove(_) => ServerPacketType::OpponentMakeMove,
            Self::OpponentLeave => ServerPacketType::OpponentLeave,
            Self::GameInfo(_) => ServerPacketType::GameInfo,
            Self::ActionInvalid => ServerPacketType::ActionInvalid,
            Self::GameCodeInvalid => ServerPacketType::GameCodeInvalid,
            Self::GameFull => ServerPacketType::GameFull,
        }
    }

    /// Encodes this packet into one frame.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidArgument`] if a payload value does not
    /// fit its field.
    #[instrument]
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = BitWriter::new();
        writer.add_int(self.packet_type().tag(), TAG_BITS)?;
        match self {
            Self::Welcome(code) => write_code(&mut writer, code)?,
            Self::OpponentMakeMove(coord) => write_field(&mut writer, *coord)?,
            Self::GameInfo(info) => info.write(&mut writer),
            Self::PacketInvalid
            | Self::OpponentLeave
            | Self::ActionInvalid
            | Self::GameCodeInvalid
            | Self::GameFull => {}
        }
        Ok(writer.into_bytes())
    }

    /// Decodes one frame sent by the server.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidPacket`] for short frames, out-of-range
    /// values and trailing data.
    #[instrument]
    pub fn decode(frame: &[u8]) -> Result<Self, CodecError> {
        let mut reader = BitReader::new(frame);
        let tag = reader.read_int(TAG_BITS)?;
        let packet_type = ServerPacketType::from_tag(tag)
            .ok_or_else(|| CodecError::invalid_packet(format!("Unknown server packet type {}", tag)))?;
        debug!(%packet_type, "Decoding server packet");
        let packet = match packet_type {
            ServerPacketType::Welcome => Self::Welcome(read_code(&mut reader)?),
            ServerPacketType::PacketInvalid => Self::PacketInvalid,
            ServerPacketType::OpponentMakeMove => Self::OpponentMakeMove(read_field(&mut reader)?),
            ServerPacketType::OpponentLeave => Self::OpponentLeave,
            ServerPacketType::GameInfo => Self::GameInfo(GameInfo::read(&mut reader)?),
            ServerPacketType::ActionInvalid => Self::ActionInvalid,
            ServerPacketType::GameCodeInvalid => Self::GameCodeInvalid,
            ServerPacketType::GameFull => Self::GameFull,
        };
        reader.finish()?;
        Ok(packet)
    }
}

fn write_code(writer: &mut BitWriter, code: &GameCode) -> Result<(), CodecError> {
    for index in code.indices() {
        writer.add_int(u32::from(index), LETTER_BITS)?;
    }
    Ok(())
}

fn read_code(reader: &mut BitReader<'_>) -> Result<GameCode, CodecError> {
    let mut indices = [0u8; GameCode::LENGTH];
    for slot in &mut indices {
        // Five bits never exceed u8.
        *slot = reader.read_int(LETTER_BITS)? as u8;
    }
    GameCode::from_indices(indices).map_err(|err| CodecError::invalid_packet(err.message))
}

fn write_field(writer: &mut BitWriter, coord: FieldCoordinate) -> Result<(), CodecError> {
    writer.add_int(coord.to_index() as u32, FIELD_BITS)?;
    Ok(())
}

fn read_field(reader: &mut BitReader<'_>) -> Result<FieldCoordinate, CodecError> {
    let index = reader.read_int(FIELD_BITS)? as usize;
    FieldCoordinate::from_index(index).map_err(|err| CodecError::invalid_packet(err.message))
}
