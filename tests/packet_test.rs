//! Tests for the packet codec against captured frames.

use remote_tictactoe::protocol::{
    ClientPacket, ClientPacketType, CodecError, GameInfo, ServerPacket, ServerPacketType,
};
use remote_tictactoe::{FieldCoordinate, GameCode, Symbol};
use strum::IntoEnumIterator;

fn at(x: usize, y: usize) -> FieldCoordinate {
    FieldCoordinate::new(x, y).unwrap()
}

#[test]
fn test_decode_game_info_fixture() {
    let packet = ServerPacket::decode(&[0x9F, 0x3E, 0x96]).unwrap();

    let ServerPacket::GameInfo(info) = packet else {
        panic!("expected GameInfo, got {:?}", packet);
    };
    assert_eq!(info.symbol, Symbol::X);
    assert!(info.on_turn);
    assert!(info.has_opponent);
    assert!(info.game_active);
    use Symbol::{O, X};
    assert_eq!(
        info.cells,
        [Some(O), None, Some(X), Some(X), Some(O), Some(O), None, Some(O), Some(X)]
    );
}

#[test]
fn test_decode_game_info_flags_cleared() {
    let packet = ServerPacket::decode(&[0x81, 0x3E, 0x96]).unwrap();

    let ServerPacket::GameInfo(info) = packet else {
        panic!("expected GameInfo, got {:?}", packet);
    };
    assert_eq!(info.symbol, Symbol::O);
    assert!(!info.on_turn);
    assert!(!info.has_opponent);
    assert!(!info.game_active);
    assert_eq!(info.cells[at(1, 1).to_index()], Some(Symbol::O));
}

#[test]
fn test_game_info_encodes_to_fixture() {
    use Symbol::{O, X};
    let info = GameInfo {
        symbol: X,
        on_turn: true,
        has_opponent: true,
        game_active: true,
        cells: [Some(O), None, Some(X), Some(X), Some(O), Some(O), None, Some(O), Some(X)],
    };
    assert_eq!(
        ServerPacket::GameInfo(info).encode().unwrap(),
        vec![0x9F, 0x3E, 0x96]
    );
}

#[test]
fn test_empty_game_info_is_two_bytes() {
    let packet = ServerPacket::decode(&[0b1001_1110, 0]).unwrap();
    assert_eq!(
        packet,
        ServerPacket::GameInfo(GameInfo {
            symbol: Symbol::X,
            on_turn: true,
            has_opponent: true,
            game_active: true,
            cells: [None; 9],
        })
    );
}

#[test]
fn test_decode_welcome() {
    let packet = ServerPacket::decode(&[0, 0, 0, 0]).unwrap();
    assert_eq!(packet, ServerPacket::Welcome(GameCode::parse("AAAAA").unwrap()));

    // "ZYXWV": 25 24 23 22 21 after tag 000.
    let code = GameCode::parse("ZYXWV").unwrap();
    let frame = ServerPacket::Welcome(code.clone()).encode().unwrap();
    assert_eq!(frame.len(), 4);
    assert_eq!(ServerPacket::decode(&frame).unwrap(), ServerPacket::Welcome(code));
}

#[test]
fn test_welcome_letter_out_of_range() {
    // First letter 31.
    let err = ServerPacket::decode(&[0b0001_1111, 0, 0, 0]).unwrap_err();
    assert!(matches!(err, CodecError::InvalidPacket(_)), "{:?}", err);
}

#[test]
fn test_short_welcome_rejected() {
    let err = ServerPacket::decode(&[0b0000_0000, 0b0111_0000, 0x96]).unwrap_err();
    assert!(matches!(err, CodecError::InvalidPacket(_)), "{:?}", err);
}

#[test]
fn test_decode_opponent_move() {
    assert_eq!(
        ServerPacket::decode(&[0b0100_1000]).unwrap(),
        ServerPacket::OpponentMakeMove(at(1, 1))
    );
    assert_eq!(
        ServerPacket::decode(&[0b0100_0110]).unwrap(),
        ServerPacket::OpponentMakeMove(at(0, 1))
    );
}

#[test]
fn test_opponent_move_field_out_of_range() {
    // Field 9
    let err = ServerPacket::decode(&[0b0101_0010]).unwrap_err();
    assert!(matches!(err, CodecError::InvalidPacket(_)), "{:?}", err);
}

#[test]
fn test_payloadless_server_packets() {
    let cases = [
        (0b0010_0000, ServerPacket::PacketInvalid),
        (0b0110_0000, ServerPacket::OpponentLeave),
        (0b1010_0000, ServerPacket::ActionInvalid),
        (0b1100_0000, ServerPacket::GameCodeInvalid),
        (0b1110_0000, ServerPacket::GameFull),
    ];
    for (byte, want) in cases {
        assert_eq!(ServerPacket::decode(&[byte]).unwrap(), want);
        assert_eq!(want.encode().unwrap(), vec![byte]);
    }
}

#[test]
fn test_trailing_data_rejected() {
    assert!(ServerPacket::decode(&[0b1110_0001]).is_err());
    assert!(ServerPacket::decode(&[0b1110_0000, 0]).is_err());
}

#[test]
fn test_empty_frame_rejected() {
    assert!(matches!(
        ServerPacket::decode(&[]),
        Err(CodecError::InvalidPacket(_))
    ));
}

#[test]
fn test_client_frames() {
    let cases = [
        (
            ClientPacket::CodeSubmit(GameCode::parse("AAAAA").unwrap()),
            vec![0, 0, 0, 0],
        ),
        (ClientPacket::RequestCurrentStatus, vec![0b0010_0000]),
        (ClientPacket::PlayerMakeMove(at(1, 1)), vec![0b0100_1000]),
        (ClientPacket::PlayerMakeMove(at(1, 0)), vec![0b0100_0010]),
        (ClientPacket::PlayerMakeMove(at(1, 2)), vec![0b0100_1110]),
        (ClientPacket::BoardReset, vec![0b0110_0000]),
        (ClientPacket::ToggleSymbol, vec![0b1000_0000]),
    ];
    for (packet, want) in cases {
        assert_eq!(packet.encode().unwrap(), want, "{:?}", packet);
        assert_eq!(ClientPacket::decode(&want).unwrap(), packet);
    }
}

#[test]
fn test_packet_types_match_variants() {
    assert_eq!(ClientPacketType::iter().count(), 5);
    assert_eq!(ServerPacketType::iter().count(), 8);
    assert_eq!(
        ServerPacket::GameFull.packet_type(),
        ServerPacketType::from_tag(7).unwrap()
    );
    assert_eq!(
        ClientPacket::ToggleSymbol.packet_type(),
        ClientPacketType::from_tag(4).unwrap()
    );
}
