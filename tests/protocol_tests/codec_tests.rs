//! Codec Tests
//!
//! Tests for request/response frame encoding and decoding.

use std::collections::VecDeque;
use std::io::{self, BufReader, Cursor, ErrorKind, Read};

use finebench::protocol::{
    decode_request, decode_response, encode_request, encode_response, read_available,
    read_response, Command, Form, Op, ProtocolVersion, Status, MAX_KEY_LEN, READ_CHUNK_SIZE,
};
use finebench::{CodecError, StoreError};

const A: ProtocolVersion = ProtocolVersion::FlagsInHighBits;
const B: ProtocolVersion = ProtocolVersion::CommandInLowBits;

// =============================================================================
// Request Encoding
// =============================================================================

#[test]
fn test_encode_put_layout() {
    let frame = encode_request(A, Op::put(), b"aaa", Some(b"bbbb")).unwrap();
    assert_eq!(
        &frame[..],
        &[0x21, 0x00, 0x03, b'a', b'a', b'a', 0x00, 0x00, 0x00, 0x04, b'b', b'b', b'b', b'b']
    );
}

#[test]
fn test_encode_get_layout() {
    let frame = encode_request(A, Op::get(), b"foo", None).unwrap();
    assert_eq!(&frame[..], &[0x00, 0x00, 0x03, b'f', b'o', b'o']);

    let frame = encode_request(A, Op::get().compressed(true), b"foo", None).unwrap();
    assert_eq!(frame[0], 0x40);
}

#[test]
fn test_encode_del_under_command_in_low_bits() {
    let frame = encode_request(B, Op::del(), b"gone", None).unwrap();
    assert_eq!(&frame[..], &[0x03, 0x00, 0x04, b'g', b'o', b'n', b'e']);
}

#[test]
fn test_encode_length_fields_are_big_endian() {
    let key = vec![b'k'; 0x0102];
    let value = vec![b'v'; 0x010203];
    let frame = encode_request(B, Op::put(), &key, Some(&value)).unwrap();

    assert_eq!(&frame[1..3], &[0x01, 0x02]);
    let data_len_at = 3 + key.len();
    assert_eq!(&frame[data_len_at..data_len_at + 4], &[0x00, 0x01, 0x02, 0x03]);
    assert_eq!(frame.len(), 3 + key.len() + 4 + value.len());
}

#[test]
fn test_encode_empty_key_and_value() {
    let frame = encode_request(A, Op::put(), b"", Some(b"")).unwrap();
    assert_eq!(&frame[..], &[0x21, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn test_encode_value_presence_rules() {
    assert_eq!(
        encode_request(A, Op::put(), b"k", None),
        Err(CodecError::MissingValue(Command::Put))
    );
    assert_eq!(
        encode_request(A, Op::get(), b"k", Some(b"v")),
        Err(CodecError::UnexpectedValue(Command::Get))
    );
}

#[test]
fn test_encode_rejects_non_ascii_key() {
    assert_eq!(
        encode_request(A, Op::get(), "clé".as_bytes(), None),
        Err(CodecError::NonAsciiKey)
    );
}

#[test]
fn test_encode_rejects_op_missing_from_table() {
    assert!(matches!(
        encode_request(A, Op::del(), b"k", None),
        Err(CodecError::UnsupportedOp(_))
    ));
    assert!(matches!(
        encode_request(B, Op::put().synchronous(true), b"k", Some(b"v")),
        Err(CodecError::UnsupportedOp(_))
    ));
}

// =============================================================================
// Size Limits
// =============================================================================

#[test]
fn test_key_of_max_length_encodes() {
    let key = vec![b'x'; MAX_KEY_LEN];
    let frame = encode_request(A, Op::get(), &key, None).unwrap();
    assert_eq!(&frame[1..3], &[0xff, 0xff]);
    assert_eq!(frame.len(), 3 + 65535);
}

#[test]
fn test_key_over_max_length_fails() {
    let key = vec![b'x'; MAX_KEY_LEN + 1];
    assert_eq!(
        encode_request(A, Op::get(), &key, None),
        Err(CodecError::KeyTooLong(65536))
    );
}

// =============================================================================
// Request Decoding
// =============================================================================

fn assert_frame_integrity(version: ProtocolVersion, op: Op, key: &[u8], value: Option<&[u8]>) {
    let frame = encode_request(version, op, key, value).unwrap();
    let request = decode_request(version, &frame).unwrap();
    assert_eq!(request.op, op);
    assert_eq!(request.key, key);
    assert_eq!(request.value.as_deref(), value);
}

#[test]
fn test_request_frame_integrity() {
    assert_frame_integrity(A, Op::put(), b"aaa-0", Some(b"bbb"));
    assert_frame_integrity(
        A,
        Op::put().synchronous(true),
        b"trululu pouet pouet-3",
        Some(b"{\"type\":\"question\"}"),
    );
    assert_frame_integrity(
        A,
        Op::put().synchronous(true).compressed(true),
        b"k",
        Some(&[0u8, 1, 2, 0xff]),
    );
    assert_frame_integrity(A, Op::put().form(Form::SingleShot), b"one", Some(b"shot"));
    assert_frame_integrity(A, Op::get().compressed(true), b"foo-1", None);
    assert_frame_integrity(B, Op::get().form(Form::Alternate), b"alt", None);
    assert_frame_integrity(B, Op::del(), b"gone", None);
    assert_frame_integrity(B, Op::put(), b"", Some(b""));
}

#[test]
fn test_decode_request_truncated() {
    let frame = encode_request(A, Op::put(), b"key", Some(b"value")).unwrap();
    for len in [0, 2, 5, 7, frame.len() - 1] {
        assert!(matches!(
            decode_request(A, &frame[..len]),
            Err(CodecError::MalformedRequest(_))
        ));
    }
}

#[test]
fn test_decode_request_unknown_opcode() {
    assert_eq!(
        decode_request(B, &[0x21, 0x00, 0x00]),
        Err(CodecError::UnknownOpcode(0x21))
    );
}

#[test]
fn test_decode_request_rejects_trailing_bytes() {
    let mut frame = encode_request(A, Op::get(), b"k", None).unwrap().to_vec();
    frame.push(0);
    assert!(matches!(
        decode_request(A, &frame),
        Err(CodecError::MalformedRequest(_))
    ));
}

// =============================================================================
// Response Decoding
// =============================================================================

#[test]
fn test_decode_zero_status_under_both_tables() {
    for version in [A, B] {
        let response = decode_response(&[0x00], version).unwrap();
        assert_eq!(response.status, Status::Ok);
        assert!(!response.has_data);
        assert_eq!(response.data, None);
    }
}

#[test]
fn test_decode_0x43_depends_on_table() {
    let narrow = decode_response(&[0x43, b'x'], A).unwrap();
    assert_eq!(narrow.status, Status::NoData);
    assert!(narrow.has_data);
    assert_eq!(narrow.data.as_deref(), Some(&b"x"[..]));

    let wide = decode_response(&[0x43, b'x'], B).unwrap();
    assert_eq!(wide.status, Status::ServerError);
    assert!(wide.has_data);
}

#[test]
fn test_decode_narrow_status_codes() {
    let expected = [
        (0x00, Status::Ok),
        (0x01, Status::ProtocolError),
        (0x02, Status::ServerError),
        (0x03, Status::NoData),
        (0x04, Status::Unknown),
        (0x05, Status::Unknown),
    ];
    for (byte, status) in expected {
        assert_eq!(decode_response(&[byte], A).unwrap().status, status);
    }
}

#[test]
fn test_decode_wide_status_codes() {
    let expected = [
        (0x00, Status::Ok),
        (0x01, Status::BadCommand),
        (0x02, Status::ProtocolError),
        (0x03, Status::ServerError),
        (0x04, Status::Unknown),
        (0x3f, Status::Unknown),
    ];
    for (byte, status) in expected {
        let response = decode_response(&[byte], B).unwrap();
        assert_eq!(response.status, status);
        assert_eq!(response.code, byte);
    }
}

#[test]
fn test_decode_data_bit_independent_of_width() {
    let response = decode_response(&[0x40, 1, 2, 3], B).unwrap();
    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.data, Some(vec![1, 2, 3]));
}

#[test]
fn test_decode_ignores_trailing_bytes_without_data_bit() {
    let response = decode_response(&[0x00, 0xde, 0xad], A).unwrap();
    assert!(!response.has_data);
    assert_eq!(response.data, None);
}

#[test]
fn test_decode_malformed_responses() {
    assert!(matches!(
        decode_response(&[], A),
        Err(CodecError::MalformedResponse(_))
    ));
    assert!(matches!(
        decode_response(&[0x40], A),
        Err(CodecError::MalformedResponse(_))
    ));
}

#[test]
fn test_encode_response_sets_data_bit() {
    assert_eq!(&encode_response(0x00, Some(b"hi"))[..], &[0x40, b'h', b'i']);
    assert_eq!(&encode_response(0x03, None)[..], &[0x03]);
}

// =============================================================================
// Stream Helpers
// =============================================================================

#[test]
fn test_read_response_without_data_stops_after_status() {
    let mut cursor = Cursor::new(vec![0x00, 0xaa, 0xbb]);
    let response = read_response(&mut cursor, A).unwrap();
    assert_eq!(response.status, Status::Ok);
    assert_eq!(cursor.position(), 1);
}

#[test]
fn test_read_response_with_data() {
    let bytes = encode_response(0x00, Some(b"payload"));
    let response = read_response(&mut Cursor::new(bytes.to_vec()), A).unwrap();
    assert_eq!(response.data.as_deref(), Some(&b"payload"[..]));
}

#[test]
fn test_read_response_spanning_several_chunks() {
    let data = vec![7u8; READ_CHUNK_SIZE * 2 + 10];
    let bytes = encode_response(0x00, Some(&data));
    let response = read_response(&mut Cursor::new(bytes.to_vec()), B).unwrap();
    assert_eq!(response.data, Some(data));
}

#[test]
fn test_read_response_empty_stream_is_transport_error() {
    let result = read_response(&mut Cursor::new(Vec::new()), A);
    assert!(matches!(result, Err(StoreError::Transport(_))));
}

#[test]
fn test_read_response_data_bit_without_data_is_codec_error() {
    let result = read_response(&mut Cursor::new(vec![0x40]), A);
    assert!(matches!(
        result,
        Err(StoreError::Codec(CodecError::MalformedResponse(_)))
    ));
}

/// Hands out scripted reads; `None` entries report `WouldBlock`
struct ScriptedReader {
    reads: VecDeque<Option<Vec<u8>>>,
}

impl ScriptedReader {
    fn new(reads: Vec<Option<&[u8]>>) -> Self {
        Self {
            reads: reads.into_iter().map(|r| r.map(|b| b.to_vec())).collect(),
        }
    }
}

impl Read for ScriptedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reads.pop_front() {
            Some(Some(bytes)) => {
                assert!(bytes.len() <= buf.len());
                buf[..bytes.len()].copy_from_slice(&bytes);
                Ok(bytes.len())
            }
            Some(None) => Err(io::Error::new(ErrorKind::WouldBlock, "quiet")),
            None => Ok(0),
        }
    }
}

#[test]
fn test_read_available_takes_full_buffers_until_quiet() {
    // Each read fills the whole buffer; only the pause ends the data
    let mut reader = BufReader::with_capacity(
        4,
        ScriptedReader::new(vec![
            Some(&b"abcd"[..]),
            Some(&b"efgh"[..]),
            None,
            Some(&b"late"[..]),
        ]),
    );

    assert_eq!(read_available(&mut reader).unwrap(), b"abcdefgh".to_vec());
    // Bytes after the pause belong to the next read
    assert_eq!(read_available(&mut reader).unwrap(), b"late".to_vec());
}

#[test]
fn test_read_response_after_buffered_status_takes_rest() {
    let data = vec![b'x'; READ_CHUNK_SIZE + 100];
    let bytes = encode_response(0x00, Some(&data));
    let mut reader = BufReader::with_capacity(READ_CHUNK_SIZE, Cursor::new(bytes.to_vec()));

    let response = read_response(&mut reader, A).unwrap();
    assert_eq!(response.data.map(|d| d.len()), Some(READ_CHUNK_SIZE + 100));
}

#[test]
fn test_read_available_propagates_other_errors() {
    struct Broken;
    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::ConnectionReset, "reset"))
        }
    }

    let err = read_available(&mut BufReader::new(Broken)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionReset);
}
