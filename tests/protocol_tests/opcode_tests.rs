//! Opcode Tests
//!
//! Tests for the opcode tables of both protocol versions.

use std::collections::HashSet;

use finebench::protocol::{
    Command, Form, Op, OpcodeTable, ProtocolVersion, COMMAND_IN_LOW_BITS, FLAGS_IN_HIGH_BITS,
};

// =============================================================================
// Table Shape
// =============================================================================

fn assert_bijective(table: &OpcodeTable) {
    let bytes: HashSet<u8> = table.entries.iter().map(|(b, _)| *b).collect();
    let ops: HashSet<Op> = table.entries.iter().map(|(_, op)| *op).collect();
    assert_eq!(bytes.len(), table.entries.len(), "{}: duplicate byte", table.name);
    assert_eq!(ops.len(), table.entries.len(), "{}: duplicate op", table.name);
}

#[test]
fn test_tables_are_bijective() {
    assert_bijective(&FLAGS_IN_HIGH_BITS);
    assert_bijective(&COMMAND_IN_LOW_BITS);
}

#[test]
fn test_round_trip_every_entry() {
    for version in [ProtocolVersion::FlagsInHighBits, ProtocolVersion::CommandInLowBits] {
        let table = version.opcodes();
        for (byte, op) in table.entries {
            assert_eq!(table.encode(*op), Some(*byte));
            assert_eq!(table.decode(*byte), Some(*op));
            assert_eq!(table.decode(table.encode(*op).unwrap()), Some(*op));
        }
    }
}

// =============================================================================
// Variant A: flags in high bits
// =============================================================================

#[test]
fn test_flags_in_high_bits_put_flags() {
    let table = &FLAGS_IN_HIGH_BITS;
    assert_eq!(table.encode(Op::put()), Some(0x21));
    assert_eq!(table.encode(Op::put().synchronous(true)), Some(0x29));
    assert_eq!(table.encode(Op::put().compressed(true)), Some(0x61));
    assert_eq!(
        table.encode(Op::put().synchronous(true).compressed(true)),
        Some(0x69)
    );
}

#[test]
fn test_flags_in_high_bits_get() {
    let table = &FLAGS_IN_HIGH_BITS;
    assert_eq!(table.encode(Op::get()), Some(0x00));
    assert_eq!(table.encode(Op::get().compressed(true)), Some(0x40));
}

#[test]
fn test_flags_in_high_bits_tagged_puts() {
    let table = &FLAGS_IN_HIGH_BITS;

    let legacy = table.decode(0x01).unwrap();
    assert_eq!(legacy.command, Command::Put);
    assert_eq!(legacy.form, Form::Legacy);
    assert!(!legacy.synchronous && !legacy.compressed);

    let single_shot = table.decode(0x41).unwrap();
    assert_eq!(single_shot.command, Command::Put);
    assert_eq!(single_shot.form, Form::SingleShot);

    // Same flags as 0x21, different tag
    assert_ne!(single_shot, Op::put());
    assert_eq!(table.encode(Op::put().form(Form::SingleShot)), Some(0x41));
}

#[test]
fn test_flags_in_high_bits_has_no_del() {
    let table = &FLAGS_IN_HIGH_BITS;
    assert!(!table.supports(Command::Del));
    assert_eq!(table.encode(Op::del()), None);
}

// =============================================================================
// Variant B: command in low bits
// =============================================================================

#[test]
fn test_command_in_low_bits_commands() {
    let table = &COMMAND_IN_LOW_BITS;
    assert_eq!(table.encode(Op::get()), Some(0x00));
    assert_eq!(table.encode(Op::put()), Some(0x01));
    assert_eq!(table.encode(Op::get().form(Form::Alternate)), Some(0x02));
    assert_eq!(table.encode(Op::del()), Some(0x03));
}

#[test]
fn test_command_in_low_bits_has_no_modifiers() {
    let table = &COMMAND_IN_LOW_BITS;
    assert!(!table.contains(Op::put().synchronous(true)));
    assert!(!table.contains(Op::put().compressed(true)));
    assert!(!table.contains(Op::get().compressed(true)));
}

#[test]
fn test_unknown_bytes_decode_to_none() {
    assert_eq!(FLAGS_IN_HIGH_BITS.decode(0x03), None);
    assert_eq!(COMMAND_IN_LOW_BITS.decode(0x21), None);
}

// =============================================================================
// Protocol Version
// =============================================================================

#[test]
fn test_version_selects_tables() {
    assert_eq!(ProtocolVersion::FlagsInHighBits.opcodes().name, "flags-in-high-bits");
    assert_eq!(ProtocolVersion::FlagsInHighBits.statuses().mask, 0x07);
    assert_eq!(ProtocolVersion::CommandInLowBits.opcodes().name, "command-in-low-bits");
    assert_eq!(ProtocolVersion::CommandInLowBits.statuses().mask, 0x3f);
}

#[test]
fn test_version_from_str() {
    assert_eq!("a".parse::<ProtocolVersion>(), Ok(ProtocolVersion::FlagsInHighBits));
    assert_eq!("command-in-low-bits".parse::<ProtocolVersion>(), Ok(ProtocolVersion::CommandInLowBits));
    assert!("c".parse::<ProtocolVersion>().is_err());
}

#[test]
fn test_op_display() {
    assert_eq!(Op::put().synchronous(true).compressed(true).to_string(), "Put+sync+compressed");
    assert_eq!(Op::get().form(Form::Alternate).to_string(), "Get (Alternate)");
}
