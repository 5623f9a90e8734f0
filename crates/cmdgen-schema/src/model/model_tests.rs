#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

fn pos(byte: usize, range: &str) -> BytePosition {
    BytePosition::parse(byte, range).unwrap()
}

// BytePosition tests

#[test_case("7:0", 7, 0, 8 ; "full byte")]
#[test_case("7:4", 7, 4, 4 ; "high nibble")]
#[test_case("3:0", 3, 0, 4 ; "low nibble")]
#[test_case("3", 3, 3, 1 ; "single bit")]
#[test_case(" 5 : 2 ", 5, 2, 4 ; "surrounding whitespace")]
fn BytePosition___parse___reads_range(range: &str, msb: u8, lsb: u8, width: u32) {
    let pos = BytePosition::parse(4, range).unwrap();

    assert_eq!(pos.byte_index(), 4);
    assert_eq!((pos.msb(), pos.lsb()), (msb, lsb));
    assert_eq!(pos.width(), width);
}

#[test]
fn BytePosition___parse___rejects_inverted_range() {
    let err = BytePosition::parse(2, "3:7").unwrap_err();

    assert_eq!(
        err,
        Violation::InvertedBitRange {
            range: "3:7".to_string()
        }
    );
}

#[test]
fn BytePosition___parse___rejects_bit_outside_byte() {
    assert_eq!(
        BytePosition::parse(2, "8").unwrap_err(),
        Violation::BitOutOfByte { bit: 8 }
    );
    assert_eq!(
        BytePosition::parse(2, "15:8").unwrap_err(),
        Violation::BitOutOfByte { bit: 15 }
    );
}

#[test_case("a:0" ; "letter")]
#[test_case("" ; "empty")]
#[test_case("7:" ; "missing lsb")]
#[test_case("-1" ; "negative")]
fn BytePosition___parse___rejects_malformed_range(range: &str) {
    assert_eq!(
        BytePosition::parse(2, range).unwrap_err(),
        Violation::MalformedBitRange(range.to_string())
    );
}

#[test]
fn BytePosition___mask___covers_width() {
    assert_eq!(pos(2, "7:0").mask(), 0xFF);
    assert_eq!(pos(2, "7:4").mask(), 0x0F);
    assert_eq!(pos(2, "3").mask(), 0x01);
}

#[test]
fn BytePosition___fills_byte___only_for_7_0() {
    assert!(pos(2, "7:0").fills_byte());
    assert!(!pos(2, "7:1").fills_byte());
    assert!(!pos(2, "6:0").fills_byte());
}

#[test]
fn BytePosition___display___matches_schema_notation() {
    assert_eq!(pos(3, "7:4").to_string(), "[3, 7:4]");
    assert_eq!(pos(2, "3").to_string(), "[2, 3]");
}

// Field tests

#[test]
fn Field___new___accepts_matching_width() {
    let field = Field::new("temp", 12, vec![pos(3, "7:4"), pos(4, "7:0")]).unwrap();

    assert_eq!(field.bit_width, 12);
    assert_eq!(field.byte_len(), 2);
    assert!(!field.is_single_segment());
}

#[test]
fn Field___new___rejects_width_mismatch() {
    let err = Field::new("temp", 13, vec![pos(3, "7:4"), pos(4, "7:0")]).unwrap_err();

    assert_eq!(
        err,
        Violation::WidthMismatch {
            declared: 13,
            actual: 12
        }
    );
}

#[test]
fn Field___new___rejects_positions_on_variable_length() {
    let err = Field::new("payload", 0, vec![pos(2, "7:0")]).unwrap_err();

    assert_eq!(err, Violation::VariableLengthWithPositions);
}

#[test]
fn Field___new___rejects_more_than_64_bits() {
    let positions = (2..11).map(|b| pos(b, "7:0")).collect();

    assert_eq!(
        Field::new("huge", 72, positions).unwrap_err(),
        Violation::BitWidthTooLarge(72)
    );
}

#[test]
fn Field___new___accepts_variable_length_without_positions() {
    let field = Field::new("payload", 0, vec![]).unwrap();

    assert!(field.is_variable_length());
    assert_eq!(field.byte_len(), 0);
}

#[test]
fn Field___is_flag___single_bit_without_enum() {
    let flag = Field::new("enable", 1, vec![pos(2, "0")]).unwrap();
    let enum_bit = Field::new("mode", 1, vec![pos(2, "0")])
        .unwrap()
        .with_variants(vec![EnumVariant::new("off", 0), EnumVariant::new("on", 1)]);

    assert!(flag.is_flag());
    assert!(!enum_bit.is_flag());
    assert!(enum_bit.is_enum());
}

#[test]
fn Field___with_variants___empty_list_is_not_enum() {
    let field = Field::new("mode", 2, vec![pos(2, "1:0")])
        .unwrap()
        .with_variants(vec![]);

    assert!(!field.is_enum());
}

#[test_case(1, 1)]
#[test_case(8, 1)]
#[test_case(9, 2)]
#[test_case(13, 2)]
#[test_case(24, 3)]
#[test_case(32, 4)]
fn Field___byte_len___rounds_up(bit_width: u32, expected: usize) {
    let mut field = Field::new("x", 0, vec![]).unwrap();
    field.bit_width = bit_width;

    assert_eq!(field.byte_len(), expected);
}

// Command tests

fn optional_param() -> Field {
    Field::new("sleep_time", 32, (4..8).map(|b| pos(b, "7:0")).collect())
        .unwrap()
        .with_optional(true)
}

#[test]
fn Command___opcode_bytes___high_byte_first() {
    assert_eq!(Command::new("GetVersion", 0x0101).opcode_bytes(), [0x01, 0x01]);
    assert_eq!(Command::new("SetZwave", 0x0297).opcode_bytes(), [0x02, 0x97]);
}

#[test]
fn Command___request_variants___advanced_only_with_optional_parameters() {
    let plain = Command::new("SetFs", 0x0102);
    let with_optional = Command::new("SetSleep", 0x0127).with_parameter(optional_param());

    assert_eq!(plain.request_variants(), vec![Variant::Base]);
    assert_eq!(
        with_optional.request_variants(),
        vec![Variant::Base, Variant::Advanced]
    );
}

#[test]
fn Command___response_variants___empty_without_status_fields() {
    assert!(Command::new("SetFs", 0x0102).response_variants().is_empty());
}

#[test]
fn Command___response_variants___advanced_with_optional_status_field() {
    let cmd = Command::new("GetStats", 0x0210)
        .with_status_field(Field::new("count", 8, vec![pos(2, "7:0")]).unwrap())
        .with_status_field(
            Field::new("errors", 8, vec![pos(3, "7:0")])
                .unwrap()
                .with_optional(true),
        );

    assert_eq!(
        cmd.response_variants(),
        vec![Variant::Base, Variant::Advanced]
    );
    assert_eq!(cmd.status_fields_for(Variant::Base).len(), 1);
    assert_eq!(cmd.status_fields_for(Variant::Advanced).len(), 2);
}

#[test]
fn Command___parameters_for___base_elides_optional() {
    let cmd = Command::new("SetSleep", 0x0127)
        .with_parameter(Field::new("ret_en", 8, vec![pos(3, "7:0")]).unwrap())
        .with_parameter(optional_param());

    let base: Vec<_> = cmd
        .parameters_for(Variant::Base)
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    let advanced: Vec<_> = cmd
        .parameters_for(Variant::Advanced)
        .iter()
        .map(|p| p.name.as_str())
        .collect();

    assert_eq!(base, vec!["ret_en"]);
    assert_eq!(advanced, vec!["ret_en", "sleep_time"]);
}

#[test]
fn Command___is_skipped___when_any_parameter_is_variable_length() {
    let cmd = Command::new("WriteBuffer", 0x0109)
        .with_parameter(Field::new("data", 0, vec![]).unwrap().with_optional(true));

    assert!(cmd.is_skipped());
    assert_eq!(cmd.variable_length_parameters().count(), 1);
}

// Category / Schema tests

#[test]
fn Schema___command_count___sums_categories() {
    let schema = Schema {
        categories: vec![
            Category::new("system", vec![Command::new("GetStatus", 0x0100)]),
            Category::new(
                "lora",
                vec![Command::new("SetLoraParams", 0x0201), Command::new("GetLoraStats", 0x0202)],
            ),
        ],
    };

    assert_eq!(schema.command_count(), 3);
}

#[test]
fn Category___has_responses___ignores_skipped_commands() {
    let status = Field::new("val", 8, vec![pos(2, "7:0")]).unwrap();
    let skipped = Command::new("ReadThing", 0x0110)
        .with_parameter(Field::new("data", 0, vec![]).unwrap())
        .with_status_field(status.clone());
    let generated = Command::new("GetThing", 0x0111).with_status_field(status);

    assert!(!Category::new("system", vec![skipped.clone()]).has_responses());
    assert!(Category::new("system", vec![skipped, generated]).has_responses());
}
