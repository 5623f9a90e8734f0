//! Request builder generation.
//!
//! Each command gets a function returning its request as a fixed-size byte
//! array: two opcode bytes followed by the packed parameters.
//!
//! ```text
//! /// Enter sleep mode
//! pub fn set_sleep_cmd(ret_en: bool) -> [u8; 3] {
//!     let mut cmd = [0u8; 3];
//!     cmd[0] = 0x01;
//!     cmd[1] = 0x27;
//!
//!     if ret_en { cmd[2] |= 0x01; }
//!     cmd
//! }
//! ```

use super::expr::{Expr, hex_byte};
use super::naming::{escape_keyword, to_snake_case};
use super::overrides::{RequestOverride, request_override};
use super::types::RustType;
use super::{CodegenError, push_doc};
use crate::config::GeneratorConfig;
use cmdgen_schema::layout::{pack_plan, request_len};
use cmdgen_schema::{Command, Field, Variant};
use tracing::debug;

/// `<snake name>[_adv]_req` for commands with a response, `..._cmd` otherwise.
pub fn request_fn_name(command: &Command, variant: Variant) -> String {
    let mut name = to_snake_case(&command.name);
    if variant.is_advanced() {
        name.push_str("_adv");
    }
    name.push_str(if command.has_response() { "_req" } else { "_cmd" });
    name
}

/// Render the request builder of `command` for `variant`.
///
/// When a parameter of the variant is variable-length, a one-line comment
/// naming those parameters is returned instead of a function.
pub fn generate_request(
    command: &Command,
    variant: Variant,
    config: &GeneratorConfig,
) -> Result<String, CodegenError> {
    let name = request_fn_name(command, variant);
    let params = command.parameters_for(variant);

    let variable: Vec<&str> = params
        .iter()
        .filter(|p| p.is_variable_length())
        .map(|p| p.name.as_str())
        .collect();
    if !variable.is_empty() {
        return Ok(format!(
            "// {name}: not generated, variable length parameters: {}\n",
            variable.join(", ")
        ));
    }

    let len = request_len(params.iter().copied());
    let [opcode_hi, opcode_lo] = command.opcode_bytes();

    let signature = params
        .iter()
        .filter(|p| request_override(&command.name, &p.name).is_none())
        .map(|p| {
            format!(
                "{}: {}",
                escape_keyword(&p.name),
                RustType::for_field(p, &config.enum_remap)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut code = String::new();
    push_doc(&mut code, "", &command.description);
    code.push_str(&format!("pub fn {name}({signature}) -> [u8; {len}] {{\n"));

    if params.is_empty() {
        code.push_str(&format!(
            "    [{}, {}]\n",
            hex_byte(opcode_hi),
            hex_byte(opcode_lo)
        ));
    } else {
        code.push_str(&format!("    let mut cmd = [0u8; {len}];\n"));
        code.push_str(&format!("    cmd[0] = {};\n", hex_byte(opcode_hi)));
        code.push_str(&format!("    cmd[1] = {};\n", hex_byte(opcode_lo)));
        code.push('\n');
        for param in &params {
            for line in pack_statements(command, param, config) {
                let byte_index = line.byte_index;
                if byte_index >= len {
                    return Err(CodegenError::PositionOutOfBuffer {
                        function: name,
                        field: param.name.clone(),
                        byte_index,
                        len,
                    });
                }
                code.push_str(&format!("    {}\n", line.text));
            }
        }
        code.push_str("    cmd\n");
    }
    code.push_str("}\n");

    debug!(function = %name, len, "generated request");
    Ok(code)
}

struct PackLine {
    byte_index: usize,
    text: String,
}

fn pack_statements(command: &Command, param: &Field, config: &GeneratorConfig) -> Vec<PackLine> {
    if let Some(RequestOverride::ForceBits {
        byte_index,
        mask,
        note,
    }) = request_override(&command.name, &param.name)
    {
        return vec![PackLine {
            byte_index,
            text: format!("cmd[{byte_index}] |= {}; // {note}", hex_byte(mask)),
        }];
    }

    let ident = escape_keyword(&param.name);
    let ty = RustType::for_field(param, &config.enum_remap);

    pack_plan(param)
        .into_iter()
        .map(|step| {
            let byte_index = step.byte_index;
            let text = match &ty {
                RustType::Bool => {
                    format!("if {ident} {{ cmd[{byte_index}] |= {}; }}", hex_byte(1 << step.lsb))
                }
                _ => {
                    let (value, value_type) = match &ty {
                        RustType::Enum(_) => {
                            let raw = RustType::raw(param);
                            (Expr::atom(&ident).cast(&raw.to_string()), raw)
                        }
                        other => (Expr::atom(&ident), other.clone()),
                    };
                    let mut value = value.shr(step.value_shift);
                    if step.needs_mask() {
                        value = value.mask(step.mask().into());
                    }
                    value = value.shl(step.lsb.into());
                    if !value_type.is_u8() {
                        value = value.cast("u8");
                    }
                    format!("cmd[{byte_index}] |= {value};")
                }
            };
            PackLine { byte_index, text }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use cmdgen_schema::{BytePosition, EnumVariant};

    fn pos(byte: usize, range: &str) -> BytePosition {
        BytePosition::parse(byte, range).unwrap()
    }

    fn param(name: &str, bit_width: u32, positions: Vec<BytePosition>) -> Field {
        Field::new(name, bit_width, positions)
            .unwrap()
            .with_description(name)
    }

    fn generate(command: &Command, variant: Variant) -> String {
        generate_request(command, variant, &GeneratorConfig::default()).unwrap()
    }

    // request_fn_name tests

    #[test]
    fn request_fn_name___suffix_follows_response_presence() {
        let fire = Command::new("SetStandby", 0x0128);
        let query = Command::new("GetTemp", 0x0125)
            .with_status_field(param("temp", 8, vec![pos(2, "7:0")]));

        assert_eq!(request_fn_name(&fire, Variant::Base), "set_standby_cmd");
        assert_eq!(request_fn_name(&query, Variant::Base), "get_temp_req");
        assert_eq!(request_fn_name(&fire, Variant::Advanced), "set_standby_adv_cmd");
    }

    // generate_request tests

    #[test]
    fn generate_request___no_parameters___returns_opcode_literal() {
        let cmd = Command::new("ClearIrq", 0x0116).with_description("Clear interrupts");

        assert_eq!(
            generate(&cmd, Variant::Base),
            "/// Clear interrupts\npub fn clear_irq_cmd() -> [u8; 2] {\n    [0x01, 0x16]\n}\n"
        );
    }

    #[test]
    fn generate_request___flag___sets_bit() {
        let cmd = Command::new("SetFlag", 0x0201)
            .with_description("Set a flag")
            .with_parameter(param("enable", 1, vec![pos(2, "3")]));

        assert_eq!(
            generate(&cmd, Variant::Base),
            "/// Set a flag\n\
             pub fn set_flag_cmd(enable: bool) -> [u8; 3] {\n\
             \x20   let mut cmd = [0u8; 3];\n\
             \x20   cmd[0] = 0x02;\n\
             \x20   cmd[1] = 0x01;\n\
             \n\
             \x20   if enable { cmd[2] |= 0x08; }\n\
             \x20   cmd\n\
             }\n"
        );
    }

    #[test]
    fn generate_request___multi_segment___masks_before_shifting() {
        let cmd = Command::new("SetOffset", 0x0202)
            .with_parameter(param("offset", 12, vec![pos(2, "7:4"), pos(3, "7:0")]).with_signed(true));

        let code = generate(&cmd, Variant::Base);

        assert!(code.contains("pub fn set_offset_cmd(offset: i16) -> [u8; 4] {"));
        assert!(code.contains("    cmd[2] |= (((offset >> 8) & 0xF) << 4) as u8;\n"));
        assert!(code.contains("    cmd[3] |= offset as u8;\n"));
    }

    #[test]
    fn generate_request___position_past_request___is_error() {
        let wide = Command::new("SetFar", 0x0203)
            .with_parameter(param("far", 8, vec![pos(9, "7:0")]));

        let err = generate_request(&wide, Variant::Base, &GeneratorConfig::default()).unwrap_err();

        assert_eq!(
            err,
            CodegenError::PositionOutOfBuffer {
                function: "set_far_cmd".to_string(),
                field: "far".to_string(),
                byte_index: 9,
                len: 3
            }
        );
    }

    #[test]
    fn generate_request___lone_parameter_after_gap___is_error() {
        let cmd = Command::new("SetOffset", 0x0202).with_parameter(
            param("offset", 12, vec![pos(3, "7:4"), pos(4, "7:0")]).with_signed(true),
        );

        let err = generate_request(&cmd, Variant::Base, &GeneratorConfig::default()).unwrap_err();

        assert_eq!(
            err,
            CodegenError::PositionOutOfBuffer {
                function: "set_offset_cmd".to_string(),
                field: "offset".to_string(),
                byte_index: 4,
                len: 4
            }
        );
    }

    #[test]
    fn generate_request___enum___casts_to_storage() {
        let mode = param("header_type", 2, vec![pos(2, "3:2")]).with_variants(vec![
            EnumVariant::new("Explicit", 0),
            EnumVariant::new("Implicit", 1),
        ]);
        let full = param("packet_type", 8, vec![pos(3, "7:0")])
            .with_variants(vec![EnumVariant::new("Lora", 0)]);
        let cmd = Command::new("SetPacket", 0x0203)
            .with_parameter(mode)
            .with_parameter(full);

        let code = generate(&cmd, Variant::Base);

        assert!(code.contains("header_type: HeaderType, packet_type: PacketType"));
        assert!(code.contains("    cmd[2] |= ((header_type as u8) & 0x3) << 2;\n"));
        assert!(code.contains("    cmd[3] |= packet_type as u8;\n"));
    }

    #[test]
    fn generate_request___wide_value___shifts_each_byte() {
        let cmd = Command::new("SetRfFrequency", 0x0200)
            .with_parameter(param(
                "freq",
                32,
                vec![pos(2, "7:0"), pos(3, "7:0"), pos(4, "7:0"), pos(5, "7:0")],
            ));

        let code = generate(&cmd, Variant::Base);

        assert!(code.contains("    cmd[2] |= (freq >> 24) as u8;\n"));
        assert!(code.contains("    cmd[3] |= (freq >> 16) as u8;\n"));
        assert!(code.contains("    cmd[4] |= (freq >> 8) as u8;\n"));
        assert!(code.contains("    cmd[5] |= freq as u8;\n"));
    }

    #[test]
    fn generate_request___optional_parameter___only_in_advanced() {
        let cmd = Command::new("SetSleep", 0x0127)
            .with_parameter(param("ret_en", 1, vec![pos(2, "0")]))
            .with_parameter(
                param("sleep_time", 32, (3..7).map(|b| pos(b, "7:0")).collect()).with_optional(true),
            );

        let base = generate(&cmd, Variant::Base);
        let adv = generate(&cmd, Variant::Advanced);

        assert!(base.contains("pub fn set_sleep_cmd(ret_en: bool) -> [u8; 3] {"));
        assert!(adv.contains("pub fn set_sleep_adv_cmd(ret_en: bool, sleep_time: u32) -> [u8; 7] {"));
    }

    #[test]
    fn generate_request___forced_bits___drop_parameter() {
        let format = param("temp_format", 1, vec![pos(2, "3")]);
        let src = param("src", 2, vec![pos(2, "1:0")]);
        let cmd = Command::new("GetTemp", 0x0125)
            .with_parameter(src)
            .with_parameter(format)
            .with_status_field(param("temp", 8, vec![pos(2, "7:0")]));

        let code = generate(&cmd, Variant::Base);

        assert!(code.contains("pub fn get_temp_req(src: u8) -> [u8; 4] {"));
        assert!(code.contains("    cmd[2] |= 0x08; // Force format to Celsius\n"));
    }

    #[test]
    fn generate_request___variable_length___emits_placeholder() {
        let cmd = Command::new("WriteBuffer", 0x0109)
            .with_parameter(param("data", 0, vec![]));

        assert_eq!(
            generate(&cmd, Variant::Base),
            "// write_buffer_cmd: not generated, variable length parameters: data\n"
        );
    }

    #[test]
    fn generate_request___keyword_parameter___is_escaped() {
        let cmd = Command::new("SetType", 0x0204)
            .with_parameter(param("type", 8, vec![pos(2, "7:0")]));

        let code = generate(&cmd, Variant::Base);

        assert!(code.contains("pub fn set_type_cmd(r#type: u8)"));
        assert!(code.contains("    cmd[2] |= r#type;\n"));
    }
}
