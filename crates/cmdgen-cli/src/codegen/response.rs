//! Response struct generation.
//!
//! A response is a newtype over the raw bytes read back from the device. The
//! first two bytes always hold the generic status; every status field gets an
//! accessor that extracts and converts its bits on demand.

use super::expr::{Expr, hex};
use super::naming::{escape_keyword, to_pascal_case};
use super::overrides::{AccessorOverride, accessor_override, display_override};
use super::push_doc;
use super::types::RustType;
use crate::config::GeneratorConfig;
use cmdgen_schema::layout::{SignExtension, response_len, sign_extension, unpack_plan};
use cmdgen_schema::{Command, Field, Variant};
use std::collections::BTreeSet;
use tracing::{debug, warn};

const BODY: &str = "        ";
const CONTINUATION: &str = "            ";

/// `{Command}Rsp[Adv]` with a leading `Get` removed.
pub fn response_struct_name(command: &Command, variant: Variant) -> String {
    let mut name = format!("{}Rsp", command.name);
    if variant.is_advanced() {
        name.push_str("Adv");
    }
    match name.strip_prefix("Get") {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

/// Render the response struct of `command` for `variant`.
pub fn generate_response(command: &Command, variant: Variant, config: &GeneratorConfig) -> String {
    let name = response_struct_name(command, variant);
    let fields = command.status_fields_for(variant);
    let len = response_len(fields.iter().copied());
    let status = &config.status_type;

    let mut code = String::new();
    code.push_str(&format!("/// Response for {} command\n", command.name));
    code.push_str(&format!("pub struct {name}([u8; {len}]);\n\n"));

    code.push_str(&format!("impl Default for {name} {{\n"));
    code.push_str("    fn default() -> Self {\n");
    code.push_str(&format!("        Self([0; {len}])\n"));
    code.push_str("    }\n");
    code.push_str("}\n\n");

    code.push_str(&format!("impl {name} {{\n"));
    code.push_str("    /// Create a new response buffer\n");
    code.push_str("    pub fn new() -> Self {\n");
    code.push_str("        Self::default()\n");
    code.push_str("    }\n\n");
    code.push_str("    /// Return Status\n");
    code.push_str(&format!("    pub fn status(&self) -> {status} {{\n"));
    code.push_str(&format!("        {status}::from_slice(&self.0[..2])\n"));
    code.push_str("    }\n");

    for field in &fields {
        code.push('\n');
        if field.is_variable_length() {
            code.push_str(&format!(
                "    // {}: variable length, no accessor\n",
                field.name
            ));
            continue;
        }
        push_doc(&mut code, "    ", &field.description);
        code.push_str(&accessor(command, field, config));
    }
    code.push_str("}\n\n");

    code.push_str(&format!("impl AsMut<[u8]> for {name} {{\n"));
    code.push_str("    fn as_mut(&mut self) -> &mut [u8] {\n");
    code.push_str("        &mut self.0\n");
    code.push_str("    }\n");
    code.push_str("}\n");

    if let Some(display) = display_override(&command.name) {
        let args = display.args.join(", ");
        code.push('\n');
        code.push_str(&format!("impl defmt::Format for {name} {{\n"));
        code.push_str("    fn format(&self, fmt: defmt::Formatter) {\n");
        code.push_str(&format!(
            "        defmt::write!(fmt, \"{}\", {args});\n",
            display.format
        ));
        code.push_str("    }\n");
        code.push_str("}\n");
    }

    debug!(response = %name, len, "generated response");
    code
}

fn accessor(command: &Command, field: &Field, config: &GeneratorConfig) -> String {
    let ident = escape_keyword(&field.name);
    let (return_type, body) = match accessor_override(&command.name, &field.name) {
        Some(AccessorOverride::InterruptFlags) => interrupt_flags(field, config),
        Some(AccessorOverride::SaturatingEnum) => saturating_enum(command, field, config),
        None => generic(field, config),
    };

    let mut code = format!("    pub fn {ident}(&self) -> {return_type} {{\n");
    for line in body {
        code.push_str(BODY);
        code.push_str(&line);
        code.push('\n');
    }
    code.push_str("    }\n");
    code
}

fn interrupt_flags(field: &Field, config: &GeneratorConfig) -> (String, Vec<String>) {
    let ty = config.interrupt_type.clone();
    let start = field.min_byte_index().unwrap_or(0);
    let end = field.max_byte_index().map_or(start, |i| i + 1);
    let body = format!("{ty}::from_slice(&self.0[{start}..{end}])");
    (ty, vec![body])
}

fn saturating_enum(command: &Command, field: &Field, config: &GeneratorConfig) -> (String, Vec<String>) {
    let ty = RustType::for_field(field, &config.enum_remap);
    match &ty {
        RustType::Enum(name) if config.saturating_enums.contains_key(name) => {
            let mut raw = raw_bits(field);
            if !RustType::raw(field).is_u8() {
                raw = raw.cast("u8");
            }
            (name.clone(), vec![format!("{name}::new({raw})")])
        }
        _ => {
            warn!(
                command = %command.name,
                field = %field.name,
                "no saturating constructor for {ty}, using generic decoding"
            );
            generic(field, config)
        }
    }
}

fn generic(field: &Field, config: &GeneratorConfig) -> (String, Vec<String>) {
    let ty = RustType::for_field(field, &config.enum_remap);
    let raw = raw_bits(field);

    let body = match &ty {
        RustType::Bool => vec![raw.is_nonzero().to_string()],
        RustType::Enum(name) => enum_match(name, field, raw),
        RustType::Int { signed: false, .. } | RustType::Bytes => vec![raw.to_string()],
        RustType::Int { signed: true, .. } => match sign_extension(field) {
            Some(SignExtension::Reinterpret) => vec![raw.cast(&ty.to_string()).to_string()],
            Some(SignExtension::TopBit { byte_index, bit, width }) => {
                let sign = Expr::response_byte(byte_index).mask(1 << bit).is_nonzero();
                vec![
                    format!("let raw = {raw};"),
                    format!(
                        "if {sign} {{ raw.wrapping_sub({}) as {ty} }} else {{ raw as {ty} }}",
                        hex(1u64 << width)
                    ),
                ]
            }
            None => vec![raw.cast(&ty.to_string()).to_string()],
        },
    };

    (ty.to_string(), body)
}

/// Unsigned bits of `field`, least-significant segment first.
fn raw_bits(field: &Field) -> Expr {
    let raw_type = RustType::raw(field);
    let terms = unpack_plan(field)
        .into_iter()
        .map(|step| {
            let mut term = Expr::response_byte(step.byte_index).shr(step.lsb.into());
            if step.needs_mask() {
                term = term.mask(step.mask().into());
            }
            if !raw_type.is_u8() {
                term = term.cast(&raw_type.to_string());
            }
            term.shl(step.acc_shift)
        })
        .collect();

    Expr::or_lines(terms, CONTINUATION).unwrap_or_else(|| Expr::atom("0"))
}

/// Decode through a `match` on the raw code; unknown codes map to the first variant.
fn enum_match(type_name: &str, field: &Field, raw: Expr) -> Vec<String> {
    let variants = field.variants.as_deref().unwrap_or_default();
    let Some(first) = variants.first() else {
        return vec![raw.to_string()];
    };
    let width_mask = if field.bit_width >= 64 {
        u64::MAX
    } else {
        (1u64 << field.bit_width) - 1
    };

    let mut lines = vec![format!("let raw = {raw};"), "match raw {".to_string()];
    let mut seen = BTreeSet::new();
    for variant in variants {
        let code = (variant.value as u64) & width_mask;
        if seen.insert(code) {
            lines.push(format!(
                "    {code} => {type_name}::{},",
                to_pascal_case(&variant.name)
            ));
        }
    }
    lines.push(format!("    _ => {type_name}::{},", to_pascal_case(&first.name)));
    lines.push("}".to_string());
    lines
}
