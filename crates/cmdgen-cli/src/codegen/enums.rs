//! Enum type emission.
//!
//! Enumerated fields become Rust enums, one per distinct type name in a
//! category. Several fields may share a type; the first definition wins and
//! later ones with a different variant list are reported as conflicts.

use super::naming::{enum_base_name, to_pascal_case};
use super::{CodegenError, push_doc};
use crate::config::GeneratorConfig;
use cmdgen_schema::{Category, Field};
use tracing::warn;

/// Outcome of registering an enum definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// First definition under this name.
    New,
    /// Same name and variant list as an earlier definition.
    Duplicate,
    /// Same name, different variants; the earlier list is kept.
    Conflict { existing: Vec<String> },
}

/// Enum type names seen so far in one category, with their variant names.
#[derive(Debug, Default)]
pub struct EnumRegistry {
    seen: Vec<(String, Vec<String>)>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, variants: Vec<String>) -> Registration {
        match self.seen.iter().find(|(n, _)| n == name) {
            Some((_, existing)) if *existing == variants => Registration::Duplicate,
            Some((_, existing)) => Registration::Conflict {
                existing: existing.clone(),
            },
            None => {
                self.seen.push((name.to_string(), variants));
                Registration::New
            }
        }
    }
}

/// An enum redefined with different variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConflict {
    pub enum_name: String,
    pub command: String,
    pub kept: Vec<String>,
    pub ignored: Vec<String>,
}

/// Enum definitions of a category, in emission order.
#[derive(Debug, Default)]
pub struct CategoryEnums<'a> {
    pub fields: Vec<&'a Field>,
    pub conflicts: Vec<EnumConflict>,
}

/// Collect the enums a category file defines.
///
/// Skipped commands generate no code, so their fields define no enums.
pub fn collect_enums<'a>(category: &'a Category, config: &GeneratorConfig) -> CategoryEnums<'a> {
    let mut registry = EnumRegistry::new();
    let mut enums = CategoryEnums::default();

    for command in category.commands.iter().filter(|c| !c.is_skipped()) {
        for field in command.parameters.iter().chain(&command.status_fields) {
            let Some(variants) = &field.variants else {
                continue;
            };
            let name = enum_base_name(&field.name);
            if !config.emits_enum(&name, &category.name) {
                continue;
            }

            let variant_names = variants.iter().map(|v| v.name.clone()).collect();
            match registry.register(&name, variant_names) {
                Registration::New => enums.fields.push(field),
                Registration::Duplicate => {}
                Registration::Conflict { existing } => {
                    warn!(
                        category = %category.name,
                        command = %command.name,
                        enum_name = %name,
                        "conflicting enum definition, keeping the first one"
                    );
                    enums.conflicts.push(EnumConflict {
                        enum_name: name,
                        command: command.name.clone(),
                        kept: existing,
                        ignored: variants.iter().map(|v| v.name.clone()).collect(),
                    });
                }
            }
        }
    }

    enums
}

/// Render the enum for `field`, plus its saturating constructor when configured.
pub fn generate_enum(field: &Field, config: &GeneratorConfig) -> Result<String, CodegenError> {
    let name = enum_base_name(&field.name);
    let variants = field.variants.as_deref().unwrap_or_default();
    let mut code = String::new();

    push_doc(&mut code, "", &field.description);
    code.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq)]\n");
    code.push_str(&format!("pub enum {name} {{\n"));
    for variant in variants {
        code.push_str(&format!(
            "    {} = {},\n",
            to_pascal_case(&variant.name),
            variant.value
        ));
    }
    code.push_str("}\n");

    if let Some(range) = config.saturating_enums.get(&name) {
        code.push_str(&saturating_constructor(&name, field, range)?);
    }

    Ok(code)
}

/// `impl Name { pub fn new(val: u8) -> Self }` mapping unknown codes to the first variant.
fn saturating_constructor(
    name: &str,
    field: &Field,
    range: &[String],
) -> Result<String, CodegenError> {
    let variants = field.variants.as_deref().unwrap_or_default();
    let mut arms = Vec::with_capacity(range.len());

    for variant_name in range {
        let variant = variants
            .iter()
            .find(|v| to_pascal_case(&v.name) == *variant_name)
            .ok_or_else(|| CodegenError::UnknownSaturatingVariant {
                enum_name: name.to_string(),
                variant: variant_name.clone(),
            })?;
        let code = u8::try_from(variant.value).map_err(|_| {
            CodegenError::SaturatingValueOutOfRange {
                enum_name: name.to_string(),
                variant: variant_name.clone(),
                value: variant.value,
            }
        })?;
        arms.push((code, variant_name));
    }

    let Some(((_, fallback), rest)) = arms.split_first() else {
        return Ok(String::new());
    };

    let mut code = String::new();
    code.push_str(&format!("impl {name} {{\n"));
    code.push_str("    pub fn new(val: u8) -> Self {\n");
    code.push_str("        match val {\n");
    for (value, variant) in rest.iter().rev() {
        code.push_str(&format!("            {value} => {name}::{variant},\n"));
    }
    code.push_str(&format!("            _ => {name}::{fallback},\n"));
    code.push_str("        }\n");
    code.push_str("    }\n");
    code.push_str("}\n");

    Ok(code)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use cmdgen_schema::{BytePosition, Command, EnumVariant};

    fn enum_field(name: &str, variants: &[(&str, i64)]) -> Field {
        Field::new(name, 2, vec![BytePosition::new(2, 1, 0).unwrap()])
            .unwrap()
            .with_description(format!("{name} setting"))
            .with_variants(
                variants
                    .iter()
                    .map(|(n, v)| EnumVariant::new(*n, *v))
                    .collect(),
            )
    }

    fn names(enums: &CategoryEnums) -> Vec<String> {
        enums
            .fields
            .iter()
            .map(|f| enum_base_name(&f.name))
            .collect()
    }

    // EnumRegistry tests

    #[test]
    fn EnumRegistry___register___reports_new_duplicate_conflict() {
        let mut registry = EnumRegistry::new();
        let ab = vec!["A".to_string(), "B".to_string()];

        assert_eq!(registry.register("Mode", ab.clone()), Registration::New);
        assert_eq!(registry.register("Mode", ab.clone()), Registration::Duplicate);
        assert_eq!(
            registry.register("Mode", vec!["A".to_string()]),
            Registration::Conflict { existing: ab }
        );
        assert_eq!(registry.register("Sync", vec!["No".to_string()]), Registration::New);
    }

    // collect_enums tests

    #[test]
    fn collect_enums___keeps_first_definition_and_reports_conflict() {
        let category = Category::new(
            "lora",
            vec![
                Command::new("SetA", 0x0201)
                    .with_parameter(enum_field("mode", &[("Off", 0), ("On", 1)])),
                Command::new("SetB", 0x0202)
                    .with_parameter(enum_field("mode", &[("Off", 0), ("On", 1)])),
                Command::new("SetC", 0x0203)
                    .with_parameter(enum_field("mode", &[("Off", 0), ("Auto", 2)])),
            ],
        );

        let enums = collect_enums(&category, &GeneratorConfig::default());

        assert_eq!(names(&enums), vec!["Mode"]);
        assert_eq!(enums.conflicts.len(), 1);
        assert_eq!(enums.conflicts[0].command, "SetC");
        assert_eq!(enums.conflicts[0].kept, vec!["Off", "On"]);
        assert_eq!(enums.conflicts[0].ignored, vec!["Off", "Auto"]);
    }

    #[test]
    fn collect_enums___skips_remapped_excluded_and_foreign_bandwidth() {
        let category = Category::new(
            "ble",
            vec![
                Command::new("SetBle", 0x0601)
                    .with_parameter(enum_field("sd1_sf", &[("Sf5", 5)]))
                    .with_parameter(enum_field("rx_bw", &[("Bw4", 0)]))
                    .with_parameter(enum_field("header_type", &[("Explicit", 0)])),
                Command::new("GetTemp", 0x0125)
                    .with_parameter(enum_field("temp_format", &[("Raw", 0), ("Celsius", 1)])),
            ],
        );

        let enums = collect_enums(&category, &GeneratorConfig::default());

        assert_eq!(names(&enums), vec!["HeaderType"]);
    }

    #[test]
    fn collect_enums___status_fields_follow_same_exclusions() {
        let category = Category::new(
            "ook",
            vec![
                Command::new("GetOok", 0x0701)
                    .with_status_field(enum_field("rx_bw", &[("Bw4", 0)]))
                    .with_status_field(enum_field("last_detect", &[("R1", 0)]))
                    .with_status_field(enum_field("sync", &[("No", 0), ("Yes", 1)])),
            ],
        );

        let enums = collect_enums(&category, &GeneratorConfig::default());

        assert_eq!(names(&enums), vec!["Sync"]);
    }

    #[test]
    fn collect_enums___ignores_fields_of_skipped_commands() {
        let category = Category::new(
            "system",
            vec![
                Command::new("WriteBuffer", 0x0109)
                    .with_parameter(enum_field("mode", &[("A", 0)]))
                    .with_parameter(Field::new("data", 0, vec![]).unwrap())
                    .with_status_field(enum_field("state", &[("Idle", 0)])),
            ],
        );

        let enums = collect_enums(&category, &GeneratorConfig::default());

        assert!(enums.fields.is_empty());
    }

    // generate_enum tests

    #[test]
    fn generate_enum___renders_variants_in_order() {
        let field = enum_field("header_type", &[("EXPLICIT", 0), ("implicit", 1)]);

        let code = generate_enum(&field, &GeneratorConfig::default()).unwrap();

        assert_eq!(
            code,
            "/// header_type setting\n\
             #[derive(Debug, Clone, Copy, PartialEq, Eq)]\n\
             pub enum HeaderType {\n    Explicit = 0,\n    Implicit = 1,\n}\n"
        );
    }

    #[test]
    fn generate_enum___saturating_enum_gets_constructor() {
        let field = enum_field("zwave_mode", &[("R1", 0), ("R2", 1), ("R3", 2), ("Lr1", 3)]);

        let code = generate_enum(&field, &GeneratorConfig::default()).unwrap();

        assert!(code.contains("impl ZwaveMode {\n    pub fn new(val: u8) -> Self {\n"));
        assert!(code.contains(
            "            2 => ZwaveMode::R3,\n            1 => ZwaveMode::R2,\n            _ => ZwaveMode::R1,\n"
        ));
    }

    #[test]
    fn generate_enum___unknown_saturating_variant___fails() {
        let field = enum_field("zwave_mode", &[("R1", 0), ("R2", 1)]);

        let err = generate_enum(&field, &GeneratorConfig::default()).unwrap_err();

        assert_eq!(
            err,
            CodegenError::UnknownSaturatingVariant {
                enum_name: "ZwaveMode".to_string(),
                variant: "R3".to_string()
            }
        );
    }
}
