//! Naming convention utilities for code generation.
//!
//! Schema names are written in `PascalCase` (commands, enum variants) or
//! `snake_case` (fields, categories). This module converts between the two and
//! makes sure every generated identifier is valid Rust.
//!
//! # Supported Conversions
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `GetRxPktLength` | [`to_snake_case`] | `get_rx_pkt_length` |
//! | `bitrate_ch1` | [`to_pascal_case`] | `BitrateCh1` |
//! | `bw_12_5` | [`to_pascal_case`] | `Bw12p5` |
//! | `zwave` | [`title_case`] | `Zwave` |
//! | `type` | [`escape_keyword`] | `r#type` |

use std::collections::BTreeMap;

/// Convert a `PascalCase` or `camelCase` name to `snake_case`.
///
/// An underscore goes before an uppercase letter that follows a lowercase
/// letter or digit, and before the last capital of an acronym followed by a
/// lowercase letter.
///
/// # Examples
///
/// ```
/// use cmdgen_cli::codegen::naming::to_snake_case;
///
/// assert_eq!(to_snake_case("GetStatus"), "get_status");
/// assert_eq!(to_snake_case("SetRxBW"), "set_rx_bw");
/// assert_eq!(to_snake_case("GetFSKStats"), "get_fsk_stats");
/// assert_eq!(to_snake_case("SetLr2Fhss"), "set_lr2_fhss");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let acronym_end =
                prev.is_ascii_uppercase() && next.is_some_and(|n| n.is_ascii_lowercase());
            let word_start = prev.is_ascii_lowercase() || prev.is_ascii_digit();
            if acronym_end || word_start {
                result.push('_');
            }
        }
        result.extend(c.to_lowercase());
    }

    result
}

/// Convert a `snake_case` name to `PascalCase`.
///
/// Digit runs joined by an underscore are fused with a `p` (for "point"),
/// and every word is capitalized with the rest of it lowercased.
///
/// # Examples
///
/// ```
/// use cmdgen_cli::codegen::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("rx_bw"), "RxBw");
/// assert_eq!(to_pascal_case("bw_12_5"), "Bw12p5");
/// assert_eq!(to_pascal_case("RX_BOOST"), "RxBoost");
/// assert_eq!(to_pascal_case("bitrate_ch1"), "BitrateCh1");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    fuse_decimal_points(s)
        .split('_')
        .map(capitalize_word)
        .collect()
}

/// Replace `_` between two digit runs with `p`.
fn fuse_decimal_points(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            result.push(chars[i]);
            i += 1;
            continue;
        }
        i = push_digits(&chars, i, &mut result);
        if chars.get(i) == Some(&'_') && chars.get(i + 1).is_some_and(char::is_ascii_digit) {
            result.push('p');
            i = push_digits(&chars, i + 1, &mut result);
        }
    }

    result
}

fn push_digits(chars: &[char], mut i: usize, out: &mut String) -> usize {
    while let Some(&c) = chars.get(i).filter(|c| c.is_ascii_digit()) {
        out.push(c);
        i += 1;
    }
    i
}

/// Uppercase the first character and lowercase the rest.
fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}

/// Capitalize each alphabetic run, as used in file header comments.
///
/// # Examples
///
/// ```
/// use cmdgen_cli::codegen::naming::title_case;
///
/// assert_eq!(title_case("system"), "System");
/// assert_eq!(title_case("lr_fhss"), "Lr_Fhss");
/// ```
pub fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(c);
            in_word = false;
        }
    }

    result
}

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

// Keywords that cannot be raw identifiers.
const PATH_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

/// Make `name` usable as a Rust identifier.
///
/// # Examples
///
/// ```
/// use cmdgen_cli::codegen::naming::escape_keyword;
///
/// assert_eq!(escape_keyword("type"), "r#type");
/// assert_eq!(escape_keyword("self"), "self_");
/// assert_eq!(escape_keyword("rssi"), "rssi");
/// ```
pub fn escape_keyword(name: &str) -> String {
    if PATH_KEYWORDS.contains(&name) {
        format!("{name}_")
    } else if KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Name of the enum type generated for a field, before remapping.
pub fn enum_base_name(field_name: &str) -> String {
    to_pascal_case(field_name)
}

/// Name of the enum type used for a field, after the shared-type remap.
///
/// # Examples
///
/// ```
/// use cmdgen_cli::codegen::naming::enum_type_name;
/// use std::collections::BTreeMap;
///
/// let remap = BTreeMap::from([("Sd1Sf".to_string(), "Sf".to_string())]);
/// assert_eq!(enum_type_name("sd1_sf", &remap), "Sf");
/// assert_eq!(enum_type_name("header_type", &remap), "HeaderType");
/// ```
pub fn enum_type_name(field_name: &str, remap: &BTreeMap<String, String>) -> String {
    let name = enum_base_name(field_name);
    remap.get(&name).cloned().unwrap_or(name)
}
