//! Category file assembly.
//!
//! A generated `cmd_<category>.rs` file is laid out as:
//!
//! ```text
//! // <Category> commands API
//!
//! use ...;                       imports
//!
//! pub enum ...                   enums, first definition order
//!
//! pub fn ..._req / ..._cmd       request builders, base then advanced
//!
//! // Response structs
//!
//! pub struct ...Rsp              responses, base then advanced
//!
//! // Commands with variable length parameters (not implemented):
//! // - <Command>
//! ```

use super::enums::{EnumConflict, collect_enums, generate_enum};
use super::naming::title_case;
use super::request::generate_request;
use super::response::generate_response;
use super::CodegenError;
use crate::config::GeneratorConfig;
use cmdgen_schema::Category;
use tracing::{debug, warn};

/// What happened while generating one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: String,
    /// Commands left out entirely because of variable-length parameters.
    pub skipped: Vec<String>,
    pub conflicts: Vec<EnumConflict>,
    pub enums: usize,
    pub functions: usize,
    pub structs: usize,
}

/// A rendered category file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOutput {
    pub file_name: String,
    pub content: String,
    pub report: CategoryReport,
}

/// Render the complete source file for `category`.
pub fn generate_category(
    category: &Category,
    config: &GeneratorConfig,
) -> Result<CategoryOutput, CodegenError> {
    let mut report = CategoryReport {
        category: category.name.clone(),
        ..CategoryReport::default()
    };
    let mut sections: Vec<String> = vec![format!("// {} commands API\n", title_case(&category.name))];

    sections.extend(imports(category, config));

    let enums = collect_enums(category, config);
    for field in &enums.fields {
        sections.push(format!("\n{}", generate_enum(field, config)?.trim_end()));
    }
    if !enums.fields.is_empty() {
        sections.push(String::new());
    }
    report.enums = enums.fields.len();
    report.conflicts = enums.conflicts;

    for command in &category.commands {
        if command.is_skipped() {
            warn!(
                category = %category.name,
                command = %command.name,
                "skipping command with variable length parameters"
            );
            report.skipped.push(command.name.clone());
            continue;
        }
        for variant in command.request_variants() {
            sections.push(generate_request(command, variant, config)?);
            report.functions += 1;
        }
    }

    if category.has_responses() {
        sections.push("// Response structs\n".to_string());
        for command in category.commands.iter().filter(|c| !c.is_skipped()) {
            for variant in command.response_variants() {
                sections.push(generate_response(command, variant, config));
                report.structs += 1;
            }
        }
    }

    if !report.skipped.is_empty() {
        let mut block = String::from("// Commands with variable length parameters (not implemented):\n");
        for name in &report.skipped {
            block.push_str(&format!("// - {name}\n"));
        }
        sections.push(block);
    }

    debug!(
        category = %category.name,
        enums = report.enums,
        functions = report.functions,
        structs = report.structs,
        "generated category"
    );

    Ok(CategoryOutput {
        file_name: format!("cmd_{}.rs", category.name),
        content: sections.join("\n"),
        report,
    })
}

fn imports(category: &Category, config: &GeneratorConfig) -> Vec<String> {
    let module = &config.status_module;
    let mut lines = Vec::new();

    if category.name == config.system_category {
        lines.push(format!(
            "use {module}::{{{},{}}};",
            config.status_type, config.interrupt_type
        ));
    } else if category.has_responses() {
        lines.push(format!("use {module}::{};", config.status_type));
    }
    if config.imports_bandwidth(&category.name) {
        lines.push(format!("use {};", config.bandwidth_import));
    }

    lines
}
