//! Shader variable extraction and constant-buffer header synthesis.
//!
//! The [`VariableManager`] owns the [`VariableTable`] for one shader's
//! lifetime and performs the source-to-source rewrite at the heart of the
//! two-pass protocol:
//!
//! | Pass | Table | Declaration rewritten to |
//! |------|-------|--------------------------|
//! | [`ShaderPass::Collect`]  | populated | `0.f` placeholder literal |
//! | [`ShaderPass::Generate`] | untouched | bare identifier (`VAR_name`) |
//! | [`ShaderPass::Combined`] | populated | bare identifier (`VAR_name`) |
//!
//! The Collect rewrite keeps the file compilable before the generated header
//! exists; the Generate rewrite makes every site refer to a field of the
//! synthesized `cbuffer`.

use std::fmt::Write;

use crate::errors::{Result, ShaderTuneError};
use crate::utils::split::split_delimited;
use crate::variables::{Variable, VariableTable};

/// Tag prefix marking a tunable-variable declaration in shader source.
pub const VARIABLE_TAG: &str = "VAR_";

/// Logical include name under which the generated header is registered.
///
/// Shader source that declares variables is expected to
/// `#include "user_variables.hlsl"`.
pub const VARIABLES_HEADER_NAME: &str = "user_variables.hlsl";

const HEADER_GUARD: &str = "USER_VARIABLES_HLSL";
const CBUFFER_NAME: &str = "user_variables";

/// Which compile pass a parse run serves.
///
/// Owned by the orchestrator and passed explicitly into every parse/load
/// call; it never changes mid-parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderPass {
    /// Single-compile mode: collect variables and rewrite to identifiers.
    Combined,
    /// First of two compiles: collect variables, rewrite to placeholders.
    Collect,
    /// Second of two compiles: rewrite to identifiers only.
    Generate,
}

/// Extracts variable declarations from shader source and synthesizes the
/// matching constant-buffer header.
#[derive(Debug, Default)]
pub struct VariableManager {
    variables: VariableTable,
    slot: u32,
}

impl VariableManager {
    /// Create a manager whose generated `cbuffer` binds to register `b<slot>`.
    #[must_use]
    pub fn new(slot: u32) -> Self {
        Self {
            variables: VariableTable::new(),
            slot,
        }
    }

    /// Clear the variable table ahead of a new compile cycle.
    pub fn reset(&mut self) {
        self.variables.clear();
    }

    /// Change the constant-buffer register slot.
    pub fn set_slot(&mut self, slot: u32) {
        self.slot = slot;
    }

    #[must_use]
    pub fn has_variables(&self) -> bool {
        !self.variables.is_empty()
    }

    #[must_use]
    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut VariableTable {
        &mut self.variables
    }

    /// Set the current value of a variable by short name.
    pub fn set_value(&mut self, name: &str, value: f32) -> bool {
        self.variables.set_value(name, value)
    }

    /// Scan `input` for `VAR_<name>(<params>)` declarations and return a
    /// rewritten copy per the pass rules; collecting passes also populate
    /// the variable table as a side effect.
    ///
    /// A declaration span runs from the tag to the next `)`, outermost and
    /// non-nesting; a tag with no closing `)` anywhere after it is left as
    /// literal text.
    pub fn parse_source(&mut self, input: &str, pass: ShaderPass) -> Result<String> {
        let split = split_delimited(input, VARIABLE_TAG, Some(")"));
        let mut output = String::with_capacity(input.len());

        for (part, declaration) in split.parts.iter().zip(&split.separators) {
            output.push_str(part);

            let (full_name, params) = dissect_declaration(declaration)?;

            if matches!(pass, ShaderPass::Collect | ShaderPass::Combined) {
                let variable = Variable::from_params(&parse_params(declaration, params)?);
                let short_name = full_name[VARIABLE_TAG.len()..].trim();
                if !self
                    .variables
                    .insert_first_wins(short_name.to_owned(), variable)
                {
                    log::warn!(
                        "shader variable \"{short_name}\" declared more than once, first declaration wins"
                    );
                }
            }

            match pass {
                ShaderPass::Collect => output.push_str("0.f"),
                ShaderPass::Combined | ShaderPass::Generate => output.push_str(full_name),
            }
        }
        output.push_str(split.parts[split.separators.len()]);

        Ok(output)
    }

    /// Synthesize the constant-buffer declaration header.
    ///
    /// Always emits the include guard so the reserved include name resolves
    /// even before any variable exists; the `cbuffer` block is present only
    /// when the table is non-empty. Field order is the table's canonical
    /// order, the same order [`VariableTable::packed_values`] uses.
    #[must_use]
    pub fn generate_header(&self) -> String {
        let mut header = format!("#ifndef {HEADER_GUARD}\n#define {HEADER_GUARD}\n");
        if !self.variables.is_empty() {
            let _ = write!(header, "cbuffer {CBUFFER_NAME} : register(b{})\n{{\n", self.slot);
            for (name, _) in self.variables.iter() {
                let _ = writeln!(header, "\tfloat {VARIABLE_TAG}{name};");
            }
            header.push_str("};\n");
        }
        header.push_str("#endif\n");
        header
    }
}

/// Split a declaration span (`VAR_name(params)`) into the full identifier as
/// it appeared in source and the raw parameter text.
fn dissect_declaration(declaration: &str) -> Result<(&str, &str)> {
    let Some(paren) = declaration.find('(') else {
        return Err(parse_error(declaration, "missing '(' before ')'"));
    };
    let full_name = declaration[..paren].trim_end();
    if full_name[VARIABLE_TAG.len()..].trim().is_empty() {
        return Err(parse_error(declaration, "missing variable name"));
    }
    // the span always ends with the `)` that terminated it
    let params = &declaration[paren + 1..declaration.len() - 1];
    Ok((full_name, params))
}

/// Parse `key=value` fragments separated by commas.
///
/// An empty fragment (trailing comma) ends parsing without error; a
/// non-empty fragment without `=` or with a non-numeric value is fatal.
fn parse_params(declaration: &str, params: &str) -> Result<Vec<(String, f32)>> {
    let mut parsed = Vec::new();
    for fragment in split_delimited(params, ",", None).parts {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            break;
        }
        let Some((key, value)) = fragment.split_once('=') else {
            return Err(parse_error(
                declaration,
                &format!("parameter \"{fragment}\" is missing '='"),
            ));
        };
        let Some(value) = parse_float(value.trim()) else {
            return Err(parse_error(
                declaration,
                &format!("parameter value \"{}\" is not a number", value.trim()),
            ));
        };
        parsed.push((key.trim().to_owned(), value));
    }
    Ok(parsed)
}

/// Parse a decimal literal, tolerating the HLSL `f`/`F` suffix.
fn parse_float(text: &str) -> Option<f32> {
    let text = text.strip_suffix(['f', 'F']).unwrap_or(text);
    text.parse().ok()
}

fn parse_error(declaration: &str, message: &str) -> ShaderTuneError {
    ShaderTuneError::Parse {
        declaration: declaration.to_owned(),
        message: message.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_collect_rewrites_to_placeholder() {
        let mut manager = VariableManager::new(2);
        let out = manager
            .parse_source("float r = VAR_radius(min=1, max=5);", ShaderPass::Collect)
            .unwrap();
        assert_eq!(out, "float r = 0.f;");

        let var = manager.variables().get("radius").unwrap();
        assert!(approx(var.min, 1.0));
        assert!(approx(var.max, 5.0));
        assert!(approx(var.start, 3.0));
        assert!(approx(var.step, 0.2));
    }

    #[test]
    fn test_generate_rewrites_to_identifier_without_collecting() {
        let mut manager = VariableManager::new(2);
        let out = manager
            .parse_source("float r = VAR_radius(min=1, max=5);", ShaderPass::Generate)
            .unwrap();
        assert_eq!(out, "float r = VAR_radius;");
        assert!(!manager.has_variables());
    }

    #[test]
    fn test_combined_collects_and_rewrites_to_identifier() {
        let mut manager = VariableManager::new(2);
        let out = manager
            .parse_source("float r = VAR_radius();", ShaderPass::Combined)
            .unwrap();
        assert_eq!(out, "float r = VAR_radius;");
        assert!(manager.has_variables());
    }

    #[test]
    fn test_bare_declaration_gets_defaults() {
        let mut manager = VariableManager::new(0);
        manager
            .parse_source("VAR_foo()", ShaderPass::Collect)
            .unwrap();

        let var = manager.variables().get("foo").unwrap();
        assert!(approx(var.min, 0.0));
        assert!(approx(var.max, 2.0));
        assert!(approx(var.start, 1.0));
        assert!(approx(var.step, 0.1));
    }

    #[test]
    fn test_trailing_comma_tolerated() {
        let mut manager = VariableManager::new(0);
        manager
            .parse_source("VAR_foo(min=1,)", ShaderPass::Collect)
            .unwrap();
        assert!(approx(manager.variables().get("foo").unwrap().min, 1.0));
    }

    #[test]
    fn test_missing_equals_is_fatal() {
        let mut manager = VariableManager::new(0);
        let err = manager
            .parse_source("VAR_x(min)", ShaderPass::Collect)
            .unwrap_err();
        assert!(matches!(err, ShaderTuneError::Parse { .. }));
        assert!(!manager.has_variables());
    }

    #[test]
    fn test_non_numeric_value_is_fatal() {
        let mut manager = VariableManager::new(0);
        let err = manager
            .parse_source("VAR_x(min=abc)", ShaderPass::Collect)
            .unwrap_err();
        assert!(matches!(err, ShaderTuneError::Parse { .. }));
    }

    #[test]
    fn test_float_suffix_tolerated() {
        let mut manager = VariableManager::new(0);
        manager
            .parse_source("VAR_x(min=0.5f, max=2.5F)", ShaderPass::Collect)
            .unwrap();
        let var = manager.variables().get("x").unwrap();
        assert!(approx(var.min, 0.5));
        assert!(approx(var.max, 2.5));
    }

    #[test]
    fn test_unknown_parameter_accepted() {
        let mut manager = VariableManager::new(0);
        manager
            .parse_source("VAR_x(wobble=3, max=4)", ShaderPass::Collect)
            .unwrap();
        assert!(approx(manager.variables().get("x").unwrap().max, 4.0));
    }

    #[test]
    fn test_redeclaration_keeps_first_bounds() {
        let mut manager = VariableManager::new(0);
        manager
            .parse_source("VAR_x(max=4) VAR_x(max=9)", ShaderPass::Collect)
            .unwrap();
        assert_eq!(manager.variables().len(), 1);
        assert!(approx(manager.variables().get("x").unwrap().max, 4.0));
    }

    #[test]
    fn test_multiple_declarations_rewrite_in_place() {
        let mut manager = VariableManager::new(0);
        let out = manager
            .parse_source(
                "a = VAR_one(); b = VAR_two(min=1); tail",
                ShaderPass::Collect,
            )
            .unwrap();
        assert_eq!(out, "a = 0.f; b = 0.f; tail");
        assert_eq!(manager.variables().len(), 2);
    }

    #[test]
    fn test_unterminated_tag_left_untouched() {
        let mut manager = VariableManager::new(0);
        let out = manager
            .parse_source("// see VAR_notes in the docs", ShaderPass::Collect)
            .unwrap();
        assert_eq!(out, "// see VAR_notes in the docs");
        assert!(!manager.has_variables());
    }

    #[test]
    fn test_header_empty_table_is_guard_only() {
        let manager = VariableManager::new(2);
        let header = manager.generate_header();
        assert!(header.contains("#ifndef USER_VARIABLES_HLSL"));
        assert!(!header.contains("cbuffer"));
    }

    #[test]
    fn test_header_declares_fields_in_table_order() {
        let mut manager = VariableManager::new(3);
        manager
            .parse_source("VAR_zeta() VAR_alpha()", ShaderPass::Collect)
            .unwrap();

        let header = manager.generate_header();
        assert!(header.contains("register(b3)"));
        let alpha = header.find("float VAR_alpha;").unwrap();
        let zeta = header.find("float VAR_zeta;").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn test_header_order_matches_packed_order() {
        let mut manager = VariableManager::new(0);
        manager
            .parse_source("VAR_b(start=2) VAR_a(start=1) VAR_c(start=3)", ShaderPass::Collect)
            .unwrap();

        // field sequence in the header text
        let header = manager.generate_header();
        let fields: Vec<&str> = header
            .lines()
            .filter_map(|line| line.trim().strip_prefix("float "))
            .map(|field| field.trim_end_matches(';'))
            .collect();
        assert_eq!(fields, ["VAR_a", "VAR_b", "VAR_c"]);

        // value sequence in the upload block
        let packed = manager.variables().packed_values();
        assert_eq!(&packed[..3], [1.0, 2.0, 3.0]);
    }
}
