//! Output formatters for statement outcomes.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use serde_json::json;
use wdb_core::{AttributeDefinition, ClassDefinition, SourceReport, StatementOutcome};
use wdb_proto::{RetrieveResult, RetrievedValue, UpdateCounts, Value};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One `label->value` line per instance
    Plain,
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Plain => write!(f, "plain"),
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl OutputFormat {
    /// Parse a format name as typed in the shell.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "plain" => Some(OutputFormat::Plain),
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Trait for formatting output.
pub trait Formatter {
    /// Format the outcome of one statement.
    fn format_outcome(&self, outcome: &StatementOutcome) -> String {
        match outcome {
            StatementOutcome::ClassDefined(name) => self.format_message(&format!("class {} defined", name)),
            StatementOutcome::Updated(counts) => self.format_counts(counts),
            StatementOutcome::Retrieved(result) => self.format_retrieve(result),
            StatementOutcome::Sourced(report) => self.format_source_report(report),
        }
    }

    /// Format retrieved rows.
    fn format_retrieve(&self, result: &RetrieveResult) -> String;

    /// Format insert/modify counters. Zero counters are omitted.
    fn format_counts(&self, counts: &UpdateCounts) -> String;

    /// Format the report of a sourced file.
    fn format_source_report(&self, report: &SourceReport) -> String;

    /// Format the class list.
    fn format_schema(&self, classes: &[ClassDefinition]) -> String;

    /// Format one class with its attributes.
    fn format_class(&self, class: &ClassDefinition) -> String;

    /// Format an error message.
    fn format_error(&self, error: &str) -> String;

    /// Format a simple message.
    fn format_message(&self, message: &str) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Plain => Box::new(PlainFormatter),
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

fn attribute_flags(attribute: &AttributeDefinition) -> String {
    let mut flags = Vec::new();
    if attribute.required {
        flags.push("required".to_string());
    }
    if let Some(default) = attribute.default_value() {
        flags.push(format!("default {}", literal(default)));
    }
    if let Some(rel) = attribute.as_relationship() {
        if rel.distinct {
            flags.push("distinct".to_string());
        }
        flags.push(format!("inverse {}", rel.inverse));
    }
    flags.join(" ")
}

/// A value as it would be written in a statement.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

/// Column label of a retrieved value. Wildcard values get one column per
/// attribute, e.g. `dept.title` for `dept.*`.
fn column_name(value: &RetrievedValue) -> String {
    if value.path.ends_with('*') {
        format!("{}{}", value.path.trim_end_matches('*'), value.attribute)
    } else {
        value.path.clone()
    }
}

fn source_lines(report: &SourceReport) -> Vec<String> {
    let mut lines = vec![format!(
        "sourced {}: {} executed, {} failed",
        report.path,
        report.executed,
        report.failures.len()
    )];
    for failure in &report.failures {
        lines.push(format!(
            "  {} statement {}: {}",
            failure.path, failure.statement, failure.message
        ));
    }
    lines
}

/// Plain text formatter.
pub struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn format_retrieve(&self, result: &RetrieveResult) -> String {
        result
            .rows
            .iter()
            .map(|row| row.to_line())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_counts(&self, counts: &UpdateCounts) -> String {
        counts.summary().join("\n")
    }

    fn format_source_report(&self, report: &SourceReport) -> String {
        source_lines(report).join("\n")
    }

    fn format_schema(&self, classes: &[ClassDefinition]) -> String {
        if classes.is_empty() {
            return "No classes defined".to_string();
        }
        classes
            .iter()
            .map(|c| c.name.clone())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_class(&self, class: &ClassDefinition) -> String {
        let mut lines = vec![format!("class {} of {}", class.name, class.superclasses.join(", "))];
        if let Some(comment) = &class.comment {
            lines.push(format!("  \"{}\"", comment));
        }
        for attribute in &class.attributes {
            let flags = attribute_flags(attribute);
            let mut line = format!("  {}: {}", attribute.name, attribute.type_label());
            if !flags.is_empty() {
                line.push(' ');
                line.push_str(&flags);
            }
            lines.push(line);
        }
        if !class.subclasses.is_empty() {
            lines.push(format!("  subclasses: {}", class.subclasses.join(", ")));
        }
        lines.join("\n")
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_retrieve(&self, result: &RetrieveResult) -> String {
        if result.is_empty() {
            return "No results".to_string();
        }

        // Columns in first-seen order
        let mut columns: Vec<String> = Vec::new();
        for row in &result.rows {
            for value in &row.values {
                let column = column_name(value);
                if !columns.contains(&column) {
                    columns.push(column);
                }
            }
        }

        let mut table = Table::new();
        table.set_header(columns.iter().map(Cell::new));
        for row in &result.rows {
            let cells = columns.iter().map(|column| {
                row.values
                    .iter()
                    .find(|v| &column_name(v) == column)
                    .map(|v| v.value.to_string())
                    .unwrap_or_default()
            });
            table.add_row(cells.map(Cell::new));
        }

        format!("{}\n({} rows)", table, result.len())
    }

    fn format_counts(&self, counts: &UpdateCounts) -> String {
        if counts.is_empty() {
            return "No changes".to_string();
        }
        let mut table = Table::new();
        table.set_header(vec!["Counter", "Count"]);
        for line in counts.summary() {
            if let Some((count, label)) = line.split_once(' ') {
                table.add_row(vec![label, count]);
            }
        }
        table.to_string()
    }

    fn format_source_report(&self, report: &SourceReport) -> String {
        source_lines(report).join("\n")
    }

    fn format_schema(&self, classes: &[ClassDefinition]) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Class", "Superclasses", "Attributes"]);
        for class in classes {
            table.add_row(vec![
                Cell::new(&class.name),
                Cell::new(class.superclasses.join(", ")),
                Cell::new(class.attributes.len()),
            ]);
        }
        table.to_string()
    }

    fn format_class(&self, class: &ClassDefinition) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Attribute", "Type", "Flags", "Declared in"]);
        for attribute in &class.attributes {
            table.add_row(vec![
                attribute.name.clone(),
                attribute.type_label(),
                attribute_flags(attribute),
                attribute.declared_in.clone(),
            ]);
        }
        format!("class {}\n{}", class.name, table)
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl JsonFormatter {
    fn render(value: serde_json::Value) -> String {
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "null".to_string())
    }
}

impl Formatter for JsonFormatter {
    fn format_retrieve(&self, result: &RetrieveResult) -> String {
        let rows = result
            .rows
            .iter()
            .map(|row| {
                let object = row
                    .values
                    .iter()
                    .map(|v| (column_name(v), v.value.to_json()))
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(object)
            })
            .collect();
        Self::render(serde_json::Value::Array(rows))
    }

    fn format_counts(&self, counts: &UpdateCounts) -> String {
        Self::render(serde_json::to_value(counts).unwrap_or_default())
    }

    fn format_source_report(&self, report: &SourceReport) -> String {
        let failures: Vec<_> = report
            .failures
            .iter()
            .map(|f| json!({"path": f.path, "statement": f.statement, "message": f.message}))
            .collect();
        Self::render(json!({
            "path": report.path,
            "executed": report.executed,
            "failures": failures,
        }))
    }

    fn format_schema(&self, classes: &[ClassDefinition]) -> String {
        let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
        Self::render(json!({ "classes": names }))
    }

    fn format_class(&self, class: &ClassDefinition) -> String {
        let attributes: Vec<_> = class
            .attributes
            .iter()
            .map(|a| {
                json!({
                    "name": a.name,
                    "type": a.type_label(),
                    "required": a.required,
                    "declared_in": a.declared_in,
                })
            })
            .collect();
        Self::render(json!({
            "name": class.name,
            "comment": class.comment,
            "superclasses": class.superclasses,
            "subclasses": class.subclasses,
            "attributes": attributes,
        }))
    }

    fn format_error(&self, error: &str) -> String {
        json!({ "error": error }).to_string()
    }

    fn format_message(&self, message: &str) -> String {
        json!({ "message": message }).to_string()
    }
}
