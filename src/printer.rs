//! Text rendering of a decoded tree.
//!
//! The printer only reads the tree. Formatting policy lives in
//! [PrinterSettings]: indentation, the assignment token, float precision and
//! which attribute hides a field.

use crate::tree::{FieldNode, PrimitiveValue, StructNode};

/// Formatting options for [TextPrinter].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterSettings {
    /// Repeated once per nesting level.
    pub spacer: String,
    /// Placed between a field's name and its value.
    pub assignment: String,
    /// Digits after the point for non-integral floats, before trailing zeros
    /// are trimmed.
    pub float_precision: usize,
    /// Fields carrying this attribute are decoded but not printed.
    pub hide_attribute: Option<String>,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            spacer: "\t".to_string(),
            assignment: " = ".to_string(),
            float_precision: 3,
            hide_attribute: Some("hide".to_string()),
        }
    }
}

impl PrinterSettings {
    pub fn set_spacer(&mut self, spacer: impl Into<String>) -> &mut Self {
        self.spacer = spacer.into();
        self
    }

    pub fn set_assignment(&mut self, assignment: impl Into<String>) -> &mut Self {
        self.assignment = assignment.into();
        self
    }

    pub fn set_float_precision(&mut self, float_precision: usize) -> &mut Self {
        self.float_precision = float_precision;
        self
    }

    /// `None` prints every field.
    pub fn set_hide_attribute(&mut self, hide_attribute: Option<String>) -> &mut Self {
        self.hide_attribute = hide_attribute;
        self
    }
}

/// Renders a [StructNode] in the schema-like text form:
///
/// ```text
/// Main {
///     uint8 count = 2;
///     uint8 values[2] = [
///         10,
///         20
///     ];
/// };
/// ```
pub struct TextPrinter<'a> {
    root: &'a StructNode,
    settings: PrinterSettings,
}

impl<'a> TextPrinter<'a> {
    pub fn new(root: &'a StructNode) -> Self {
        Self {
            root,
            settings: PrinterSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: PrinterSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn print(&self) -> String {
        let mut out = String::new();
        self.print_struct(&mut out, self.root, 0);
        out
    }

    fn indent(&self, depth: usize) -> String {
        self.settings.spacer.repeat(depth)
    }

    fn is_hidden(&self, node: &FieldNode) -> bool {
        self.settings
            .hide_attribute
            .as_deref()
            .is_some_and(|hide| node.attributes().contains(hide))
    }

    fn print_struct(&self, out: &mut String, node: &StructNode, depth: usize) {
        let t = self.indent(depth);
        out.push_str(&format!("{t}{} {{\n", node.type_name));
        self.print_children(out, node, depth + 1);
        out.push_str(&format!("{t}}};\n"));
    }

    fn print_children(&self, out: &mut String, node: &StructNode, depth: usize) {
        for child in node.children.iter().filter(|c| !self.is_hidden(c)) {
            self.print_field(out, child, depth);
        }
    }

    fn print_field(&self, out: &mut String, node: &FieldNode, depth: usize) {
        let t = self.indent(depth);
        let s = &self.settings.spacer;
        let assign = &self.settings.assignment;

        match node {
            FieldNode::SinglePrimitive {
                data_type,
                name,
                value,
                ..
            } => {
                let value = self.format_value(value);
                out.push_str(&format!("{t}{data_type} {name}{assign}{value};\n"));
            }
            FieldNode::ArrayPrimitive {
                data_type,
                name,
                values,
                ..
            } => {
                let separator = format!(",\n{t}{s}");
                let items = values
                    .iter()
                    .map(|v| self.format_value(v))
                    .collect::<Vec<_>>()
                    .join(&separator);
                out.push_str(&format!(
                    "{t}{data_type} {name}[{}]{assign}[\n{t}{s}{items}\n{t}];\n",
                    values.len()
                ));
            }
            FieldNode::SingleStruct {
                type_name,
                name,
                value,
                ..
            } => {
                out.push_str(&format!("{t}{type_name} {name}{assign}{{\n"));
                self.print_children(out, value, depth + 1);
                out.push_str(&format!("{t}}};\n"));
            }
            FieldNode::ArrayStruct {
                type_name,
                name,
                values,
                ..
            } => {
                out.push_str(&format!(
                    "{t}{type_name} {name}[{}]{assign}[\n",
                    values.len()
                ));
                for value in values {
                    self.print_struct(out, value, depth + 1);
                }
                out.push_str(&format!("{t}];\n"));
            }
        }
    }

    fn format_value(&self, value: &PrimitiveValue) -> String {
        match value {
            PrimitiveValue::Float(v) => format_float(*v, self.settings.float_precision),
            other => other.to_string(),
        }
    }
}

/// Integral floats print without a fraction; others are fixed to `precision`
/// digits with trailing zeros removed, keeping at least one.
fn format_float(v: f64, precision: usize) -> String {
    if !v.is_finite() || v.fract() == 0.0 {
        return v.to_string();
    }

    let mut s = format!("{v:.precision$}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').len();
        s.truncate(trimmed);
        if s.ends_with('.') {
            s.push('0');
        }
    }

    s
}
