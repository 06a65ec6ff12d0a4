//! Rendering of string scalars for splicing into existing YAML.

/// Quoting style of a single-line scalar as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
}

/// Whether a scalar is written inside a flow collection (`{...}` or `[...]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Block,
    Flow,
}

/// Characters that end or split a plain scalar inside a flow collection.
const FLOW_INDICATORS: &[char] = &[',', '[', ']', '{', '}', ':', '#'];

/// Renders `value` as a single-line scalar.
///
/// A quoted `style` is kept whenever it can represent the value. Otherwise the
/// value is written plain if it reads back as the same string, and double
/// quoted if it does not.
pub fn render(value: &str, style: Option<ScalarStyle>, context: Context) -> String {
    match style {
        Some(ScalarStyle::DoubleQuoted) => double_quoted(value),
        Some(ScalarStyle::SingleQuoted) if !value.chars().any(char::is_control) => {
            single_quoted(value)
        }
        _ if is_plain_safe(value, context) => value.to_string(),
        _ => double_quoted(value),
    }
}

/// Reports whether `value` can be written without quotes.
fn is_plain_safe(value: &str, context: Context) -> bool {
    if context == Context::Flow && value.contains(FLOW_INDICATORS) {
        return false;
    }
    match serde_yaml::to_string(value) {
        Ok(rendered) => rendered.strip_suffix('\n') == Some(value),
        Err(_) => false,
    }
}

fn single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

// JSON string escapes are a subset of YAML double-quoted escapes.
fn double_quoted(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}
