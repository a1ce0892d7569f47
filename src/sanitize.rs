//! Input normalization for metadata values.
//!
//! [`sanitize_text_field`] reproduces the host platform's plain-text
//! sanitizer: markup is stripped, whitespace collapsed, percent-encoded octets
//! removed. [`unslash`] undoes the host's default input escaping for
//! structured values.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*?>.*?</script>").expect("valid regex"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*?>.*?</style>").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("valid regex"));
static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").expect("valid regex"));
static PERCENT_OCTET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)%[a-f0-9]{2}").expect("valid regex"));

/// Encode every `<` that cannot open a tag (no `>` before the next `<` or
/// the end of input) so that tag stripping leaves it alone.
fn escape_lone_less_than(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 1..];
        let closes = match (tail.find('>'), tail.find('<')) {
            (Some(gt), Some(lt)) => gt < lt,
            (Some(_), None) => true,
            (None, _) => false,
        };
        out.push_str(if closes { "<" } else { "&lt;" });
        rest = tail;
    }
    out.push_str(rest);
    out
}

fn strip_all_tags(input: &str) -> String {
    let without_blocks = SCRIPT_BLOCK.replace_all(input, "");
    let without_blocks = STYLE_BLOCK.replace_all(&without_blocks, "");
    TAG.replace_all(&without_blocks, "").trim().to_string()
}

/// Sanitize a string as single-line plain text.
///
/// ```
/// use videometa::sanitize::sanitize_text_field;
///
/// assert_eq!(sanitize_text_field("<b>abc</b>"), "abc");
/// assert_eq!(sanitize_text_field("  12\n 0  "), "12 0");
/// ```
pub fn sanitize_text_field(input: &str) -> String {
    let mut filtered = if input.contains('<') {
        let escaped = escape_lone_less_than(input);
        strip_all_tags(&escaped).replace("<\n", "&lt;\n")
    } else {
        input.to_string()
    };

    filtered = WHITESPACE_RUN.replace_all(&filtered, " ").trim().to_string();

    let mut found = false;
    while PERCENT_OCTET.is_match(&filtered) {
        filtered = PERCENT_OCTET.replace_all(&filtered, "").into_owned();
        found = true;
    }
    if found {
        filtered = SPACE_RUN.replace_all(filtered.trim(), " ").into_owned();
    }

    filtered
}

/// Sanitize an arbitrary JSON value as plain text.
///
/// Scalars are stringified first; arrays and objects have no plain-text form
/// and become empty.
pub fn sanitize_text_value(value: &Value) -> String {
    match value {
        Value::String(s) => sanitize_text_field(s),
        Value::Number(n) => sanitize_text_field(&n.to_string()),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Remove one level of backslash escaping from a string (`\x` -> `x`,
/// `\\` -> `\`).
pub fn unslash_str(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Recursively unslash every string value inside a JSON value. Object keys
/// are left as they are.
pub fn unslash(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(unslash_str(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(unslash).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, unslash(v)))
                .collect(),
        ),
        other => other,
    }
}
