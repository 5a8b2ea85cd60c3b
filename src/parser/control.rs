//! Recognition of `SET` / `DEFINE` / `UNSET` control directives.
//!
//! This module only classifies and decomposes directives; their effects on
//! the context, resolver, and graph are applied by the compiler driver.

use std::sync::LazyLock;

use regex::Regex;

use crate::parser::scan::{Cursor, ParseIssue};

static SET_DOCUMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^SET\s+DOCUMENT\s+(\w+)\s*=\s*(.+)$").expect("static regex")
});
static DEFINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^DEFINE\s+(NAMESPACE|ANNOTATION)\s+(\w+)\s+AS\s+(URL|PATTERN|LIST)\s+(.+)$")
        .expect("static regex")
});
static SET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^SET\s+([^\s=]+)\s*=\s*(.+)$").expect("static regex"));
static UNSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^UNSET\s+(.+)$").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefineSpec {
    Url(String),
    Pattern(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsetTarget {
    All,
    Keys(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    SetDocument { key: String, value: String },
    DefineNamespace { keyword: String, spec: DefineSpec },
    DefineAnnotation { keyword: String, spec: DefineSpec },
    SetCitation { parts: Vec<String> },
    SetEvidence { text: String, legacy: bool },
    SetStatementGroup { name: String },
    SetAnnotation { key: String, values: Vec<String> },
    Unset { target: UnsetTarget },
}

/// Classification failure. Malformed `DEFINE` directives abort compilation;
/// everything else degrades to a recoverable warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    MalformedDefine { message: String },
    Recoverable(ParseIssue),
}

/// Decompose a logical line into a directive, or `None` when the line is a
/// BEL statement.
pub fn classify(line: &str) -> Result<Option<Directive>, ControlError> {
    if let Some(captures) = SET_DOCUMENT.captures(line) {
        let key = captures[1].to_string();
        let value = scalar_value(&captures[2])
            .map_err(ControlError::Recoverable)?;
        return Ok(Some(Directive::SetDocument { key, value }));
    }

    if let Some(captures) = DEFINE.captures(line) {
        let keyword = captures[2].to_string();
        let spec = define_spec(&captures[3], &captures[4])?;
        let directive = match &captures[1] {
            "NAMESPACE" => Directive::DefineNamespace { keyword, spec },
            _ => Directive::DefineAnnotation { keyword, spec },
        };
        return Ok(Some(directive));
    }
    if line.starts_with("DEFINE") {
        return Err(ControlError::MalformedDefine {
            message: format!("unrecognized DEFINE directive: {line}"),
        });
    }

    if let Some(captures) = SET.captures(line) {
        let key = captures[1].to_string();
        let raw = captures[2].trim();
        let directive = match key.as_str() {
            "Citation" => Directive::SetCitation {
                parts: braced_value(raw).map_err(ControlError::Recoverable)?,
            },
            "Evidence" | "SupportingText" => Directive::SetEvidence {
                text: scalar_value(raw).map_err(ControlError::Recoverable)?,
                legacy: key == "SupportingText",
            },
            "STATEMENT_GROUP" => Directive::SetStatementGroup {
                name: scalar_value(raw).map_err(ControlError::Recoverable)?,
            },
            _ => Directive::SetAnnotation {
                key,
                values: annotation_values(raw).map_err(ControlError::Recoverable)?,
            },
        };
        return Ok(Some(directive));
    }
    if line.starts_with("SET ") || line == "SET" {
        return Err(ControlError::Recoverable(ParseIssue::syntax(format!(
            "unrecognized SET directive: {line}"
        ))));
    }

    if let Some(captures) = UNSET.captures(line) {
        let raw = captures[1].trim();
        let target = if raw == "ALL" {
            UnsetTarget::All
        } else if raw.starts_with('{') {
            let mut cursor = Cursor::new(raw);
            let keys = cursor.braced_list().map_err(ControlError::Recoverable)?;
            UnsetTarget::Keys(keys)
        } else {
            let key = scalar_value(raw).map_err(ControlError::Recoverable)?;
            UnsetTarget::Keys(vec![key])
        };
        return Ok(Some(Directive::Unset { target }));
    }
    if line.starts_with("UNSET") {
        return Err(ControlError::Recoverable(ParseIssue::syntax(format!(
            "unrecognized UNSET directive: {line}"
        ))));
    }

    Ok(None)
}

/// A quoted string, or the bare remainder of the line.
fn scalar_value(raw: &str) -> Result<String, ParseIssue> {
    let raw = raw.trim();
    if raw.starts_with('"') {
        let mut cursor = Cursor::new(raw);
        let value = cursor.quoted_string()?;
        cursor.skip_ws();
        if !cursor.is_at_end() {
            return Err(ParseIssue::syntax(format!(
                "unexpected trailing content \"{}\"",
                cursor.excerpt()
            )));
        }
        return Ok(value);
    }
    Ok(raw.to_string())
}

fn braced_value(raw: &str) -> Result<Vec<String>, ParseIssue> {
    let mut cursor = Cursor::new(raw);
    let items = cursor.braced_list()?;
    cursor.skip_ws();
    if !cursor.is_at_end() {
        return Err(ParseIssue::syntax(format!(
            "unexpected trailing content \"{}\"",
            cursor.excerpt()
        )));
    }
    Ok(items)
}

/// A scalar annotation value or a `{...}` value set.
fn annotation_values(raw: &str) -> Result<Vec<String>, ParseIssue> {
    if raw.trim_start().starts_with('{') {
        braced_value(raw)
    } else {
        Ok(vec![scalar_value(raw)?])
    }
}

fn define_spec(form: &str, raw: &str) -> Result<DefineSpec, ControlError> {
    let malformed = |issue: ParseIssue| ControlError::MalformedDefine {
        message: issue.message,
    };
    match form {
        "URL" => Ok(DefineSpec::Url(
            quoted_only(raw).map_err(malformed)?,
        )),
        "PATTERN" => Ok(DefineSpec::Pattern(
            quoted_only(raw).map_err(malformed)?,
        )),
        _ => Ok(DefineSpec::List(braced_value(raw).map_err(malformed)?)),
    }
}

fn quoted_only(raw: &str) -> Result<String, ParseIssue> {
    let raw = raw.trim();
    if !raw.starts_with('"') {
        return Err(ParseIssue::syntax(format!(
            "expected a quoted value, found \"{raw}\""
        )));
    }
    scalar_value(raw)
}
