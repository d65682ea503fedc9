//! Declaration file parsing.
//!
//! Each non-blank, non-comment line must have the shape
//! `[export] NAME=VALUE` or `NAME: VALUE`. Values may be single or double
//! quoted; an unquoted value runs until a `#` comment or the end of the line.
//! Nothing inside a value is interpolated.

use std::collections::HashSet;

use envgen_runtime::{Value, infer};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::error::{Error, ErrorKind};

static LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^\s*(?:export\s+)?([A-Za-z0-9_.]+)(?:\s*=\s*|:\s+)('(?:\\'|[^'])*'|"(?:\\"|[^"])*"|[^#\n]+)?\s*(?:#.*)?$"#,
    )
    .expect("declaration line pattern is valid")
});

/// One `NAME=VALUE` line with its inferred value.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    /// The value text after quote stripping.
    pub raw: String,
    pub value: Value,
    /// 1-based source line.
    pub line: usize,
}

/// Split a single line into name and raw value.
///
/// Returns `Ok(None)` for blank lines and comments. A rejected line comes back
/// as [`ErrorKind::Format`] without a line number; callers attach one.
pub fn parse_line(line: &str) -> Result<Option<(String, String)>, Error> {
    let Some(caps) = LINE.captures(line) else {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        return Err(Error::format(line));
    };
    let name = caps[1].to_string();
    let value = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    Ok(Some((name, strip_quotes(value.trim_end()).to_string())))
}

/// Remove exactly one pair of matching outer quotes.
pub fn strip_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(&open), Some(&close)) if value.len() >= 2 && open == close && (open == b'\'' || open == b'"') => {
            &value[1..value.len() - 1]
        }
        _ => value,
    }
}

fn for_each_line(
    contents: &str,
    mut visit: impl FnMut(usize, String, String) -> Result<(), Error>,
) -> Result<(), Error> {
    let mut seen = HashSet::new();
    for (index, line) in contents.lines().enumerate() {
        let line_no = index + 1;
        let Some((name, raw)) = parse_line(line).map_err(|err| err.at_line(line_no))? else {
            continue;
        };
        if !seen.insert(name.clone()) {
            return Err(Error::duplicate(line_no, name));
        }
        trace!(line = line_no, %name, %raw, "declaration");
        visit(line_no, name, raw)?;
    }
    Ok(())
}

/// Parse declarations and infer a typed value for each.
pub fn parse_str(contents: &str) -> Result<Vec<Declaration>, Error> {
    let mut declarations = Vec::new();
    for_each_line(contents, |line, name, raw| {
        let value = infer(&raw).map_err(|err| Error::infer(line, err))?;
        declarations.push(Declaration { name, raw, value, line });
        Ok(())
    })?;
    debug!(count = declarations.len(), "parsed declarations");
    Ok(declarations)
}

/// Parse declarations without type inference, keeping the raw text.
pub fn parse_raw(contents: &str) -> Result<IndexMap<String, String>, Error> {
    let mut vars = IndexMap::new();
    for_each_line(contents, |_, name, raw| {
        vars.insert(name, raw);
        Ok(())
    })?;
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_the_supported_line_shapes() {
        assert_eq!(parse_line("A=1").unwrap(), Some(("A".into(), "1".into())));
        assert_eq!(parse_line("  export B = two ").unwrap(), Some(("B".into(), "two".into())));
        assert_eq!(parse_line("C: three").unwrap(), Some(("C".into(), "three".into())));
        assert_eq!(parse_line("app.name=svc").unwrap(), Some(("app.name".into(), "svc".into())));
        assert_eq!(parse_line("EMPTY=").unwrap(), Some(("EMPTY".into(), String::new())));
    }

    #[test]
    fn trailing_comment_is_dropped_outside_quotes() {
        assert_eq!(parse_line("A=foo # note").unwrap(), Some(("A".into(), "foo".into())));
        assert_eq!(parse_line("A=\"foo # kept\"").unwrap(), Some(("A".into(), "foo # kept".into())));
    }

    #[test]
    fn quotes_lose_only_the_outer_pair() {
        assert_eq!(parse_line("A='x'").unwrap(), Some(("A".into(), "x".into())));
        assert_eq!(parse_line(r#"A="say \"hi\"""#).unwrap(), Some(("A".into(), r#"say \"hi\""#.into())));
        assert_eq!(parse_line("A='it\\'s'").unwrap(), Some(("A".into(), "it\\'s".into())));
        assert_eq!(parse_line("A=\"${HOME}\"").unwrap(), Some(("A".into(), "${HOME}".into())));
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# A=1").unwrap(), None);
    }

    #[test]
    fn malformed_lines_are_rejected_verbatim() {
        for line in ["NOT A DECLARATION", "A:b"] {
            let err = parse_line(line).unwrap_err();
            assert_eq!(err.line, None);
            assert!(matches!(err.kind, ErrorKind::Format { line: ref rejected } if rejected == line));
        }
    }

    #[test]
    fn strip_quotes_needs_a_matching_pair() {
        assert_eq!(strip_quotes("'x\""), "'x\"");
        assert_eq!(strip_quotes("\""), "\"");
        assert_eq!(strip_quotes("''"), "");
    }
}
