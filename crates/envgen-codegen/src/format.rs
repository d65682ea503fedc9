//! Pretty-printing generated token streams.

use envgen::Error;
use tracing::error;

/// Parse `raw` as a Rust file and pretty-print it.
///
/// Text that does not parse is returned inside [`Error::render`] so the
/// caller can show what was produced.
pub fn format_source(raw: &str) -> Result<String, Error> {
    match syn::parse_file(raw) {
        Ok(file) => Ok(prettyplease::unparse(&file)),
        Err(err) => {
            error!(%err, "generated code does not parse");
            Err(Error::render(err.to_string(), raw))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::format_source;

    #[test]
    fn formats_valid_source() {
        let formatted = format_source("pub const A : & str = \"A\" ;").unwrap();
        assert_eq!(formatted, "pub const A: &str = \"A\";\n");
    }

    #[test]
    fn unparsable_source_keeps_the_raw_text() {
        let err = format_source("pub fn broken(").unwrap_err();
        assert_eq!(err.raw_output(), Some("pub fn broken("));
    }
}
