//! Loading declaration files from disk.

use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::Error;
use crate::parser::{Declaration, parse_raw, parse_str};

fn read(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|err| Error::from(err).in_source(path.display().to_string()))
}

/// Load a declaration file and infer every value.
pub fn load_file(path: impl AsRef<Path>) -> Result<Vec<Declaration>, Error> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading declarations");
    let contents = read(path)?;
    parse_str(&contents).map_err(|err| err.in_source(path.display().to_string()))
}

/// Load a declaration file keeping the raw values.
pub fn load_raw_file(path: impl AsRef<Path>) -> Result<IndexMap<String, String>, Error> {
    let path = path.as_ref();
    let contents = read(path)?;
    parse_raw(&contents).map_err(|err| err.in_source(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{load_file, load_raw_file};
    use crate::error::ErrorKind;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_single_file() {
        let file = write_temp("A=1\n# comment\nB=two\n");
        let declarations = load_file(file.path()).unwrap();
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[1].name, "B");
        assert_eq!(declarations[1].line, 3);
    }

    #[test]
    fn raw_load_skips_inference() {
        let file = write_temp("PORT=5432\n");
        let vars = load_raw_file(file.path()).unwrap();
        assert_eq!(vars.get("PORT").map(String::as_str), Some("5432"));
    }

    #[test]
    fn errors_carry_the_path() {
        let file = write_temp("A=1\nA=2\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Duplicate { .. }));
        assert_eq!(err.line, Some(2));
        assert_eq!(err.source_name.as_deref(), Some(file.path().display().to_string().as_str()));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_file("/definitely/not/here.env").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Io(_)));
    }
}
