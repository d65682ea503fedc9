//! Generate a typed configuration module from an envgen declaration file.
//!
//! ```
//! use envgen_codegen::{SynthOptions, generate};
//!
//! let declarations = envgen::parse_str("APP_DB__PORT=5432\n").unwrap();
//! let source = generate(&declarations, Some("APP"), &SynthOptions::default()).unwrap();
//! assert!(source.contains("pub const DB_PORT_ENV_NAME: &str = \"APP_DB__PORT\";"));
//! ```

pub mod config_gen;
pub mod format;
pub mod naming;
pub mod tree;

use std::path::Path;

use envgen::{Declaration, Error, load_file};

pub use config_gen::{GENERATED_HEADER, GeneratedUnit, SynthOptions, synthesize};
pub use format::format_source;
pub use tree::{ConfigForest, ConfigNode, LeafInfo, NodeKind, build_forest, normalize_prefix};

/// Build, synthesize and format the module for `declarations`.
pub fn generate(declarations: &[Declaration], prefix: Option<&str>, options: &SynthOptions) -> Result<String, Error> {
    let forest = build_forest(declarations, prefix)?;
    synthesize(&forest, options)?.render()
}

/// Load a declaration file and generate its module.
pub fn generate_file(path: impl AsRef<Path>, prefix: Option<&str>, options: &SynthOptions) -> Result<String, Error> {
    let path = path.as_ref();
    let declarations = load_file(path)?;
    generate(&declarations, prefix, options).map_err(|err| err.in_source(path.display().to_string()))
}
