//! Environment variable declaration files with inferred types.
//!
//! Declarations are parsed with [`parse_str`] or [`load_file`] and can be
//! registered directly in a [`Registry`] with [`register_declarations`], or
//! handed to `envgen-codegen` to generate a typed configuration module.

pub mod error;
pub mod loader;
pub mod parser;

pub use envgen_runtime as runtime;
pub use envgen_runtime::{EnvError, EnvSource, Kind, MapEnv, ProcessEnv, Registry, Value, Var, infer};
pub use error::{Error, ErrorKind};
pub use loader::{load_file, load_raw_file};
pub use parser::{Declaration, parse_line, parse_raw, parse_str, strip_quotes};

/// Register every declaration in `registry`, using its inferred value as the default.
///
/// # Panics
///
/// Panics if a declaration's name is already registered.
pub fn register_declarations(registry: &mut Registry, declarations: &[Declaration]) -> Vec<Var<Value>> {
    declarations
        .iter()
        .map(|decl| registry.value_var(&decl.name, decl.value.clone()))
        .collect()
}
