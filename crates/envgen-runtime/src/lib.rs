//! Runtime support for envgen: typed values, type inference and the variable registry.
//!
//! Code produced by `envgen-codegen` depends only on this crate.

pub mod convert;
pub mod env;
pub mod error;
pub mod infer;
pub mod registry;
pub mod types;

pub use convert::{FromValue, convert_value};
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use error::{EnvError, InferError};
pub use infer::{format_duration, infer, parse_as, parse_duration};
pub use registry::{DUMP_FLAG, RegisteredVariable, Registry, RegistryState, Var, dump_requested};
pub use types::{Kind, Value};

// Generated code names URL types through this re-export.
pub use url;

/// Parse the global registry. When an override does not convert, the error is
/// printed to stderr and the process exits with status 2.
pub fn parse() {
    if let Err(err) = Registry::global().parse() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
