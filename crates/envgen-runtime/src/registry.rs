//! The typed variable registry.
//!
//! A [`Registry`] moves through a small lifecycle: variables are declared with
//! their defaults, [`Registry::parse`] overlays environment overrides once, and
//! the resolved values are read back through typed [`Var`] handles. When dump
//! mode is on, `parse` prints every variable and terminates the process instead
//! of returning.
//!
//! [`Registry::global`] is shared process-wide state. Registering variables from
//! several threads at once is not supported; tests should build their own
//! instance with [`Registry::new`].

use std::fmt;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::time::Duration;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, error, trace};
use url::Url;

use crate::convert::{FromValue, convert_value};
use crate::env::{EnvSource, ProcessEnv};
use crate::error::EnvError;
use crate::infer::parse_as;
use crate::types::{Kind, Value};

/// Command-line switch that turns on dump mode for the global registry.
pub const DUMP_FLAG: &str = "env";

static GLOBAL: Lazy<Mutex<Registry>> =
    Lazy::new(|| Mutex::new(Registry::new().with_dump(dump_requested(std::env::args()))));

/// Returns true when the arguments (program name first) contain the dump switch.
pub fn dump_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter().skip(1).any(|arg| {
        let arg = arg.as_ref();
        let flag = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-'));
        matches!(flag, Some(flag) if flag == DUMP_FLAG || flag.strip_suffix("=true") == Some(DUMP_FLAG))
    })
}

/// A variable owned by a [`Registry`].
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredVariable {
    name: String,
    value: Value,
    default: String,
}

impl RegisteredVariable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn kind(&self) -> Kind {
        self.value.kind()
    }

    /// The default as it was rendered at declaration time.
    pub fn default_text(&self) -> &str {
        &self.default
    }

    fn set(&mut self, text: &str) -> Result<(), EnvError> {
        // An empty override keeps a list default intact.
        if self.kind() == Kind::StringList && text.is_empty() {
            return Ok(());
        }
        self.value = parse_as(self.kind(), text).map_err(|err| EnvError::conversion(&self.name, err))?;
        Ok(())
    }
}

/// Typed handle to a registered variable.
pub struct Var<T> {
    name: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Var<T> {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Clone for Var<T> {
    fn clone(&self) -> Self {
        Self::new(&self.name)
    }
}

impl<T> fmt::Debug for Var<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Var").field(&self.name).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistryState {
    #[default]
    Declaring,
    Parsed,
}

#[derive(Debug, Default)]
pub struct Registry {
    vars: IndexMap<String, RegisteredVariable>,
    dump: bool,
    state: RegistryState,
}

impl Registry {
    /// An empty registry, independent of the global one.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the process-wide registry.
    pub fn global() -> MutexGuard<'static, Registry> {
        GLOBAL.lock()
    }

    pub fn with_dump(mut self, dump: bool) -> Self {
        self.dump = dump;
        self
    }

    pub fn set_dump(&mut self, dump: bool) {
        self.dump = dump;
    }

    pub fn dump_enabled(&self) -> bool {
        self.dump
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Register `name` with `default` and return a typed handle to it.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered.
    pub fn var<T: FromValue>(&mut self, name: &str, default: impl Into<Value>) -> Var<T> {
        let value = default.into();
        if self.vars.contains_key(name) {
            let msg = format!("variable redefined: {name}");
            error!(name, "{msg}");
            panic!("{msg}");
        }
        trace!(name, kind = %value.kind(), default = %value, "registering variable");
        let variable = RegisteredVariable {
            name: name.to_string(),
            default: value.render(),
            value,
        };
        self.vars.insert(name.to_string(), variable);
        Var::new(name)
    }

    pub fn int_var(&mut self, name: &str, default: i64) -> Var<i64> {
        self.var(name, Value::Int(default))
    }

    pub fn uint_var(&mut self, name: &str, default: u64) -> Var<u64> {
        self.var(name, Value::Uint(default))
    }

    pub fn float_var(&mut self, name: &str, default: f64) -> Var<f64> {
        self.var(name, Value::Float(default))
    }

    pub fn bool_var(&mut self, name: &str, default: bool) -> Var<bool> {
        self.var(name, Value::Bool(default))
    }

    pub fn duration_var(&mut self, name: &str, default: Duration) -> Var<Duration> {
        self.var(name, Value::Duration(default))
    }

    pub fn url_var(&mut self, name: &str, default: Option<Url>) -> Var<Option<Url>> {
        self.var(name, Value::Url(default))
    }

    pub fn string_var(&mut self, name: &str, default: impl Into<String>) -> Var<String> {
        self.var(name, Value::String(default.into()))
    }

    pub fn strings_var(&mut self, name: &str, default: Vec<String>) -> Var<Vec<String>> {
        self.var(name, Value::StringList(default))
    }

    /// Register a dynamically typed value; its kind is whatever `default` carries.
    pub fn value_var(&mut self, name: &str, default: Value) -> Var<Value> {
        self.var(name, default)
    }

    /// Overlay overrides from the process environment.
    pub fn parse(&mut self) -> Result<(), EnvError> {
        self.parse_with(&ProcessEnv)
    }

    /// Overlay overrides from `env` onto the declared defaults.
    ///
    /// Variables without an override keep their default. The first override
    /// that fails to convert aborts the parse. In dump mode the resolved
    /// variables are printed to stdout and the process exits with status 0.
    pub fn parse_with(&mut self, env: &dyn EnvSource) -> Result<(), EnvError> {
        for variable in self.vars.values_mut() {
            let Some(text) = env.lookup(&variable.name) else {
                continue;
            };
            trace!(name = %variable.name, value = %text, "applying override");
            variable.set(&text)?;
        }
        self.state = RegistryState::Parsed;
        debug!(count = self.vars.len(), "parsed environment variables");

        if self.dump {
            let stdout = io::stdout();
            if let Err(err) = self.dump_to(&mut stdout.lock()) {
                error!("failed to dump environment variables: {err}");
            }
            std::process::exit(0);
        }
        Ok(())
    }

    /// Set a single variable from text, using its declared kind.
    pub fn set(&mut self, name: &str, text: &str) -> Result<(), EnvError> {
        self.vars
            .get_mut(name)
            .ok_or_else(|| EnvError::unknown(name))?
            .set(text)
    }

    pub fn get<T: FromValue>(&self, var: &Var<T>) -> Result<T, EnvError> {
        let value = self.lookup(var.name()).ok_or_else(|| EnvError::unknown(var.name()))?;
        convert_value(value, var.name())
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.vars.get(name).map(RegisteredVariable::value)
    }

    pub fn variable(&self, name: &str) -> Option<&RegisteredVariable> {
        self.vars.get(name)
    }

    /// Visit every registered variable. Callers should not depend on the order.
    pub fn visit_all<F: FnMut(&RegisteredVariable)>(&self, mut visit: F) {
        for variable in self.vars.values() {
            visit(variable);
        }
    }

    /// Write every variable as `NAME="value"`, falling back to the default when the value renders empty.
    pub fn dump_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for variable in self.vars.values() {
            let rendered = variable.value.render();
            let shown = if rendered.is_empty() { variable.default.as_str() } else { rendered.as_str() };
            writeln!(w, "{}=\"{}\"", variable.name, shown)?;
        }
        Ok(())
    }
}
