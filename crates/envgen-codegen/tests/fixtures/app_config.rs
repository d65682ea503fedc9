// @generated by envgen. Do not edit.

use envgen_runtime::{EnvError, EnvSource, ProcessEnv, Registry};
pub const NAME_ENV_NAME: &str = "APP_NAME";
pub const DEBUG_ENV_NAME: &str = "APP_DEBUG";
pub const DB_HOST_ENV_NAME: &str = "APP_DB__HOST";
pub const DB_PORT_ENV_NAME: &str = "APP_DB__PORT";
pub const DB_POOL_TIMEOUT_ENV_NAME: &str = "APP_DB__POOL__TIMEOUT";
pub const DB_POOL_MAX_SIZE_ENV_NAME: &str = "APP_DB__POOL__MAX_SIZE";
pub const RATIO_ENV_NAME: &str = "APP_RATIO";
pub const MAX_BYTES_ENV_NAME: &str = "APP_MAX_BYTES";
pub const ENDPOINT_ENV_NAME: &str = "APP_ENDPOINT";
pub const TYPE_ENV_NAME: &str = "APP_TYPE";
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub name: ::std::string::String,
    pub debug: bool,
    pub db: Db,
    pub ratio: f64,
    pub max_bytes: u64,
    pub endpoint: ::core::option::Option<envgen_runtime::url::Url>,
    pub r#type: ::std::string::String,
}
#[derive(Debug, Clone, PartialEq)]
pub struct Db {
    pub host: ::std::string::String,
    pub port: i64,
    pub pool: DbPool,
}
#[derive(Debug, Clone, PartialEq)]
pub struct DbPool {
    pub timeout: ::std::time::Duration,
    pub max_size: i64,
}
/// Parse the configuration from the process environment into the global registry.
pub fn parse() -> ::core::result::Result<Config, EnvError> {
    parse_from(&mut Registry::global(), &ProcessEnv)
}
/// Register every variable in `registry`, apply overrides from `env` and
/// check that no non-bool field is left empty.
pub fn parse_from(
    registry: &mut Registry,
    env: &dyn EnvSource,
) -> ::core::result::Result<Config, EnvError> {
    let name_var = registry.string_var(NAME_ENV_NAME, "svc");
    let debug_var = registry.bool_var(DEBUG_ENV_NAME, false);
    let db_host_var = registry.string_var(DB_HOST_ENV_NAME, "localhost");
    let db_port_var = registry.int_var(DB_PORT_ENV_NAME, 5432);
    let db_pool_timeout_var = registry
        .duration_var(
            DB_POOL_TIMEOUT_ENV_NAME,
            ::std::time::Duration::from_secs(9900),
        );
    let db_pool_max_size_var = registry.int_var(DB_POOL_MAX_SIZE_ENV_NAME, 10);
    let ratio_var = registry.float_var(RATIO_ENV_NAME, 0.75);
    let max_bytes_var = registry.uint_var(MAX_BYTES_ENV_NAME, 18446744073709551615);
    let endpoint_var = registry
        .url_var(
            ENDPOINT_ENV_NAME,
            envgen_runtime::url::Url::parse("https://api.example.com/v1").ok(),
        );
    let type_var = registry.string_var(TYPE_ENV_NAME, "worker");
    registry.parse_with(env)?;
    let cfg = Config {
        name: registry.get(&name_var)?,
        debug: registry.get(&debug_var)?,
        db: Db {
            host: registry.get(&db_host_var)?,
            port: registry.get(&db_port_var)?,
            pool: DbPool {
                timeout: registry.get(&db_pool_timeout_var)?,
                max_size: registry.get(&db_pool_max_size_var)?,
            },
        },
        ratio: registry.get(&ratio_var)?,
        max_bytes: registry.get(&max_bytes_var)?,
        endpoint: registry.get(&endpoint_var)?,
        r#type: registry.get(&type_var)?,
    };
    if cfg.name.is_empty() {
        return ::core::result::Result::Err(EnvError::empty(NAME_ENV_NAME));
    }
    if cfg.db.host.is_empty() {
        return ::core::result::Result::Err(EnvError::empty(DB_HOST_ENV_NAME));
    }
    if cfg.db.port == 0 {
        return ::core::result::Result::Err(EnvError::empty(DB_PORT_ENV_NAME));
    }
    if cfg.db.pool.timeout.is_zero() {
        return ::core::result::Result::Err(EnvError::empty(DB_POOL_TIMEOUT_ENV_NAME));
    }
    if cfg.db.pool.max_size == 0 {
        return ::core::result::Result::Err(EnvError::empty(DB_POOL_MAX_SIZE_ENV_NAME));
    }
    if cfg.ratio == 0.0 {
        return ::core::result::Result::Err(EnvError::empty(RATIO_ENV_NAME));
    }
    if cfg.max_bytes == 0 {
        return ::core::result::Result::Err(EnvError::empty(MAX_BYTES_ENV_NAME));
    }
    if cfg.endpoint.is_none() {
        return ::core::result::Result::Err(EnvError::empty(ENDPOINT_ENV_NAME));
    }
    if cfg.r#type.is_empty() {
        return ::core::result::Result::Err(EnvError::empty(TYPE_ENV_NAME));
    }
    ::core::result::Result::Ok(cfg)
}
