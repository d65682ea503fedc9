use std::time::Duration;

use url::Url;

use crate::error::EnvError;
use crate::types::Value;

/// Extracts a concrete Rust value from a registry cell.
pub trait FromValue: Sized {
    const TYPE_NAME: &'static str;
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for i64 {
    const TYPE_NAME: &'static str = "int";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromValue for u64 {
    const TYPE_NAME: &'static str = "uint";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_u64()
    }
}

impl FromValue for f64 {
    const TYPE_NAME: &'static str = "float";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for Duration {
    const TYPE_NAME: &'static str = "duration";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_duration()
    }
}

impl FromValue for Option<Url> {
    const TYPE_NAME: &'static str = "url";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Url(url) => Some(url.clone()),
            _ => None,
        }
    }
}

impl FromValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for Vec<String> {
    const TYPE_NAME: &'static str = "string list";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::StringList(items) => Some(items.clone()),
            _ => None,
        }
    }
}

impl FromValue for Value {
    const TYPE_NAME: &'static str = "value";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

pub fn convert_value<T: FromValue>(value: &Value, name: &str) -> Result<T, EnvError> {
    T::from_value(value).ok_or_else(|| EnvError::type_mismatch(name, T::TYPE_NAME, value.type_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_accepts_non_negative_ints() {
        assert_eq!(u64::from_value(&Value::Int(7)), Some(7));
        assert_eq!(u64::from_value(&Value::Int(-7)), None);
    }

    #[test]
    fn mismatch_names_both_kinds() {
        let err = convert_value::<bool>(&Value::String("yes".into()), "FLAG").unwrap_err();
        assert_eq!(err, EnvError::type_mismatch("FLAG", "bool", "string"));
    }
}
