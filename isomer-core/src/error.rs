use crate::ty::Ty;
use crate::value::Value;

/// Error raised by user-supplied extensions (custom mappers, hooks).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single accessor or mutator invocation.
#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("no property method named {0}")]
    UnknownProperty(String),
    #[error("{0}")]
    Custom(#[source] BoxError),
}

impl PropertyError {
    pub fn mismatch(expected: &Ty, found: &Value) -> Self {
        PropertyError::TypeMismatch {
            expected: expected.to_string(),
            found: found.type_name(),
        }
    }

    pub fn custom(err: impl Into<BoxError>) -> Self {
        PropertyError::Custom(err.into())
    }
}

/// Error type for mapping operations.
///
/// `StrictMode` is only ever produced by a mapper configured as strict; every
/// other variant is fatal regardless of the configured policy.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("strict mode violation: {message}")]
    StrictMode {
        message: String,
        #[source]
        cause: Option<PropertyError>,
    },
    #[error("cannot instantiate {type_name}: {reason}")]
    Instantiation { type_name: String, reason: String },
    #[error("{value_type} value needs a parameterized destination type, found {declared}")]
    UnparameterizedContainer { value_type: String, declared: String },
    #[error("custom mapper {source_type} -> {destination_type} failed")]
    CustomMapper {
        source_type: String,
        destination_type: String,
        #[source]
        cause: BoxError,
    },
    #[error("hook {source_type} -> {destination_type} failed")]
    Hook {
        source_type: String,
        destination_type: String,
        #[source]
        cause: BoxError,
    },
    #[error("mapped value does not fit the requested type: {0}")]
    Conversion(#[source] PropertyError),
}

impl MapError {
    pub fn strict(message: impl Into<String>) -> Self {
        MapError::StrictMode {
            message: message.into(),
            cause: None,
        }
    }

    pub fn strict_with_cause(message: impl Into<String>, cause: PropertyError) -> Self {
        MapError::StrictMode {
            message: message.into(),
            cause: Some(cause),
        }
    }

    pub fn instantiation(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        MapError::Instantiation {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    pub fn is_strict_mode(&self) -> bool {
        matches!(self, MapError::StrictMode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::Primitive;
    use std::error::Error;

    #[test]
    fn strict_error_keeps_cause() {
        let cause = PropertyError::mismatch(&Ty::Primitive(Primitive::I32), &Value::Str("x".into()));
        let err = MapError::strict_with_cause("unable to map Person.set_age()", cause);
        assert!(err.is_strict_mode());
        assert_eq!(
            err.to_string(),
            "strict mode violation: unable to map Person.set_age()"
        );
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("expected i32, found String".to_string())
        );
    }

    #[test]
    fn instantiation_is_not_strict() {
        let err = MapError::instantiation("Person", "no zero-argument constructor");
        assert!(!err.is_strict_mode());
        assert!(err.to_string().contains("Person"));
    }
}
