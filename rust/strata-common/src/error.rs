use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_data(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    /// A physical type that cannot be materialized as the requested logical type.
    pub fn unsupported_conversion(logical: impl Into<String>, physical: impl Into<String>) -> Error {
        Error(
            ErrorKind::UnsupportedConversion {
                logical: logical.into(),
                physical: physical.into(),
            }
            .into(),
        )
    }

    pub fn missing_constructor(class: impl Into<String>) -> Error {
        Error(
            ErrorKind::MissingConstructor {
                class: class.into(),
            }
            .into(),
        )
    }

    pub fn union_conflict(union: impl Into<String>) -> Error {
        Error(
            ErrorKind::UnionConflict {
                union: union.into(),
            }
            .into(),
        )
    }

    pub fn invalid_default(field: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidDefault {
                field: field.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn json<E>(context: impl Into<String>, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::Json {
                context: context.into(),
                source: Box::new(source),
            }
            .into(),
        )
    }

    /// Returns `true` for errors raised while binding a converter tree,
    /// as opposed to errors raised while decoding a record.
    pub fn is_bind_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::UnsupportedConversion { .. }
                | ErrorKind::MissingConstructor { .. }
                | ErrorKind::InvalidDefault { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("invalid data for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("cannot convert logical type {logical} (physical type: {physical})")]
    UnsupportedConversion { logical: String, physical: String },

    #[error("class '{class}' is declared but has no byte array constructor")]
    MissingConstructor { class: String },

    #[error("union {union} is resolving to more than one type")]
    UnionConflict { union: String },

    #[error("invalid default value for field '{field}': {message}")]
    InvalidDefault { field: String, message: String },

    #[error("JSON error: {context}")]
    Json {
        context: String,
        source: StdErrorBoxed,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_conversion_names_both_types() {
        let err = Error::unsupported_conversion("\"boolean\"", "required int96 ts");
        let message = err.to_string();
        assert!(message.contains("\"boolean\""));
        assert!(message.contains("int96 ts"));
        assert!(err.is_bind_error());
    }

    #[test]
    fn test_union_conflict_is_decode_error() {
        let err = Error::union_conflict("[\"null\", \"long\"]");
        assert!(!err.is_bind_error());
        assert!(matches!(err.kind(), ErrorKind::UnionConflict { .. }));
    }
}
