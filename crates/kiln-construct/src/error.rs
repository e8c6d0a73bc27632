use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConstructError>;

/// Classified failures of the construction layer.
///
/// Individual constructor-invocation failures during brute-force search are
/// *not* errors; they are expected and advance the search. Only the terminal
/// outcomes below surface to the caller, and each carries the offending
/// type's fully qualified path.
#[derive(Debug, Error)]
pub enum ConstructError {
    /// The type is assignable to an instantiation deny-list entry. Fatal;
    /// never retried.
    #[error("for security reasons, instantiation of `{type_path}` is not allowed")]
    SecurityDenied { type_path: String },

    /// Asked to instantiate a bare interface with no known container shape.
    #[error("cannot instantiate unknown interface `{type_path}`")]
    UnsupportedInterface { type_path: String },

    /// Every constructor-trial strategy (including raw allocation, when
    /// enabled) failed.
    #[error("no constructor found to instantiate `{type_path}`")]
    NoConstructorFound { type_path: String },

    /// A textual or scalar value could not be parsed into the requested
    /// primitive kind.
    #[error("cannot coerce {raw} into `{target}`")]
    CoercionFailed { target: &'static str, raw: String },

    /// A direct field write was rejected even after the access-opening
    /// attempt.
    #[error(
        "cannot assign field `{field}` on `{type_path}`: the field is not open for direct \
         writes; register an explicit factory for this type instead"
    )]
    FieldAssignmentDenied { type_path: String, field: String },
}
