use thiserror::Error;

use crate::catalog::ParamKind;

/// Reasons a spatial expression cannot be assembled.
///
/// Every variant is raised before any argument is emitted, so a failed
/// build never yields a partial expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("mutually exclusive parameters for {function}: `{first}` and `{second}`")]
    MutuallyExclusive {
        function: &'static str,
        first: &'static str,
        second: &'static str,
    },

    #[error("{function} requires parameter `{parameter}`")]
    MissingParameter {
        function: &'static str,
        parameter: &'static str,
    },

    #[error("{function} has no parameter named `{parameter}`")]
    UnknownParameter {
        function: &'static str,
        parameter: String,
    },

    #[error("{function} parameter `{parameter}` expects {expected}, got {found}")]
    WrongKind {
        function: &'static str,
        parameter: &'static str,
        expected: ParamKind,
        found: ParamKind,
    },

    #[error("{function} takes {expected} geometry operand(s), got {found}")]
    GeometryCount {
        function: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{function} parameter `{parameter}` has no default and must be given when `{following}` is")]
    PositionalGap {
        function: &'static str,
        parameter: &'static str,
        following: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ValidationError>;

/// A string that is not part of an enum's PostGIS vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownWireValue {
    pub kind: &'static str,
    pub value: String,
}
