#![doc = include_str!("../../README.md")]
//! Crate-specific API surface for `pgspatial-diesel`.

pub mod expression;
pub mod expression_methods;
pub mod prelude;
pub mod types;

pub use expression::{argument, literal, operand, spatial, GeometryOperand, SpatialExpression};
pub use expression_methods::GeometryProcessingMethods;
pub use types::{Geography, Geometry, SpatialSqlType};
