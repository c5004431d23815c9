#![doc = include_str!("../../README.md")]
//! Crate-specific API surface for `pgspatial-core`.

pub mod builder;
pub mod catalog;
pub mod dimension;
pub mod enums;
pub mod error;
pub mod expression;
pub mod params;

pub use builder::build;
pub use catalog::{Operation, OperationSpec, ParamKind};
pub use dimension::Dimension;
pub use enums::{DelaunayTrianglesOutput, EndCap, Join, Side, SpatialType};
pub use error::{Result, UnknownWireValue, ValidationError};
pub use expression::{Argument, GeometryArgument, RenderConfig, SqlExpression, Value, WriteSql};
pub use params::{ParamValue, Params};
