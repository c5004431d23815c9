//! Convenience re-exports for pgspatial-diesel.
//!
//! ```rust,ignore
//! use pgspatial_diesel::prelude::*;
//! ```

pub use crate::expression::{argument, literal, operand, spatial, GeometryOperand, SpatialExpression};
pub use crate::expression_methods::GeometryProcessingMethods;
pub use crate::types::{Geography, Geometry};
pub use pgspatial_core::{
    DelaunayTrianglesOutput, EndCap, Join, Operation, Params, RenderConfig, Side, SpatialType,
};
