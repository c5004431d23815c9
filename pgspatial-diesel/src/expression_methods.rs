//! Extension trait for method-style spatial processing on geometry expressions.
//!
//! Import [`GeometryProcessingMethods`] (or `use pgspatial_diesel::prelude::*`)
//! to build a call with the receiver as its first geometry operand:
//!
//! ```rust,ignore
//! use pgspatial_diesel::prelude::*;
//!
//! let hull = features::geom.process(
//!     Operation::ConcaveHull,
//!     Params::new().set("pctconvex", 0.8),
//! )?;
//! let paths = features::geom.process_with(
//!     roads::geom,
//!     Operation::SharedPaths,
//!     Params::new(),
//! )?;
//! ```

use diesel::expression::Expression;
use diesel::pg::Pg;
use diesel::query_builder::QueryFragment;
use pgspatial_core::{Operation, Params, ValidationError};

use crate::expression::{operand, spatial, GeometryOperand, SpatialExpression};
use crate::types::SpatialSqlType;

/// Method-style access to [`spatial`] for expressions whose SQL type is
/// `Geometry`, `Geography` or a `Nullable` of either.
///
/// Results are typed `Nullable<Geometry>`, as with [`spatial`]; call
/// [`SpatialExpression::into_geography`] on results of geography overloads.
pub trait GeometryProcessingMethods: Expression + Sized {
    /// Run a single-geometry operation on `self`.
    fn process(
        self,
        operation: Operation,
        params: Params<GeometryOperand>,
    ) -> Result<SpatialExpression, ValidationError>
    where
        Self: QueryFragment<Pg> + Send + 'static,
        Self::SqlType: SpatialSqlType,
    {
        spatial(operation, vec![operand(self)], params)
    }

    /// Run a two-geometry operation with `self` first and `other` second.
    fn process_with<O>(
        self,
        other: O,
        operation: Operation,
        params: Params<GeometryOperand>,
    ) -> Result<SpatialExpression, ValidationError>
    where
        Self: QueryFragment<Pg> + Send + 'static,
        Self::SqlType: SpatialSqlType,
        O: Expression + QueryFragment<Pg> + Send + 'static,
        O::SqlType: SpatialSqlType,
    {
        spatial(operation, vec![operand(self), operand(other)], params)
    }
}

impl<T: Expression> GeometryProcessingMethods for T {}
