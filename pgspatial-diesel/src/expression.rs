//! Diesel query-builder node for built spatial calls.
//!
//! [`spatial`] runs [`pgspatial_core::build`] over boxed Diesel operands and
//! wraps the result in a [`SpatialExpression`], which renders itself through
//! `QueryFragment<Pg>`: scalar arguments become bind parameters, typed NULLs
//! stay inline and geometry operands are walked in place.
//!
//! ```rust,ignore
//! use pgspatial_diesel::prelude::*;
//!
//! let buffered = spatial(
//!     Operation::Buffer,
//!     vec![operand(features::geom)],
//!     Params::new().set("radius", 5.0).set("style_endcap", EndCap::Round),
//! )?;
//! // SELECT ST_Buffer("features"."geom", $1, $2)
//! features::table.select(buffered).load::<Option<geo::Geometry<f64>>>(&mut conn)?;
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use diesel::expression::{
    is_aggregate, AppearsOnTable, Expression, SelectableExpression, TypedExpressionType,
    ValidGrouping,
};
use diesel::pg::Pg;
use diesel::query_builder::{AstPass, QueryFragment, QueryId};
use diesel::result::QueryResult;
use diesel::sql_types::{Bool, Double, Integer, Nullable, SqlType, Text};
use pgspatial_core::{
    build, Argument, GeometryArgument, Operation, Params, RenderConfig, SqlExpression,
    ValidationError, Value, WriteSql,
};

use crate::types::{Geography, Geometry, SpatialSqlType};

/// A geometry operand of a spatial call.
///
/// Nested spatial calls and core [`GeometryArgument`]s are rendered with
/// the [`RenderConfig`] of the call they appear in, so a schema set on the
/// outermost call qualifies every function below it.
pub struct GeometryOperand {
    kind: OperandKind,
}

enum OperandKind {
    Fragment(Box<dyn ErasedFragment>),
    Inline(GeometryArgument),
    Literal(geo::Geometry<f64>),
}

/// Object-safe query fragment that can be inspected for nested calls.
trait ErasedFragment: QueryFragment<Pg> + Send + 'static {
    fn as_any(&self) -> &dyn Any;
}

impl<T> ErasedFragment for T
where
    T: QueryFragment<Pg> + Send + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl GeometryOperand {
    fn walk<'b>(&'b self, out: AstPass<'_, 'b, Pg>, config: &RenderConfig) -> QueryResult<()> {
        match &self.kind {
            OperandKind::Fragment(fragment) => {
                // Deref past the box so `as_any` sees the boxed value.
                let any = (**fragment).as_any();
                // `SpatialExpression` is only ever typed as one of these two.
                if let Some(nested) = any.downcast_ref::<SpatialExpression<Nullable<Geometry>>>() {
                    nested.walk_call(out, nested.inherit(config))
                } else if let Some(nested) =
                    any.downcast_ref::<SpatialExpression<Nullable<Geography>>>()
                {
                    nested.walk_call(out, nested.inherit(config))
                } else {
                    fragment.walk_ast(out)
                }
            }
            OperandKind::Inline(arg) => {
                let mut out = out;
                let mut sql = String::new();
                arg.write_sql(&mut sql, config);
                out.push_sql(&sql);
                Ok(())
            }
            OperandKind::Literal(geometry) => {
                let mut out = out;
                out.push_bind_param::<Geometry, geo::Geometry<f64>>(geometry)
            }
        }
    }
}

impl fmt::Debug for GeometryOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            OperandKind::Fragment(_) => f.write_str("GeometryOperand::Fragment"),
            OperandKind::Inline(arg) => f.debug_tuple("GeometryOperand::Inline").field(arg).finish(),
            OperandKind::Literal(geometry) => {
                f.debug_tuple("GeometryOperand::Literal").field(geometry).finish()
            }
        }
    }
}

/// Use a geometry-typed Diesel expression as an operand. Nested
/// [`SpatialExpression`]s are accepted here as well.
pub fn operand<E>(expr: E) -> GeometryOperand
where
    E: Expression + QueryFragment<Pg> + Send + 'static,
    E::SqlType: SpatialSqlType,
{
    GeometryOperand {
        kind: OperandKind::Fragment(Box::new(expr)),
    }
}

/// Wrap a core [`GeometryArgument`] as an operand. It is rendered inline,
/// the same way [`SqlExpression::to_sql`] renders it.
pub fn argument(arg: GeometryArgument) -> GeometryOperand {
    GeometryOperand {
        kind: OperandKind::Inline(arg),
    }
}

/// Bind a `geo` geometry as an EWKB parameter of type `geometry`.
pub fn literal(geometry: geo::Geometry<f64>) -> GeometryOperand {
    GeometryOperand {
        kind: OperandKind::Literal(geometry),
    }
}

/// Build `operation` over Diesel operands.
///
/// The result is typed `Nullable<Geometry>` whatever overload was
/// selected. When the call runs on geography (for instance `Centroid` with
/// `use_spheroid`, check `inner().type_annotation()`), retype it with
/// [`SpatialExpression::into_geography`] before loading the result.
pub fn spatial(
    operation: Operation,
    geometries: Vec<GeometryOperand>,
    params: Params<GeometryOperand>,
) -> Result<SpatialExpression, ValidationError> {
    let expr = build(operation, geometries, params)?;
    Ok(SpatialExpression::new(expr))
}

/// A built PostGIS call usable anywhere Diesel accepts an expression.
///
/// The SQL type defaults to `Nullable<Geometry>`; calls that run on the
/// geography overload return geography, see [`SpatialExpression::into_geography`].
pub struct SpatialExpression<ST = Nullable<Geometry>> {
    expr: SqlExpression<GeometryOperand>,
    config: RenderConfig,
    _sql_type: PhantomData<ST>,
}

impl SpatialExpression {
    pub fn new(expr: SqlExpression<GeometryOperand>) -> Self {
        Self {
            expr,
            config: RenderConfig::default(),
            _sql_type: PhantomData,
        }
    }
}

impl<ST> SpatialExpression<ST> {
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    /// Qualify this call, the calls nested in it and inline WKT
    /// constructors with `schema`.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.config = self.config.with_schema(schema);
        self
    }

    /// Retype the result as geography.
    pub fn into_geography(self) -> SpatialExpression<Nullable<Geography>> {
        self.retype()
    }

    /// Retype the result as geometry.
    pub fn into_geometry(self) -> SpatialExpression<Nullable<Geometry>> {
        self.retype()
    }

    fn retype<Other>(self) -> SpatialExpression<Other> {
        SpatialExpression {
            expr: self.expr,
            config: self.config,
            _sql_type: PhantomData,
        }
    }

    pub fn inner(&self) -> &SqlExpression<GeometryOperand> {
        &self.expr
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }
}

impl<ST> fmt::Debug for SpatialExpression<ST> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialExpression")
            .field("function", &self.expr.function_name())
            .field("arguments", &self.expr.arguments().len())
            .field("type_annotation", &self.expr.type_annotation())
            .field("config", &self.config)
            .finish()
    }
}

impl<ST> Expression for SpatialExpression<ST>
where
    ST: SqlType + TypedExpressionType,
{
    type SqlType = ST;
}

impl<ST> SpatialExpression<ST> {
    /// Config for this call when nested in a call rendered with `outer`.
    /// A schema set on the enclosing call wins over the nested one.
    fn inherit<'a>(&'a self, outer: &'a RenderConfig) -> &'a RenderConfig {
        if outer.schema.is_some() {
            outer
        } else {
            &self.config
        }
    }

    fn walk_call<'b>(
        &'b self,
        mut out: AstPass<'_, 'b, Pg>,
        config: &RenderConfig,
    ) -> QueryResult<()> {
        if let Some(schema) = &config.schema {
            out.push_identifier(schema)?;
            out.push_sql(".");
        }
        out.push_sql(self.expr.function_name());
        out.push_sql("(");
        for (idx, arg) in self.expr.arguments().iter().enumerate() {
            if idx > 0 {
                out.push_sql(", ");
            }
            match arg {
                Argument::Geometry(operand) => {
                    operand.walk(out.reborrow(), config)?;
                    if let Some(ty) = self.expr.type_annotation() {
                        out.push_sql("::");
                        out.push_sql(ty.wire_value());
                    }
                }
                Argument::Value(Value::Int(v)) => out.push_bind_param::<Integer, _>(v)?,
                Argument::Value(Value::Float(v)) => out.push_bind_param::<Double, _>(v)?,
                Argument::Value(Value::Bool(v)) => out.push_bind_param::<Bool, _>(v)?,
                Argument::Value(Value::Text(v)) => out.push_bind_param::<Text, _>(v)?,
                Argument::Null(kind) => {
                    out.push_sql("NULL::");
                    out.push_sql(kind.pg_type());
                }
            }
        }
        out.push_sql(")");
        Ok(())
    }
}

impl<ST> QueryFragment<Pg> for SpatialExpression<ST> {
    fn walk_ast<'b>(&'b self, out: AstPass<'_, 'b, Pg>) -> QueryResult<()> {
        self.walk_call(out, &self.config)
    }
}

impl<ST: 'static> QueryId for SpatialExpression<ST> {
    type QueryId = ();

    const HAS_STATIC_QUERY_ID: bool = false;
}

// Operands are type-erased, so grouping and table checks cannot be proven;
// this mirrors what Diesel does for `sql` literals.
impl<ST, GB> ValidGrouping<GB> for SpatialExpression<ST> {
    type IsAggregate = is_aggregate::Never;
}

impl<ST, QS> AppearsOnTable<QS> for SpatialExpression<ST> where Self: Expression {}

impl<ST, QS> SelectableExpression<QS> for SpatialExpression<ST> where Self: Expression {}
