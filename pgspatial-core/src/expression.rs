//! The built expression and its inline SQL rendering.
//!
//! [`SqlExpression`] is what [`crate::build`] returns: a function name, the
//! ordered arguments and an optional geometry/geography annotation. Query
//! layers that bind parameters (see `pgspatial-diesel`) walk the arguments
//! themselves; [`SqlExpression::to_sql`] renders a self-contained statement
//! fragment with inline literals, which is handy for logging, tests and raw
//! SQL.

use std::fmt::{self, Write as _};

use geozero::{CoordDimensions, ToWkb};

use crate::catalog::ParamKind;
use crate::enums::SpatialType;

/// A scalar argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// One positional argument of a built call.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument<G> {
    Geometry(G),
    Value(Value),
    /// Typed `NULL` filling a positional gap.
    Null(ParamKind),
}

/// A PostGIS function call ready to be embedded in a query.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlExpression<G = GeometryArgument> {
    function_name: &'static str,
    arguments: Vec<Argument<G>>,
    type_annotation: Option<SpatialType>,
}

impl<G> SqlExpression<G> {
    pub(crate) fn new(
        function_name: &'static str,
        arguments: Vec<Argument<G>>,
        type_annotation: Option<SpatialType>,
    ) -> Self {
        Self {
            function_name,
            arguments,
            type_annotation,
        }
    }

    pub fn function_name(&self) -> &'static str {
        self.function_name
    }

    pub fn arguments(&self) -> &[Argument<G>] {
        &self.arguments
    }

    /// Overload selected for the geometry operands, if any.
    pub fn type_annotation(&self) -> Option<SpatialType> {
        self.type_annotation
    }

    pub fn into_parts(self) -> (&'static str, Vec<Argument<G>>, Option<SpatialType>) {
        (self.function_name, self.arguments, self.type_annotation)
    }

    /// Replace every geometry operand, keeping positions.
    pub fn map_geometries<H, F>(self, mut f: F) -> SqlExpression<H>
    where
        F: FnMut(G) -> H,
    {
        let arguments = self
            .arguments
            .into_iter()
            .map(|arg| match arg {
                Argument::Geometry(g) => Argument::Geometry(f(g)),
                Argument::Value(v) => Argument::Value(v),
                Argument::Null(kind) => Argument::Null(kind),
            })
            .collect();
        SqlExpression::new(self.function_name, arguments, self.type_annotation)
    }
}

/// Rendering options shared by every SQL writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderConfig {
    /// Schema PostGIS is installed in. Function names and literal geometry
    /// constructors are qualified with it when set.
    pub schema: Option<String>,
}

impl RenderConfig {
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// `"schema".name` or `name`.
    pub fn qualify(&self, name: &str) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{name}", quote_identifier(schema)),
            None => name.to_string(),
        }
    }
}

/// Inline SQL rendering of an operand or expression.
pub trait WriteSql {
    fn write_sql(&self, out: &mut String, config: &RenderConfig);
}

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Single-quote a string literal, doubling embedded quotes.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

impl WriteSql for Value {
    fn write_sql(&self, out: &mut String, _config: &RenderConfig) {
        match self {
            Value::Int(v) => {
                let _ = write!(out, "{v}");
            }
            Value::Float(v) if v.is_finite() => {
                let _ = write!(out, "{v:?}");
            }
            Value::Float(v) => {
                let text = if v.is_nan() {
                    "NaN"
                } else if v.is_sign_positive() {
                    "Infinity"
                } else {
                    "-Infinity"
                };
                let _ = write!(out, "'{text}'::double precision");
            }
            Value::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
            Value::Text(v) => out.push_str(&quote_literal(v)),
        }
    }
}

impl<G: WriteSql> WriteSql for SqlExpression<G> {
    fn write_sql(&self, out: &mut String, config: &RenderConfig) {
        out.push_str(&config.qualify(self.function_name));
        out.push('(');
        for (idx, arg) in self.arguments.iter().enumerate() {
            if idx > 0 {
                out.push_str(", ");
            }
            match arg {
                Argument::Geometry(g) => {
                    g.write_sql(out, config);
                    if let Some(ty) = self.type_annotation {
                        let _ = write!(out, "::{ty}");
                    }
                }
                Argument::Value(v) => v.write_sql(out, config),
                Argument::Null(kind) => {
                    let _ = write!(out, "NULL::{}", kind.pg_type());
                }
            }
        }
        out.push(')');
    }
}

impl<G: WriteSql> SqlExpression<G> {
    /// Render with inline literals.
    ///
    /// ```
    /// use pgspatial_core::{build, EndCap, GeometryArgument, Operation, Params};
    ///
    /// let expr = build(
    ///     Operation::Buffer,
    ///     vec![GeometryArgument::column("geom")],
    ///     Params::new().set("radius", 5.0).set("style_endcap", EndCap::Round),
    /// )
    /// .unwrap();
    /// assert_eq!(expr.to_string(), r#"ST_Buffer("geom", 5.0, 'endcap=round')"#);
    /// ```
    pub fn to_sql(&self, config: &RenderConfig) -> String {
        let mut out = String::new();
        self.write_sql(&mut out, config);
        out
    }
}

impl<G: WriteSql> fmt::Display for SqlExpression<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql(&RenderConfig::default()))
    }
}

/// Geometry operand for callers that do not bring their own query layer.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryArgument {
    /// Column reference, `table.column` or `column`.
    Column(String),
    /// WKT text, optionally with an SRID.
    Wkt { wkt: String, srid: Option<i32> },
    /// EWKB bytes.
    Ewkb(Vec<u8>),
    /// Nested spatial call.
    Expression(Box<SqlExpression<GeometryArgument>>),
    /// Verbatim SQL.
    Raw(String),
}

impl GeometryArgument {
    pub fn column(name: impl Into<String>) -> Self {
        GeometryArgument::Column(name.into())
    }

    pub fn wkt(wkt: impl Into<String>, srid: Option<i32>) -> Self {
        GeometryArgument::Wkt {
            wkt: wkt.into(),
            srid,
        }
    }

    /// Encode a `geo` geometry as an EWKB literal.
    ///
    /// ```
    /// use pgspatial_core::GeometryArgument;
    ///
    /// let point = geo::Geometry::Point(geo::Point::new(1.0, 2.0));
    /// let arg = GeometryArgument::from_geo(&point, Some(4326)).unwrap();
    /// assert!(matches!(arg, GeometryArgument::Ewkb(_)));
    /// ```
    pub fn from_geo(
        geometry: &geo::Geometry<f64>,
        srid: Option<i32>,
    ) -> geozero::error::Result<Self> {
        let ewkb = geometry.to_ewkb(CoordDimensions::xy(), srid)?;
        Ok(GeometryArgument::Ewkb(ewkb))
    }
}

impl From<SqlExpression<GeometryArgument>> for GeometryArgument {
    fn from(expr: SqlExpression<GeometryArgument>) -> Self {
        GeometryArgument::Expression(Box::new(expr))
    }
}

impl WriteSql for GeometryArgument {
    fn write_sql(&self, out: &mut String, config: &RenderConfig) {
        match self {
            GeometryArgument::Column(name) => {
                let quoted: Vec<String> = name.split('.').map(quote_identifier).collect();
                out.push_str(&quoted.join("."));
            }
            GeometryArgument::Wkt { wkt, srid } => {
                out.push_str(&config.qualify("ST_GeomFromText"));
                out.push('(');
                out.push_str(&quote_literal(wkt));
                if let Some(srid) = srid {
                    let _ = write!(out, ", {srid}");
                }
                out.push(')');
            }
            GeometryArgument::Ewkb(bytes) => {
                out.push('\'');
                for byte in bytes {
                    let _ = write!(out, "{byte:02X}");
                }
                out.push_str("'::geometry");
            }
            GeometryArgument::Expression(expr) => expr.write_sql(out, config),
            GeometryArgument::Raw(sql) => out.push_str(sql),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(arg: &GeometryArgument, config: &RenderConfig) -> String {
        let mut out = String::new();
        arg.write_sql(&mut out, config);
        out
    }

    #[test]
    fn column_is_quoted_per_segment() {
        let sql = render(
            &GeometryArgument::column("parcels.geom"),
            &RenderConfig::default(),
        );
        assert_eq!(sql, r#""parcels"."geom""#);
    }

    #[test]
    fn wkt_uses_qualified_constructor() {
        let config = RenderConfig::default().with_schema("postgis");
        let sql = render(&GeometryArgument::wkt("POINT(1 2)", Some(4326)), &config);
        assert_eq!(sql, r#""postgis".ST_GeomFromText('POINT(1 2)', 4326)"#);
    }

    #[test]
    fn wkt_quotes_are_escaped() {
        let sql = render(
            &GeometryArgument::wkt("it's", None),
            &RenderConfig::default(),
        );
        assert_eq!(sql, "ST_GeomFromText('it''s')");
    }

    #[test]
    fn ewkb_renders_as_hex_literal() {
        let sql = render(
            &GeometryArgument::Ewkb(vec![0x01, 0xAB]),
            &RenderConfig::default(),
        );
        assert_eq!(sql, "'01AB'::geometry");
    }

    #[test]
    fn from_geo_writes_srid_flag() {
        let point = geo::Geometry::Point(geo::Point::new(1.0, 2.0));
        let GeometryArgument::Ewkb(bytes) = GeometryArgument::from_geo(&point, Some(4326)).unwrap()
        else {
            panic!("expected EWKB");
        };
        assert_eq!(bytes[0], 0x01);
        let raw_type = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]);
        assert_eq!(raw_type & 0x2000_0000, 0x2000_0000);
        assert_eq!(raw_type & 0xFF, 1);
    }

    #[test]
    fn values_render_as_literals() {
        let config = RenderConfig::default();
        let mut out = String::new();
        for value in [
            Value::Int(8),
            Value::Float(2.5),
            Value::Float(f64::NEG_INFINITY),
            Value::Bool(false),
            Value::Text("join=mitre".into()),
        ] {
            value.write_sql(&mut out, &config);
            out.push(' ');
        }
        assert_eq!(
            out,
            "8 2.5 '-Infinity'::double precision false 'join=mitre' "
        );
    }

    #[test]
    fn annotation_casts_geometry_operands_only() {
        let expr = SqlExpression::new(
            "ST_Centroid",
            vec![
                Argument::Geometry(GeometryArgument::column("geom")),
                Argument::Value(Value::Bool(true)),
            ],
            Some(SpatialType::Geography),
        );
        assert_eq!(expr.to_string(), r#"ST_Centroid("geom"::geography, true)"#);
    }

    #[test]
    fn typed_null_placeholder() {
        let expr: SqlExpression = SqlExpression::new(
            "ST_FilterByM",
            vec![
                Argument::Geometry(GeometryArgument::Raw("g".into())),
                Argument::Value(Value::Float(1.0)),
                Argument::Null(ParamKind::Float),
                Argument::Value(Value::Bool(true)),
            ],
            None,
        );
        assert_eq!(
            expr.to_string(),
            "ST_FilterByM(g, 1.0, NULL::double precision, true)"
        );
    }

    #[test]
    fn nested_expression_and_schema() {
        let inner: SqlExpression = SqlExpression::new(
            "ST_ConvexHull",
            vec![Argument::Geometry(GeometryArgument::column("geom"))],
            None,
        );
        let outer = SqlExpression::new(
            "ST_PointOnSurface",
            vec![Argument::Geometry(GeometryArgument::from(inner))],
            None,
        );
        let config = RenderConfig::default().with_schema("gis");
        assert_eq!(
            outer.to_sql(&config),
            r#""gis".ST_PointOnSurface("gis".ST_ConvexHull("geom"))"#
        );
    }

    #[test]
    fn map_geometries_keeps_positions() {
        let expr = SqlExpression::new(
            "ST_SharedPaths",
            vec![Argument::Geometry(1), Argument::Geometry(2)],
            None,
        );
        let mapped = expr.map_geometries(|n| GeometryArgument::Raw(format!("g{n}")));
        assert_eq!(mapped.to_string(), "ST_SharedPaths(g1, g2)");
    }
}
