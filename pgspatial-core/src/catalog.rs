//! Declarative catalogue of the supported PostGIS geometry-processing
//! functions.
//!
//! Each [`Operation`] maps to one static [`OperationSpec`] describing the
//! positional shape of the SQL call. The generic builder in
//! [`crate::builder`] is the only consumer of these tables.

use std::fmt;

/// Type of value a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Int,
    Float,
    Bool,
    Text,
    EndCap,
    Join,
    Side,
    DelaunayOutput,
    SpatialType,
    Geometry,
}

impl ParamKind {
    /// PostgreSQL type name used for typed `NULL` placeholders.
    pub const fn pg_type(self) -> &'static str {
        match self {
            ParamKind::Int | ParamKind::DelaunayOutput => "integer",
            ParamKind::Float => "double precision",
            ParamKind::Bool => "boolean",
            ParamKind::Text
            | ParamKind::EndCap
            | ParamKind::Join
            | ParamKind::Side
            | ParamKind::SpatialType => "text",
            ParamKind::Geometry => "geometry",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Int => "an integer",
            ParamKind::Float => "a float",
            ParamKind::Bool => "a boolean",
            ParamKind::Text => "text",
            ParamKind::EndCap => "an end cap style",
            ParamKind::Join => "a join style",
            ParamKind::Side => "a buffer side",
            ParamKind::DelaunayOutput => "a delaunay output flag",
            ParamKind::SpatialType => "a spatial type",
            ParamKind::Geometry => "a geometry",
        };
        f.write_str(name)
    }
}

/// Value substituted for an absent optional parameter that is followed by a
/// present one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    /// PostGIS has no default for this position (separate overload).
    NoDefault,
    /// The SQL default is `NULL`.
    Null,
    Int(i32),
    Float(f64),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Presence {
    Required,
    Optional(ParamDefault),
}

/// One named parameter of an operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub presence: Presence,
}

impl ParamSpec {
    pub const fn is_required(&self) -> bool {
        matches!(self.presence, Presence::Required)
    }
}

/// A `key=value` entry of a style string, sourced from parameter `param`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleMember {
    pub key: &'static str,
    pub param: &'static str,
}

/// Optional parameters folded into one comma-joined text argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleGroupSpec {
    pub members: &'static [StyleMember],
    /// Shortcut parameter that may not be combined with any member.
    pub exclusive_with: Option<&'static str>,
}

impl StyleGroupSpec {
    pub fn contains(&self, param: &str) -> bool {
        self.members.iter().any(|m| m.param == param)
    }
}

/// Geometry/geography overload selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSpec {
    /// Flag whose presence selects the geography overload.
    pub flag: &'static str,
    /// Explicit [`crate::SpatialType`] parameter, never emitted.
    pub type_param: &'static str,
}

/// Positional shape of a PostGIS function call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperationSpec {
    pub sql_name: &'static str,
    pub geometries: &'static [&'static str],
    pub params: &'static [ParamSpec],
    pub style: Option<StyleGroupSpec>,
    pub variant: Option<VariantSpec>,
}

impl OperationSpec {
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Optional parameters emitted positionally after the style slot: the
    /// exclusive shortcut first, then the others in declared order. Style
    /// members and variant parameters are not part of it.
    pub fn tail(&self) -> Vec<&'static ParamSpec> {
        let shortcut = self.style.and_then(|s| s.exclusive_with);
        let style_member = |name: &str| self.style.is_some_and(|s| s.contains(name));
        let variant_param = |name: &str| {
            self.variant
                .is_some_and(|v| v.flag == name || v.type_param == name)
        };
        shortcut
            .and_then(|name| self.param(name))
            .into_iter()
            .chain(self.params.iter().filter(|p| {
                !p.is_required()
                    && Some(p.name) != shortcut
                    && !style_member(p.name)
                    && !variant_param(p.name)
            }))
            .collect()
    }
}

const fn required(name: &'static str, kind: ParamKind) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        presence: Presence::Required,
    }
}

const fn optional(name: &'static str, kind: ParamKind, default: ParamDefault) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        presence: Presence::Optional(default),
    }
}

const GEOMETRY: &[&str] = &["geometry"];

const fn unary(sql_name: &'static str, params: &'static [ParamSpec]) -> OperationSpec {
    OperationSpec {
        sql_name,
        geometries: GEOMETRY,
        params,
        style: None,
        variant: None,
    }
}

const BUFFER: OperationSpec = OperationSpec {
    sql_name: "ST_Buffer",
    geometries: GEOMETRY,
    params: &[
        required("radius", ParamKind::Float),
        optional(
            "num_seg_quarter_circle",
            ParamKind::Int,
            ParamDefault::NoDefault,
        ),
        optional("style_quad_segs", ParamKind::Int, ParamDefault::NoDefault),
        optional("style_endcap", ParamKind::EndCap, ParamDefault::NoDefault),
        optional("style_join", ParamKind::Join, ParamDefault::NoDefault),
        optional(
            "style_mitre_level",
            ParamKind::Float,
            ParamDefault::NoDefault,
        ),
        optional("style_side", ParamKind::Side, ParamDefault::NoDefault),
    ],
    style: Some(StyleGroupSpec {
        members: &[
            StyleMember {
                key: "quad_segs",
                param: "style_quad_segs",
            },
            StyleMember {
                key: "endcap",
                param: "style_endcap",
            },
            StyleMember {
                key: "join",
                param: "style_join",
            },
            StyleMember {
                key: "mitre_level",
                param: "style_mitre_level",
            },
            StyleMember {
                key: "side",
                param: "style_side",
            },
        ],
        exclusive_with: Some("num_seg_quarter_circle"),
    }),
    variant: None,
};

const CENTROID: OperationSpec = OperationSpec {
    sql_name: "ST_Centroid",
    geometries: GEOMETRY,
    params: &[
        optional("use_spheroid", ParamKind::Bool, ParamDefault::Bool(true)),
        optional(
            "geometry_type",
            ParamKind::SpatialType,
            ParamDefault::NoDefault,
        ),
    ],
    style: None,
    variant: Some(VariantSpec {
        flag: "use_spheroid",
        type_param: "geometry_type",
    }),
};

const OFFSET_CURVE: OperationSpec = OperationSpec {
    sql_name: "ST_OffsetCurve",
    geometries: GEOMETRY,
    params: &[
        required("signed_distance", ParamKind::Float),
        optional(
            "num_seg_quarter_circle",
            ParamKind::Int,
            ParamDefault::NoDefault,
        ),
        optional("style_join", ParamKind::Join, ParamDefault::NoDefault),
        optional(
            "style_mitre_level",
            ParamKind::Float,
            ParamDefault::NoDefault,
        ),
    ],
    style: Some(StyleGroupSpec {
        members: &[
            StyleMember {
                key: "quad_segs",
                param: "num_seg_quarter_circle",
            },
            StyleMember {
                key: "join",
                param: "style_join",
            },
            StyleMember {
                key: "mitre_level",
                param: "style_mitre_level",
            },
        ],
        exclusive_with: None,
    }),
    variant: None,
};

const SHARED_PATHS: OperationSpec = OperationSpec {
    sql_name: "ST_SharedPaths",
    geometries: &["geometry_a", "geometry_b"],
    params: &[],
    style: None,
    variant: None,
};

const VORONOI_PARAMS: &[ParamSpec] = &[
    optional("tolerance", ParamKind::Float, ParamDefault::Float(0.0)),
    optional("extend_to", ParamKind::Geometry, ParamDefault::Null),
];

const BUILD_AREA: OperationSpec = unary("ST_BuildArea", &[]);

const CHAIKIN_SMOOTHING: OperationSpec = unary(
    "ST_ChaikinSmoothing",
    &[
        optional("iterations", ParamKind::Int, ParamDefault::Int(1)),
        optional(
            "preserve_end_points",
            ParamKind::Bool,
            ParamDefault::Bool(false),
        ),
    ],
);

const CONCAVE_HULL: OperationSpec = unary(
    "ST_ConcaveHull",
    &[
        required("pctconvex", ParamKind::Float),
        optional("allow_holes", ParamKind::Bool, ParamDefault::Bool(false)),
    ],
);

const CONVEX_HULL: OperationSpec = unary("ST_ConvexHull", &[]);

const DELAUNAY_TRIANGLES: OperationSpec = unary(
    "ST_DelaunayTriangles",
    &[
        optional("tolerance", ParamKind::Float, ParamDefault::Float(0.0)),
        optional("output", ParamKind::DelaunayOutput, ParamDefault::Int(0)),
    ],
);

const FILTER_BY_M: OperationSpec = unary(
    "ST_FilterByM",
    &[
        required("min", ParamKind::Float),
        optional("max", ParamKind::Float, ParamDefault::Null),
        optional("return_m", ParamKind::Bool, ParamDefault::Bool(false)),
    ],
);

// Without a seed PostGIS picks the two-argument overload, so there is no
// value to fill in.
const GENERATE_POINTS: OperationSpec = unary(
    "ST_GeneratePoints",
    &[
        required("number_of_points", ParamKind::Int),
        optional("seed", ParamKind::Int, ParamDefault::NoDefault),
    ],
);

const GEOMETRIC_MEDIAN: OperationSpec = unary(
    "ST_GeometricMedian",
    &[
        optional("tolerance", ParamKind::Float, ParamDefault::Null),
        optional("max_iterations", ParamKind::Int, ParamDefault::Int(10000)),
        optional(
            "fail_if_not_converged",
            ParamKind::Bool,
            ParamDefault::Bool(false),
        ),
    ],
);

const LINE_MERGE: OperationSpec = unary(
    "ST_LineMerge",
    &[optional("directed", ParamKind::Bool, ParamDefault::Bool(false))],
);

const MINIMUM_BOUNDING_CIRCLE: OperationSpec = unary(
    "ST_MinimumBoundingCircle",
    &[optional(
        "num_segs_per_quarter_circle",
        ParamKind::Int,
        ParamDefault::Int(48),
    )],
);

const ORIENTED_ENVELOPE: OperationSpec = unary("ST_OrientedEnvelope", &[]);

const POINT_ON_SURFACE: OperationSpec = unary("ST_PointOnSurface", &[]);

const REDUCE_PRECISION: OperationSpec =
    unary("ST_ReducePrecision", &[required("grid_size", ParamKind::Float)]);

const SIMPLIFY: OperationSpec = unary(
    "ST_Simplify",
    &[
        required("tolerance", ParamKind::Float),
        optional(
            "preserve_collapsed",
            ParamKind::Bool,
            ParamDefault::Bool(false),
        ),
    ],
);

const SIMPLIFY_POLYGON_HULL: OperationSpec = unary(
    "ST_SimplifyPolygonHull",
    &[
        required("vertex_fraction", ParamKind::Float),
        optional("is_outer", ParamKind::Bool, ParamDefault::Bool(true)),
    ],
);

const SIMPLIFY_PRESERVE_TOPOLOGY: OperationSpec = unary(
    "ST_SimplifyPreserveTopology",
    &[required("tolerance", ParamKind::Float)],
);

const SIMPLIFY_VW: OperationSpec =
    unary("ST_SimplifyVW", &[required("tolerance", ParamKind::Float)]);

const SET_EFFECTIVE_AREA: OperationSpec = unary(
    "ST_SetEffectiveArea",
    &[
        optional("threshold", ParamKind::Float, ParamDefault::Float(0.0)),
        optional("set_area", ParamKind::Int, ParamDefault::Int(1)),
    ],
);

const TRIANGULATE_POLYGON: OperationSpec = unary("ST_TriangulatePolygon", &[]);

const VORONOI_LINES: OperationSpec = unary("ST_VoronoiLines", VORONOI_PARAMS);

const VORONOI_POLYGONS: OperationSpec = unary("ST_VoronoiPolygons", VORONOI_PARAMS);

/// Every supported geometry-processing function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Buffer,
    BuildArea,
    Centroid,
    ChaikinSmoothing,
    ConcaveHull,
    ConvexHull,
    DelaunayTriangles,
    FilterByM,
    GeneratePoints,
    GeometricMedian,
    LineMerge,
    MinimumBoundingCircle,
    OrientedEnvelope,
    OffsetCurve,
    PointOnSurface,
    ReducePrecision,
    SharedPaths,
    Simplify,
    SimplifyPolygonHull,
    SimplifyPreserveTopology,
    SimplifyVW,
    SetEffectiveArea,
    TriangulatePolygon,
    VoronoiLines,
    VoronoiPolygons,
}

impl Operation {
    pub const ALL: &'static [Operation] = &[
        Operation::Buffer,
        Operation::BuildArea,
        Operation::Centroid,
        Operation::ChaikinSmoothing,
        Operation::ConcaveHull,
        Operation::ConvexHull,
        Operation::DelaunayTriangles,
        Operation::FilterByM,
        Operation::GeneratePoints,
        Operation::GeometricMedian,
        Operation::LineMerge,
        Operation::MinimumBoundingCircle,
        Operation::OrientedEnvelope,
        Operation::OffsetCurve,
        Operation::PointOnSurface,
        Operation::ReducePrecision,
        Operation::SharedPaths,
        Operation::Simplify,
        Operation::SimplifyPolygonHull,
        Operation::SimplifyPreserveTopology,
        Operation::SimplifyVW,
        Operation::SetEffectiveArea,
        Operation::TriangulatePolygon,
        Operation::VoronoiLines,
        Operation::VoronoiPolygons,
    ];

    /// Positional schema of this operation.
    pub fn spec(self) -> &'static OperationSpec {
        match self {
            Operation::Buffer => &BUFFER,
            Operation::BuildArea => &BUILD_AREA,
            Operation::Centroid => &CENTROID,
            Operation::ChaikinSmoothing => &CHAIKIN_SMOOTHING,
            Operation::ConcaveHull => &CONCAVE_HULL,
            Operation::ConvexHull => &CONVEX_HULL,
            Operation::DelaunayTriangles => &DELAUNAY_TRIANGLES,
            Operation::FilterByM => &FILTER_BY_M,
            Operation::GeneratePoints => &GENERATE_POINTS,
            Operation::GeometricMedian => &GEOMETRIC_MEDIAN,
            Operation::LineMerge => &LINE_MERGE,
            Operation::MinimumBoundingCircle => &MINIMUM_BOUNDING_CIRCLE,
            Operation::OrientedEnvelope => &ORIENTED_ENVELOPE,
            Operation::OffsetCurve => &OFFSET_CURVE,
            Operation::PointOnSurface => &POINT_ON_SURFACE,
            Operation::ReducePrecision => &REDUCE_PRECISION,
            Operation::SharedPaths => &SHARED_PATHS,
            Operation::Simplify => &SIMPLIFY,
            Operation::SimplifyPolygonHull => &SIMPLIFY_POLYGON_HULL,
            Operation::SimplifyPreserveTopology => &SIMPLIFY_PRESERVE_TOPOLOGY,
            Operation::SimplifyVW => &SIMPLIFY_VW,
            Operation::SetEffectiveArea => &SET_EFFECTIVE_AREA,
            Operation::TriangulatePolygon => &TRIANGULATE_POLYGON,
            Operation::VoronoiLines => &VORONOI_LINES,
            Operation::VoronoiPolygons => &VORONOI_POLYGONS,
        }
    }

    /// Canonical PostGIS function name.
    pub fn sql_name(self) -> &'static str {
        self.spec().sql_name
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}
