//! Property tests for argument assembly.

use pgspatial_core::{
    build, Argument, EndCap, GeometryArgument, Join, Operation, Params, Side, ValidationError,
    Value,
};
use proptest::prelude::*;

fn geom() -> GeometryArgument {
    GeometryArgument::Raw("g".into())
}

/// Optional buffer style members, `None` meaning absent.
#[derive(Debug, Clone)]
struct BufferStyle {
    quad_segs: Option<i32>,
    endcap: Option<EndCap>,
    join: Option<Join>,
    mitre_level: Option<f64>,
    side: Option<Side>,
}

impl BufferStyle {
    fn is_empty(&self) -> bool {
        self.quad_segs.is_none()
            && self.endcap.is_none()
            && self.join.is_none()
            && self.mitre_level.is_none()
            && self.side.is_none()
    }

    fn apply(&self, params: Params<GeometryArgument>) -> Params<GeometryArgument> {
        params
            .set_opt("style_side", self.side)
            .set_opt("style_mitre_level", self.mitre_level)
            .set_opt("style_endcap", self.endcap)
            .set_opt("style_join", self.join)
            .set_opt("style_quad_segs", self.quad_segs)
    }

    fn expected_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(v) = self.quad_segs {
            parts.push(format!("quad_segs={v}"));
        }
        if let Some(v) = self.endcap {
            parts.push(format!("endcap={v}"));
        }
        if let Some(v) = self.join {
            parts.push(format!("join={v}"));
        }
        if let Some(v) = self.mitre_level {
            parts.push(format!("mitre_level={v}"));
        }
        if let Some(v) = self.side {
            parts.push(format!("side={v}"));
        }
        parts.join(",")
    }
}

fn buffer_style() -> impl Strategy<Value = BufferStyle> {
    (
        proptest::option::of(1..64i32),
        proptest::option::of(proptest::sample::select(EndCap::ALL)),
        proptest::option::of(proptest::sample::select(Join::ALL)),
        proptest::option::of(0.5..10.0f64),
        proptest::option::of(proptest::sample::select(Side::ALL)),
    )
        .prop_map(|(quad_segs, endcap, join, mitre_level, side)| BufferStyle {
            quad_segs,
            endcap,
            join,
            mitre_level,
            side,
        })
}

/// Optional offset curve style members, `None` meaning absent.
#[derive(Debug, Clone)]
struct OffsetCurveStyle {
    segments: Option<i32>,
    join: Option<Join>,
    mitre_level: Option<f64>,
}

impl OffsetCurveStyle {
    fn is_empty(&self) -> bool {
        self.segments.is_none() && self.join.is_none() && self.mitre_level.is_none()
    }

    fn apply(&self, params: Params<GeometryArgument>) -> Params<GeometryArgument> {
        params
            .set_opt("style_mitre_level", self.mitre_level)
            .set_opt("style_join", self.join)
            .set_opt("num_seg_quarter_circle", self.segments)
    }

    fn expected_text(&self) -> String {
        let mut parts = Vec::new();
        if let Some(v) = self.segments {
            parts.push(format!("quad_segs={v}"));
        }
        if let Some(v) = self.join {
            parts.push(format!("join={v}"));
        }
        if let Some(v) = self.mitre_level {
            parts.push(format!("mitre_level={v}"));
        }
        parts.join(",")
    }
}

fn offset_curve_style() -> impl Strategy<Value = OffsetCurveStyle> {
    (
        proptest::option::of(1..32i32),
        proptest::option::of(proptest::sample::select(Join::ALL)),
        proptest::option::of(0.5..10.0f64),
    )
        .prop_map(|(segments, join, mitre_level)| OffsetCurveStyle {
            segments,
            join,
            mitre_level,
        })
}

proptest! {
    #[test]
    fn buffer_style_emits_one_ordered_text_argument(
        radius in -100.0..100.0f64,
        style in buffer_style(),
    ) {
        let params = style.apply(Params::new().set("radius", radius));
        let expr = build(Operation::Buffer, vec![geom()], params).unwrap();
        let args = expr.arguments();

        prop_assert_eq!(&args[0], &Argument::Geometry(geom()));
        prop_assert_eq!(&args[1], &Argument::Value(Value::Float(radius)));
        if style.is_empty() {
            prop_assert_eq!(args.len(), 2);
        } else {
            prop_assert_eq!(args.len(), 3);
            prop_assert_eq!(
                &args[2],
                &Argument::Value(Value::Text(style.expected_text()))
            );
        }
    }

    #[test]
    fn buffer_style_and_shortcut_are_exclusive(
        style in buffer_style(),
        segments in 1..64i32,
    ) {
        prop_assume!(!style.is_empty());
        let params = style.apply(
            Params::new()
                .set("radius", 1.0)
                .set("num_seg_quarter_circle", segments),
        );
        let result = build(Operation::Buffer, vec![geom()], params);
        let is_exclusive_error = matches!(result, Err(ValidationError::MutuallyExclusive { .. }));
        prop_assert!(is_exclusive_error);
    }

    #[test]
    fn offset_curve_style_members_fold_into_one_argument(
        distance in -50.0..50.0f64,
        style in offset_curve_style(),
    ) {
        let params = style.apply(Params::new().set("signed_distance", distance));
        let expr = build(Operation::OffsetCurve, vec![geom()], params).unwrap();
        let args = expr.arguments();

        prop_assert_eq!(&args[1], &Argument::Value(Value::Float(distance)));
        if style.is_empty() {
            prop_assert_eq!(args.len(), 2);
        } else {
            prop_assert_eq!(args.len(), 3);
            prop_assert_eq!(
                &args[2],
                &Argument::Value(Value::Text(style.expected_text()))
            );
        }
    }

    #[test]
    fn omitting_trailing_optional_shortens_by_one(
        tolerance in 0.0..10.0f64,
        preserve in any::<bool>(),
    ) {
        let without = build(
            Operation::Simplify,
            vec![geom()],
            Params::new().set("tolerance", tolerance),
        )
        .unwrap();
        let with = build(
            Operation::Simplify,
            vec![geom()],
            Params::new()
                .set("tolerance", tolerance)
                .set("preserve_collapsed", preserve),
        )
        .unwrap();
        prop_assert_eq!(with.arguments().len(), without.arguments().len() + 1);
        prop_assert!(without
            .arguments()
            .iter()
            .all(|arg| !matches!(arg, Argument::Null(_))));
    }

    #[test]
    fn centroid_variant_follows_flag_presence(flag in proptest::option::of(any::<bool>())) {
        let params = Params::new().set_opt("use_spheroid", flag);
        let expr = build(Operation::Centroid, vec![geom()], params).unwrap();
        match flag {
            Some(value) => {
                prop_assert_eq!(expr.type_annotation(), Some(pgspatial_core::SpatialType::Geography));
                prop_assert_eq!(&expr.arguments()[1], &Argument::Value(Value::Bool(value)));
            }
            None => {
                prop_assert_eq!(expr.type_annotation(), None);
                prop_assert_eq!(expr.arguments().len(), 1);
            }
        }
    }
}

#[test]
fn every_operation_builds_with_only_required_parameters() {
    for op in Operation::ALL {
        let spec = op.spec();
        let geometries = spec.geometries.iter().map(|_| geom()).collect();
        let mut params = Params::new();
        for param in spec.params.iter().filter(|p| p.is_required()) {
            params.insert(param.name, 1);
        }
        let expr = build(*op, geometries, params).unwrap();
        assert_eq!(expr.function_name(), spec.sql_name);
        assert_eq!(
            expr.arguments().len(),
            spec.geometries.len() + spec.params.iter().filter(|p| p.is_required()).count()
        );
    }
}
