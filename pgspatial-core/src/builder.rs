//! Generic assembly of a PostGIS call from an [`Operation`]'s schema.

use tracing::{debug, trace};

use crate::catalog::{Operation, OperationSpec, ParamDefault, ParamKind, ParamSpec, Presence};
use crate::enums::SpatialType;
use crate::error::{Result, ValidationError};
use crate::expression::{Argument, SqlExpression, Value};
use crate::params::{ParamValue, Params};

/// Build the SQL call for `operation`.
///
/// Arguments are laid out as: geometry operands, required parameters, the
/// style string (if any member is set), the shortcut parameter, the
/// remaining optional parameters and finally the geography flag. Absent
/// trailing optionals are dropped; an absent optional followed by a present
/// one is filled from its declared default.
///
/// ```
/// use pgspatial_core::{build, GeometryArgument, Operation, Params};
///
/// let expr = build(
///     Operation::OffsetCurve,
///     vec![GeometryArgument::column("geom")],
///     Params::new().set("signed_distance", 3.0),
/// )
/// .unwrap();
/// assert_eq!(expr.to_string(), r#"ST_OffsetCurve("geom", 3.0)"#);
/// ```
pub fn build<G>(
    operation: Operation,
    geometries: Vec<G>,
    params: Params<G>,
) -> Result<SqlExpression<G>> {
    let spec = operation.spec();
    match assemble(spec, geometries, params) {
        Ok(expr) => {
            trace!(
                function = spec.sql_name,
                arguments = expr.arguments().len(),
                annotation = ?expr.type_annotation(),
                "built spatial expression"
            );
            Ok(expr)
        }
        Err(err) => {
            debug!(function = spec.sql_name, error = %err, "rejected spatial expression");
            Err(err)
        }
    }
}

fn assemble<G>(
    spec: &'static OperationSpec,
    geometries: Vec<G>,
    mut params: Params<G>,
) -> Result<SqlExpression<G>> {
    validate(spec, &geometries, &params)?;

    let style = match spec.style {
        Some(group) => {
            let parts: Vec<String> = group
                .members
                .iter()
                .filter_map(|member| {
                    params
                        .get(member.param)
                        .map(|value| format!("{}={}", member.key, style_text(value)))
                })
                .collect();
            if !parts.is_empty() {
                if let Some(shortcut) = group.exclusive_with {
                    if params.contains(shortcut) {
                        let first = group
                            .members
                            .iter()
                            .map(|m| m.param)
                            .find(|name| params.contains(name))
                            .unwrap_or(shortcut);
                        return Err(ValidationError::MutuallyExclusive {
                            function: spec.sql_name,
                            first,
                            second: shortcut,
                        });
                    }
                }
                Some(parts.join(","))
            } else {
                None
            }
        }
        None => None,
    };

    let mut arguments: Vec<Argument<G>> = geometries.into_iter().map(Argument::Geometry).collect();

    for param in spec.params.iter().filter(|p| p.is_required()) {
        if let Some(value) = params.take(param.name) {
            arguments.push(positional(param, value));
        }
    }

    if let Some(style) = style {
        arguments.push(Argument::Value(Value::Text(style)));
    }

    append_tail(spec, &spec.tail(), &mut params, &mut arguments)?;

    let annotation = match spec.variant {
        Some(variant) => {
            let explicit = match params.take(variant.type_param) {
                Some(ParamValue::SpatialType(ty)) => Some(ty),
                Some(ParamValue::Text(text)) => text.parse().ok(),
                _ => None,
            };
            let flag = params.take(variant.flag);
            let resolved = explicit.or_else(|| flag.is_some().then_some(SpatialType::Geography));
            if resolved == Some(SpatialType::Geography) {
                let use_flag = match flag {
                    Some(ParamValue::Bool(value)) => value,
                    _ => true,
                };
                arguments.push(Argument::Value(Value::Bool(use_flag)));
            }
            resolved
        }
        None => None,
    };

    Ok(SqlExpression::new(spec.sql_name, arguments, annotation))
}

fn validate<G>(spec: &OperationSpec, geometries: &[G], params: &Params<G>) -> Result<()> {
    if geometries.len() != spec.geometries.len() {
        return Err(ValidationError::GeometryCount {
            function: spec.sql_name,
            expected: spec.geometries.len(),
            found: geometries.len(),
        });
    }

    for name in params.names() {
        let Some(param) = spec.param(name) else {
            return Err(ValidationError::UnknownParameter {
                function: spec.sql_name,
                parameter: name.to_string(),
            });
        };
        if let Some(value) = params.get(name) {
            if !value.fits(param.kind) {
                return Err(ValidationError::WrongKind {
                    function: spec.sql_name,
                    parameter: param.name,
                    expected: param.kind,
                    found: value.kind(),
                });
            }
        }
    }

    if let Some(missing) = spec
        .params
        .iter()
        .find(|p| p.is_required() && !params.contains(p.name))
    {
        return Err(ValidationError::MissingParameter {
            function: spec.sql_name,
            parameter: missing.name,
        });
    }

    Ok(())
}

/// Append the optional positional parameters, dropping absent trailing ones
/// and filling interior gaps from defaults.
fn append_tail<G>(
    spec: &OperationSpec,
    tail: &[&'static ParamSpec],
    params: &mut Params<G>,
    arguments: &mut Vec<Argument<G>>,
) -> Result<()> {
    let Some(last_present) = tail.iter().rposition(|p| params.contains(p.name)) else {
        return Ok(());
    };

    for (idx, param) in tail[..=last_present].iter().enumerate() {
        match params.take(param.name) {
            Some(value) => arguments.push(positional(param, value)),
            None => {
                let default = match param.presence {
                    Presence::Optional(default) => default,
                    Presence::Required => ParamDefault::NoDefault,
                };
                let arg = match default {
                    ParamDefault::NoDefault => {
                        let following = tail[idx + 1..=last_present]
                            .iter()
                            .find(|p| params.contains(p.name))
                            .map_or(param.name, |p| p.name);
                        return Err(ValidationError::PositionalGap {
                            function: spec.sql_name,
                            parameter: param.name,
                            following,
                        });
                    }
                    ParamDefault::Null => Argument::Null(param.kind),
                    ParamDefault::Int(v) => Argument::Value(Value::Int(v)),
                    ParamDefault::Float(v) => Argument::Value(Value::Float(v)),
                    ParamDefault::Bool(v) => Argument::Value(Value::Bool(v)),
                };
                arguments.push(arg);
            }
        }
    }
    Ok(())
}

/// Convert a validated value into a positional argument of `param`'s kind.
fn positional<G>(param: &ParamSpec, value: ParamValue<G>) -> Argument<G> {
    let value = match value {
        ParamValue::Geometry(g) => return Argument::Geometry(g),
        ParamValue::Int(v) if param.kind == ParamKind::Float => Value::Float(f64::from(v)),
        ParamValue::Int(v) => Value::Int(v),
        ParamValue::Float(v) => Value::Float(v),
        ParamValue::Bool(v) => Value::Bool(v),
        ParamValue::Text(v) => Value::Text(v),
        ParamValue::DelaunayOutput(output) => Value::Int(output.flag()),
        ParamValue::EndCap(v) => Value::Text(v.wire_value().to_string()),
        ParamValue::Join(v) => Value::Text(v.wire_value().to_string()),
        ParamValue::Side(v) => Value::Text(v.wire_value().to_string()),
        ParamValue::SpatialType(v) => Value::Text(v.wire_value().to_string()),
    };
    Argument::Value(value)
}

/// Textual encoding of a style-string value.
fn style_text<G>(value: &ParamValue<G>) -> String {
    match value {
        ParamValue::Int(v) => v.to_string(),
        ParamValue::Float(v) => v.to_string(),
        ParamValue::Bool(v) => v.to_string(),
        ParamValue::Text(v) => v.clone(),
        ParamValue::EndCap(v) => v.wire_value().to_string(),
        ParamValue::Join(v) => v.wire_value().to_string(),
        ParamValue::Side(v) => v.wire_value().to_string(),
        ParamValue::DelaunayOutput(v) => v.flag().to_string(),
        ParamValue::SpatialType(v) => v.wire_value().to_string(),
        // Rejected by `validate`: no style member is geometry-valued.
        ParamValue::Geometry(_) => String::new(),
    }
}
