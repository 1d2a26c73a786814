//! Schema-driven lifecycle hooks.
//!
//! All four are pure and total: they never fail and never touch their inputs.
//! Effects call these from their own hook overrides and layer cross-field
//! rules on top.

use super::{lerp, lerp_int, ColorRgba, ParamDescriptor, ParamKind, ParamUnit, ParamValue};
use super::{ParameterSchema, ParameterSet};

/// Clamp every field into its declared constraints.
///
/// Missing or mistyped fields take the default, unknown keys are dropped, and
/// out-of-enum strings fall back to the default. Idempotent.
pub fn normalize(schema: &ParameterSchema, params: &ParameterSet) -> ParameterSet {
    schema
        .iter()
        .map(|(name, descriptor)| {
            let value = match params.get(name) {
                Some(value) => normalize_value(descriptor, value),
                None => normalize_value(descriptor, &descriptor.default),
            };
            (name.to_string(), value)
        })
        .collect()
}

fn normalize_value(descriptor: &ParamDescriptor, value: &ParamValue) -> ParamValue {
    match (descriptor.kind, value) {
        (ParamKind::Real, ParamValue::Real(_) | ParamValue::Int(_)) => {
            let v = value.as_real().unwrap_or(f64::NAN);
            if v.is_nan() {
                let fallback = descriptor.default.as_real().unwrap_or(0.0);
                ParamValue::Real(clamp_range(fallback, descriptor))
            } else {
                ParamValue::Real(clamp_range(v, descriptor))
            }
        }
        (ParamKind::Int, ParamValue::Int(v)) => ParamValue::Int(clamp_int(*v, descriptor)),
        (ParamKind::String, ParamValue::String(s)) => match &descriptor.choices {
            Some(choices) if !choices.iter().any(|c| c == s) => descriptor.default.clone(),
            _ => value.clone(),
        },
        (ParamKind::Color, ParamValue::Color(c)) => ParamValue::Color(c.clamped()),
        (ParamKind::ColorStops, ParamValue::ColorStops(s)) => ParamValue::ColorStops(s.normalized()),
        (ParamKind::Bool, ParamValue::Bool(_)) => value.clone(),
        _ if value != &descriptor.default => normalize_value(descriptor, &descriptor.default),
        _ => descriptor.default.clone(),
    }
}

fn clamp_range(v: f64, descriptor: &ParamDescriptor) -> f64 {
    let mut v = v;
    if let Some(min) = descriptor.min {
        v = v.max(min);
    }
    if let Some(max) = descriptor.max {
        v = v.min(max);
    }
    v
}

fn clamp_int(v: i64, descriptor: &ParamDescriptor) -> i64 {
    let mut v = v;
    if let Some(min) = descriptor.min {
        v = v.max(min.ceil() as i64);
    }
    if let Some(max) = descriptor.max {
        v = v.min(max.floor() as i64);
    }
    v
}

/// Multiply every pixel-unit field by `factor`; integers round to nearest.
pub fn rescale(schema: &ParameterSchema, params: &ParameterSet, factor: f64) -> ParameterSet {
    params
        .iter()
        .map(|(name, value)| {
            let pixels = schema
                .get(name)
                .is_some_and(|d| d.unit == ParamUnit::Pixels);
            let scaled = match value {
                ParamValue::Real(v) if pixels => ParamValue::Real(v * factor),
                ParamValue::Int(v) if pixels => {
                    ParamValue::Int((*v as f64 * factor).round() as i64)
                }
                other => other.clone(),
            };
            (name.to_string(), scaled)
        })
        .collect()
}

/// Blend two sets at `t`.
///
/// Reals and colors blend linearly, integers blend and round, gradient stops
/// blend element-wise. Booleans, strings and mismatched kinds switch from `a`
/// to `b` at `t = 0.5`. `t` outside `[0, 1]` returns the nearer endpoint.
pub fn interpolate(
    schema: &ParameterSchema,
    a: &ParameterSet,
    b: &ParameterSet,
    t: f64,
) -> ParameterSet {
    schema
        .iter()
        .map(|(name, descriptor)| {
            let value = match (a.get(name), b.get(name)) {
                (Some(va), Some(vb)) => interpolate_value(va, vb, t),
                (Some(v), None) | (None, Some(v)) => v.clone(),
                (None, None) => descriptor.default.clone(),
            };
            (name.to_string(), value)
        })
        .collect()
}

fn interpolate_value(a: &ParamValue, b: &ParamValue, t: f64) -> ParamValue {
    match (a, b) {
        (ParamValue::Real(x), ParamValue::Real(y)) => ParamValue::Real(lerp(*x, *y, t)),
        (ParamValue::Int(x), ParamValue::Int(y)) => ParamValue::Int(lerp_int(*x, *y, t)),
        (ParamValue::Color(x), ParamValue::Color(y)) => ParamValue::Color(x.lerp(y, t)),
        (ParamValue::ColorStops(x), ParamValue::ColorStops(y)) => {
            ParamValue::ColorStops(x.lerp(y, t))
        }
        _ if t < 0.5 => a.clone(),
        _ => b.clone(),
    }
}

/// Apply `remap` to every color and every gradient stop color.
pub fn adjust_colors(params: &ParameterSet, remap: &dyn Fn(ColorRgba) -> ColorRgba) -> ParameterSet {
    params
        .iter()
        .map(|(name, value)| {
            let adjusted = match value {
                ParamValue::Color(c) => ParamValue::Color(remap(*c)),
                ParamValue::ColorStops(stops) => ParamValue::ColorStops(stops.map_colors(remap)),
                other => other.clone(),
            };
            (name.to_string(), adjusted)
        })
        .collect()
}
