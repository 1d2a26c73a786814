//! Parameter value types.
//!
//! Colors are straight RGBA in `0.0..=1.0`. Gradient stops are a first-class
//! value; the legacy `[["#rrggbb", position], ...]` JSON text is only read at
//! the decode boundary ([`ColorStops::from_json_or_default`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ParamError;

/// Linear interpolation that returns the endpoints exactly at `t <= 0` and `t >= 1`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    if t <= 0.0 {
        a
    } else if t >= 1.0 {
        b
    } else {
        a + (b - a) * t
    }
}

/// Integer [`lerp`] that stays exact at the endpoints and for `a == b`,
/// including values beyond `f64`'s 53-bit mantissa.
pub fn lerp_int(a: i64, b: i64, t: f64) -> i64 {
    if t <= 0.0 || a == b {
        return a;
    }
    if t >= 1.0 {
        return b;
    }
    let step = ((b as i128 - a as i128) as f64 * t).round() as i128;
    (a as i128 + step).clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

// ============================================================================
// Colors
// ============================================================================

/// Straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` (hash optional, any case).
    pub fn parse_code(code: &str) -> Option<Self> {
        let hex = code.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let expanded: String = match hex.len() {
            3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => hex.to_string(),
            _ => return None,
        };

        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i * 2..i * 2 + 2], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        let alpha = if expanded.len() == 8 { channel(3)? } else { 1.0 };
        Some(Self::new(channel(0)?, channel(1)?, channel(2)?, alpha))
    }

    /// Lowercase hex code; alpha is emitted only when it is not fully opaque.
    pub fn to_code(self, include_hash: bool) -> String {
        let [r, g, b, a] = self.to_bytes();
        let mut code = String::with_capacity(9);
        if include_hash {
            code.push('#');
        }
        code.push_str(&format!("{r:02x}{g:02x}{b:02x}"));
        if a != 255 {
            code.push_str(&format!("{a:02x}"));
        }
        code
    }

    pub fn to_bytes(self) -> [u8; 4] {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b), quantize(self.a)]
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Every component clamped into `0.0..=1.0`; NaN becomes 0.
    pub fn clamped(&self) -> Self {
        let clamp = |c: f32| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
        Self::new(clamp(self.r), clamp(self.g), clamp(self.b), clamp(self.a))
    }

    /// Component-wise [`lerp`].
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        let mix = |a: f32, b: f32| lerp(a as f64, b as f64, t) as f32;
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

impl Default for ColorRgba {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for ColorRgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_code(true))
    }
}

// ============================================================================
// Gradient stops
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub color: ColorRgba,
    /// Position along the gradient (0.0 - 1.0).
    pub position: f32,
}

impl ColorStop {
    pub const fn new(color: ColorRgba, position: f32) -> Self {
        Self { color, position }
    }
}

/// Ordered gradient stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorStops(Vec<ColorStop>);

impl ColorStops {
    pub fn new(stops: Vec<ColorStop>) -> Self {
        Self(stops)
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Positions clamped to `[0, 1]`, colors clamped, stops sorted by position.
    ///
    /// The sort is stable, so stops sharing a position keep their order.
    pub fn normalized(&self) -> Self {
        let mut stops: Vec<ColorStop> = self
            .0
            .iter()
            .map(|stop| {
                let position = if stop.position.is_nan() {
                    0.0
                } else {
                    stop.position.clamp(0.0, 1.0)
                };
                ColorStop::new(stop.color.clamped(), position)
            })
            .collect();
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self(stops)
    }

    /// Color at `position`, assuming sorted stops.
    ///
    /// Positions before the first stop take its color, after the last stop
    /// take the last color. An empty list samples as black.
    pub fn sample(&self, position: f32) -> ColorRgba {
        let (Some(first), Some(last)) = (self.0.first(), self.0.last()) else {
            return ColorRgba::BLACK;
        };
        if position <= first.position {
            return first.color;
        }
        if position >= last.position {
            return last.color;
        }

        for pair in self.0.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            if position <= hi.position {
                let span = hi.position - lo.position;
                if span <= f32::EPSILON {
                    return hi.color;
                }
                let t = (position - lo.position) / span;
                return lo.color.lerp(&hi.color, t as f64);
            }
        }
        last.color
    }

    /// Apply `remap` to every stop color.
    pub fn map_colors(&self, remap: impl Fn(ColorRgba) -> ColorRgba) -> Self {
        Self(
            self.0
                .iter()
                .map(|stop| ColorStop::new(remap(stop.color), stop.position))
                .collect(),
        )
    }

    /// Element-wise interpolation of equally long lists; otherwise a
    /// switch at `t < 0.5`.
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        if self.len() != other.len() {
            return if t < 0.5 { self.clone() } else { other.clone() };
        }
        Self(
            self.0
                .iter()
                .zip(&other.0)
                .map(|(a, b)| {
                    ColorStop::new(
                        a.color.lerp(&b.color, t),
                        lerp(a.position as f64, b.position as f64, t) as f32,
                    )
                })
                .collect(),
        )
    }

    /// Decode the legacy text form: a JSON array of `[colorCode, position]`.
    pub fn from_json(text: &str) -> Result<Self, ParamError> {
        let pairs: Vec<(String, f32)> = serde_json::from_str(text)?;
        let stops = pairs
            .into_iter()
            .map(|(code, position)| {
                ColorRgba::parse_code(&code)
                    .map(|color| ColorStop::new(color, position))
                    .ok_or(ParamError::InvalidColor(code))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(stops).normalized())
    }

    /// Like [`from_json`](Self::from_json), falling back to the default
    /// black-to-white gradient on malformed input.
    pub fn from_json_or_default(text: &str) -> Self {
        match Self::from_json(text) {
            Ok(stops) => stops,
            Err(e) => {
                log::warn!("Invalid color stops {:?}, using default: {}", text, e);
                Self::default()
            }
        }
    }

    /// Encode in the legacy text form.
    pub fn to_json(&self) -> String {
        let pairs: Vec<(String, f32)> = self
            .0
            .iter()
            .map(|stop| (stop.color.to_code(true), stop.position))
            .collect();
        // A Vec of (String, f32) always serializes.
        serde_json::to_string(&pairs).unwrap_or_else(|_| String::from("[]"))
    }
}

impl Default for ColorStops {
    fn default() -> Self {
        Self(vec![
            ColorStop::new(ColorRgba::BLACK, 0.0),
            ColorStop::new(ColorRgba::WHITE, 1.0),
        ])
    }
}

// ============================================================================
// Dynamic values
// ============================================================================

/// Declared kind of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamKind {
    Real,
    Int,
    Bool,
    String,
    Color,
    ColorStops,
}

impl ParamKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Color => "color",
            Self::ColorStops => "color-stops",
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete parameter value.
///
/// Serialized untagged, so persisted sets read as plain JSON
/// (`{"radius": 4.0, "preset": "sepia"}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Real(f64),
    String(String),
    Color(ColorRgba),
    ColorStops(ColorStops),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            Self::Real(_) => ParamKind::Real,
            Self::Int(_) => ParamKind::Int,
            Self::Bool(_) => ParamKind::Bool,
            Self::String(_) => ParamKind::String,
            Self::Color(_) => ParamKind::Color,
            Self::ColorStops(_) => ParamKind::ColorStops,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<ColorRgba> {
        match self {
            Self::Color(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color_stops(&self) -> Option<&ColorStops> {
        match self {
            Self::ColorStops(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<ColorRgba> for ParamValue {
    fn from(v: ColorRgba) -> Self {
        Self::Color(v)
    }
}

impl From<ColorStops> for ParamValue {
    fn from(v: ColorStops) -> Self {
        Self::ColorStops(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints_are_exact() {
        assert_eq!(lerp(0.1, 0.7, 0.0), 0.1);
        assert_eq!(lerp(0.1, 0.7, 1.0), 0.7);
        assert_eq!(lerp(0.1, 0.7, 2.0), 0.7);
        assert_eq!(lerp(2.0, 4.0, 0.25), 2.5);
    }

    #[test]
    fn test_parse_color_code() {
        assert_eq!(
            ColorRgba::parse_code("#00ff88"),
            Some(ColorRgba::new(0.0, 1.0, 136.0 / 255.0, 1.0))
        );
        assert_eq!(ColorRgba::parse_code("FFF"), Some(ColorRgba::WHITE));
        assert_eq!(
            ColorRgba::parse_code("#0008"),
            Some(ColorRgba::new(0.0, 0.0, 0.0, 136.0 / 255.0))
        );
        assert_eq!(
            ColorRgba::parse_code("ffffff00"),
            Some(ColorRgba::new(1.0, 1.0, 1.0, 0.0))
        );
        assert_eq!(ColorRgba::parse_code("invalid"), None);
        assert_eq!(ColorRgba::parse_code("#12345"), None);
        assert_eq!(ColorRgba::parse_code("#ééé"), None);
    }

    #[test]
    fn test_color_code_output() {
        assert_eq!(ColorRgba::new(1.0, 0.5, 0.0, 1.0).to_code(true), "#ff8000");
        assert_eq!(ColorRgba::new(0.0, 0.0, 1.0, 0.5).to_code(false), "0000ff80");
        assert_eq!(ColorRgba::parse_code("#A1B2C3").unwrap().to_code(true), "#a1b2c3");
    }

    #[test]
    fn test_normalized_sorts_and_clamps() {
        let stops = ColorStops::new(vec![
            ColorStop::new(ColorRgba::WHITE, 1.5),
            ColorStop::new(ColorRgba::new(2.0, -1.0, 0.5, 1.0), 0.5),
            ColorStop::new(ColorRgba::BLACK, -0.2),
        ])
        .normalized();

        let positions: Vec<f32> = stops.stops().iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0.0, 0.5, 1.0]);
        assert_eq!(stops.stops()[1].color, ColorRgba::new(1.0, 0.0, 0.5, 1.0));
        assert_eq!(stops.normalized(), stops);
    }

    #[test]
    fn test_sample() {
        let stops = ColorStops::new(vec![
            ColorStop::new(ColorRgba::BLACK, 0.25),
            ColorStop::new(ColorRgba::WHITE, 0.75),
        ]);
        assert_eq!(stops.sample(0.0), ColorRgba::BLACK);
        assert_eq!(stops.sample(1.0), ColorRgba::WHITE);
        let mid = stops.sample(0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
        assert_eq!(mid.a, 1.0);
        assert_eq!(ColorStops::new(vec![]).sample(0.3), ColorRgba::BLACK);
    }

    #[test]
    fn test_stops_json() {
        let stops = ColorStops::from_json(r##"[["#ffffff", 1.0], ["#000", 0.0]]"##).unwrap();
        assert_eq!(stops, ColorStops::default());
        assert_eq!(
            stops.to_json(),
            r##"[["#000000",0.0],["#ffffff",1.0]]"##
        );
    }

    #[test]
    fn test_stops_json_falls_back_to_default() {
        assert_eq!(ColorStops::from_json_or_default("not json"), ColorStops::default());
        assert_eq!(
            ColorStops::from_json_or_default(r#"[["nope", 0.5]]"#),
            ColorStops::default()
        );
    }

    #[test]
    fn test_stops_lerp() {
        let a = ColorStops::default();
        let b = a.map_colors(|_| ColorRgba::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&a, 0.3), a);

        let short = ColorStops::new(vec![ColorStop::new(ColorRgba::WHITE, 0.5)]);
        assert_eq!(a.lerp(&short, 0.49), a);
        assert_eq!(a.lerp(&short, 0.5), short);
    }

    #[test]
    fn test_value_json_is_untagged() {
        let values: Vec<ParamValue> =
            serde_json::from_str(r#"[true, 3, 3.5, "sepia", {"r":1,"g":0,"b":0,"a":1}]"#).unwrap();
        let kinds: Vec<ParamKind> = values.iter().map(ParamValue::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ParamKind::Bool,
                ParamKind::Int,
                ParamKind::Real,
                ParamKind::String,
                ParamKind::Color
            ]
        );
    }
}
