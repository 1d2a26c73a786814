//! Parameter schemas and concrete parameter sets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ColorRgba, ColorStops, ParamError, ParamKind, ParamValue};

/// Unit a numeric parameter is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamUnit {
    /// Ratios, angles, percentages, flags. Unaffected by display density.
    #[default]
    Logical,
    /// Physical pixels; rescaled with display density.
    Pixels,
}

/// Declaration of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub kind: ParamKind,
    pub default: ParamValue,
    /// Inclusive lower bound for numeric kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound for numeric kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Allowed values for string kinds.
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default)]
    pub unit: ParamUnit,
}

impl ParamDescriptor {
    fn of(default: ParamValue) -> Self {
        Self {
            kind: default.kind(),
            default,
            min: None,
            max: None,
            choices: None,
            unit: ParamUnit::Logical,
        }
    }

    pub fn real(default: f64) -> Self {
        Self::of(ParamValue::Real(default))
    }

    pub fn int(default: i64) -> Self {
        Self::of(ParamValue::Int(default))
    }

    pub fn boolean(default: bool) -> Self {
        Self::of(ParamValue::Bool(default))
    }

    pub fn string(default: &str) -> Self {
        Self::of(ParamValue::String(default.to_string()))
    }

    /// String restricted to `choices`.
    pub fn choice(default: &str, choices: &[&str]) -> Self {
        let mut descriptor = Self::string(default);
        descriptor.choices = Some(choices.iter().map(|c| c.to_string()).collect());
        descriptor
    }

    pub fn color(default: ColorRgba) -> Self {
        Self::of(ParamValue::Color(default))
    }

    pub fn color_stops(default: ColorStops) -> Self {
        Self::of(ParamValue::ColorStops(default))
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn pixels(mut self) -> Self {
        self.unit = ParamUnit::Pixels;
        self
    }
}

/// Immutable mapping from parameter name to descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSchema {
    fields: BTreeMap<String, ParamDescriptor>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field (builder style).
    pub fn with(mut self, name: &str, descriptor: ParamDescriptor) -> Self {
        self.fields.insert(name.to_string(), descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamDescriptor> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamDescriptor)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// A fully populated set of default values.
    pub fn defaults(&self) -> ParameterSet {
        ParameterSet {
            values: self
                .fields
                .iter()
                .map(|(name, d)| (name.clone(), d.default.clone()))
                .collect(),
        }
    }

    /// Check that `params` has exactly this schema's keys with matching kinds.
    pub fn validate(&self, params: &ParameterSet) -> Result<(), ParamError> {
        if let Some(name) = params.values.keys().find(|k| !self.fields.contains_key(*k)) {
            return Err(ParamError::UnknownKey(name.clone()));
        }
        for (name, descriptor) in &self.fields {
            let value = params
                .values
                .get(name)
                .ok_or_else(|| ParamError::MissingKey(name.clone()))?;
            if value.kind() != descriptor.kind {
                return Err(ParamError::KindMismatch {
                    name: name.clone(),
                    expected: descriptor.kind,
                    found: value.kind(),
                });
            }
        }
        Ok(())
    }

    /// Fill missing keys with defaults and widen integers given for real
    /// fields, then validate.
    ///
    /// This is the entry point for host-supplied or deserialized sets.
    pub fn complete(&self, partial: ParameterSet) -> Result<ParameterSet, ParamError> {
        let mut values = partial.values;
        for (name, descriptor) in &self.fields {
            match values.get(name) {
                None => {
                    values.insert(name.clone(), descriptor.default.clone());
                }
                Some(ParamValue::Int(v)) if descriptor.kind == ParamKind::Real => {
                    let widened = ParamValue::Real(*v as f64);
                    values.insert(name.clone(), widened);
                }
                Some(_) => {}
            }
        }
        let params = ParameterSet { values };
        self.validate(&params)?;
        Ok(params)
    }
}

/// Concrete values for every key of a [`ParameterSchema`].
///
/// Lifecycle hooks treat sets as values: they take one and return a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of this set with `name` set to `value`.
    pub fn with(&self, name: &str, value: impl Into<ParamValue>) -> Self {
        let mut next = self.clone();
        next.values.insert(name.to_string(), value.into());
        next
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn real(&self, name: &str) -> Result<f64, ParamError> {
        self.typed(name, ParamKind::Real, ParamValue::as_real)
    }

    pub fn int(&self, name: &str) -> Result<i64, ParamError> {
        self.typed(name, ParamKind::Int, ParamValue::as_int)
    }

    pub fn bool(&self, name: &str) -> Result<bool, ParamError> {
        self.typed(name, ParamKind::Bool, ParamValue::as_bool)
    }

    pub fn string(&self, name: &str) -> Result<&str, ParamError> {
        self.typed(name, ParamKind::String, ParamValue::as_str)
    }

    pub fn color(&self, name: &str) -> Result<ColorRgba, ParamError> {
        self.typed(name, ParamKind::Color, ParamValue::as_color)
    }

    pub fn color_stops(&self, name: &str) -> Result<&ColorStops, ParamError> {
        self.typed(name, ParamKind::ColorStops, ParamValue::as_color_stops)
    }

    pub fn to_json(&self) -> Result<String, ParamError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ParamError> {
        Ok(serde_json::from_str(text)?)
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        expected: ParamKind,
        extract: impl Fn(&'a ParamValue) -> Option<T>,
    ) -> Result<T, ParamError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| ParamError::MissingKey(name.to_string()))?;
        extract(value).ok_or_else(|| ParamError::KindMismatch {
            name: name.to_string(),
            expected,
            found: value.kind(),
        })
    }
}

impl FromIterator<(String, ParamValue)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ParameterSchema {
        ParameterSchema::new()
            .with("radius", ParamDescriptor::real(4.0).range(0.0, 100.0).pixels())
            .with("steps", ParamDescriptor::int(3))
            .with("mode", ParamDescriptor::choice("low", &["low", "high"]))
            .with("tint", ParamDescriptor::color(ColorRgba::WHITE))
    }

    #[test]
    fn test_defaults_cover_every_key() {
        let schema = schema();
        let defaults = schema.defaults();
        assert_eq!(defaults.len(), schema.len());
        assert!(schema.validate(&defaults).is_ok());
        assert_eq!(defaults.real("radius").unwrap(), 4.0);
        assert_eq!(defaults.string("mode").unwrap(), "low");
    }

    #[test]
    fn test_validate_reports_problems() {
        let schema = schema();
        let defaults = schema.defaults();

        let extra = defaults.with("bogus", true);
        assert!(matches!(schema.validate(&extra), Err(ParamError::UnknownKey(k)) if k == "bogus"));

        let wrong = defaults.with("steps", "three");
        assert!(matches!(
            schema.validate(&wrong),
            Err(ParamError::KindMismatch { expected: ParamKind::Int, found: ParamKind::String, .. })
        ));

        let partial: ParameterSet = [("steps".to_string(), ParamValue::Int(1))].into_iter().collect();
        assert!(matches!(schema.validate(&partial), Err(ParamError::MissingKey(_))));
    }

    #[test]
    fn test_complete_fills_and_widens() {
        let schema = schema();
        let partial = ParameterSet::from_json(r#"{"radius": 12}"#).unwrap();
        let full = schema.complete(partial).unwrap();
        assert_eq!(full.get("radius"), Some(&ParamValue::Real(12.0)));
        assert_eq!(full.int("steps").unwrap(), 3);
        assert_eq!(full.color("tint").unwrap(), ColorRgba::WHITE);
    }

    #[test]
    fn test_accessor_errors() {
        let params = schema().defaults();
        assert!(matches!(params.bool("radius"), Err(ParamError::KindMismatch { .. })));
        assert!(matches!(params.real("missing"), Err(ParamError::MissingKey(_))));
    }

    #[test]
    fn test_with_does_not_mutate() {
        let a = schema().defaults();
        let b = a.with("steps", 9i64);
        assert_eq!(a.int("steps").unwrap(), 3);
        assert_eq!(b.int("steps").unwrap(), 9);
    }

    #[test]
    fn test_json_round_trip() {
        let params = schema().defaults().with("mode", "high");
        let text = params.to_json().unwrap();
        assert_eq!(ParameterSet::from_json(&text).unwrap(), params);
    }
}
