//! Named numeric parameters that can be adjusted while the app runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamError {
    #[error("unknown parameter '{0}'")]
    Unknown(String),
    #[error("parameter '{name}' must be finite, got {value}")]
    NotFinite { name: String, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweakParam {
    pub label: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl TweakParam {
    pub fn new(label: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            label: label.into(),
            value: value.clamp(min, max),
            min,
            max,
        }
    }
}

/// Parameters keyed by name, serialized in name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TweakParams {
    params: BTreeMap<String, TweakParam>,
}

impl TweakParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parameter, replacing any previous one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, param: TweakParam) {
        self.params.insert(name.into(), param);
    }

    pub fn with(mut self, name: impl Into<String>, param: TweakParam) -> Self {
        self.insert(name, param);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.params.get(name).map(|p| p.value)
    }

    pub fn param(&self, name: &str) -> Option<&TweakParam> {
        self.params.get(name)
    }

    /// Set `name` to `value` clamped into its range. Returns the stored value.
    pub fn set(&mut self, name: &str, value: f64) -> Result<f64, ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NotFinite {
                name: name.to_string(),
                value,
            });
        }
        let param = self
            .params
            .get_mut(name)
            .ok_or_else(|| ParamError::Unknown(name.to_string()))?;
        param.value = value.clamp(param.min, param.max);
        Ok(param.value)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }
}
