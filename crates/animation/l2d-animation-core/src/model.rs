//! Model runtime contract and id binding.
//!
//! The engine never parses or owns a model format. Hosts implement
//! [`ModelRuntime`] over whatever SDK object holds the parameter and part
//! arrays; [`ModelState`] is a plain in-memory implementation for adapters and
//! tests.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{AnimationError, Result};

/// Indexed parameter/part arrays the animation engine reads and mutates.
///
/// Ids, values and defaults are parallel slices; their lengths are the counts.
pub trait ModelRuntime {
    fn parameter_ids(&self) -> &[String];
    fn parameter_values(&self) -> &[f32];
    fn parameter_values_mut(&mut self) -> &mut [f32];
    fn parameter_default_values(&self) -> &[f32];

    fn part_ids(&self) -> &[String];
    fn part_opacities(&self) -> &[f32];
    fn part_opacities_mut(&mut self) -> &mut [f32];

    #[inline]
    fn parameter_count(&self) -> usize {
        self.parameter_ids().len()
    }

    #[inline]
    fn part_count(&self) -> usize {
        self.part_ids().len()
    }
}

impl<T: ModelRuntime + ?Sized> ModelRuntime for &mut T {
    fn parameter_ids(&self) -> &[String] {
        (**self).parameter_ids()
    }
    fn parameter_values(&self) -> &[f32] {
        (**self).parameter_values()
    }
    fn parameter_values_mut(&mut self) -> &mut [f32] {
        (**self).parameter_values_mut()
    }
    fn parameter_default_values(&self) -> &[f32] {
        (**self).parameter_default_values()
    }
    fn part_ids(&self) -> &[String] {
        (**self).part_ids()
    }
    fn part_opacities(&self) -> &[f32] {
        (**self).part_opacities()
    }
    fn part_opacities_mut(&mut self) -> &mut [f32] {
        (**self).part_opacities_mut()
    }
}

/// Serializable description of one parameter.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ParameterDesc {
    pub id: String,
    #[serde(default)]
    pub default: f32,
    /// Starting value; the default when omitted.
    #[serde(default)]
    pub value: Option<f32>,
}

/// Serializable description of one part.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PartDesc {
    pub id: String,
    #[serde(default)]
    pub opacity: Option<f32>,
}

/// Model layout as JSON: `{ "parameters": [...], "parts": [...] }`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelDesc {
    #[serde(default)]
    pub parameters: Vec<ParameterDesc>,
    #[serde(default)]
    pub parts: Vec<PartDesc>,
}

/// In-memory [`ModelRuntime`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelState {
    parameter_ids: Vec<String>,
    parameter_values: Vec<f32>,
    parameter_defaults: Vec<f32>,
    part_ids: Vec<String>,
    part_opacities: Vec<f32>,
}

impl ModelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_desc(desc: &ModelDesc) -> Self {
        let mut state = Self::new();
        for p in &desc.parameters {
            state.add_parameter(&p.id, p.default);
            if let (Some(v), Some(slot)) = (p.value, state.parameter_values.last_mut()) {
                *slot = v;
            }
        }
        for part in &desc.parts {
            state.add_part(&part.id);
            if let (Some(o), Some(slot)) = (part.opacity, state.part_opacities.last_mut()) {
                *slot = o;
            }
        }
        state
    }

    /// Append a parameter whose value starts at its default. Returns its index.
    pub fn add_parameter(&mut self, id: &str, default: f32) -> usize {
        self.parameter_ids.push(id.to_string());
        self.parameter_defaults.push(default);
        self.parameter_values.push(default);
        self.parameter_ids.len() - 1
    }

    /// Append a fully opaque part. Returns its index.
    pub fn add_part(&mut self, id: &str) -> usize {
        self.part_ids.push(id.to_string());
        self.part_opacities.push(1.0);
        self.part_ids.len() - 1
    }

    pub fn with_parameter(mut self, id: &str, default: f32) -> Self {
        self.add_parameter(id, default);
        self
    }

    pub fn with_part(mut self, id: &str) -> Self {
        self.add_part(id);
        self
    }

    /// Value of the first parameter named `id`.
    pub fn parameter(&self, id: &str) -> Option<f32> {
        let idx = self.parameter_ids.iter().position(|p| p == id)?;
        self.parameter_values.get(idx).copied()
    }

    /// Set the first parameter named `id`. Returns false if absent.
    pub fn set_parameter(&mut self, id: &str, value: f32) -> bool {
        match self.parameter_ids.iter().position(|p| p == id) {
            Some(idx) => {
                self.parameter_values[idx] = value;
                true
            }
            None => false,
        }
    }

    pub fn part_opacity(&self, id: &str) -> Option<f32> {
        let idx = self.part_ids.iter().position(|p| p == id)?;
        self.part_opacities.get(idx).copied()
    }
}

impl ModelRuntime for ModelState {
    fn parameter_ids(&self) -> &[String] {
        &self.parameter_ids
    }
    fn parameter_values(&self) -> &[f32] {
        &self.parameter_values
    }
    fn parameter_values_mut(&mut self) -> &mut [f32] {
        &mut self.parameter_values
    }
    fn parameter_default_values(&self) -> &[f32] {
        &self.parameter_defaults
    }
    fn part_ids(&self) -> &[String] {
        &self.part_ids
    }
    fn part_opacities(&self) -> &[f32] {
        &self.part_opacities
    }
    fn part_opacities_mut(&mut self) -> &mut [f32] {
        &mut self.part_opacities
    }
}

/// Id → index maps for one model, built once per binding.
///
/// Duplicate ids resolve to their first occurrence.
#[derive(Clone, Debug, Default)]
pub struct ModelBinding {
    parameters: HashMap<String, usize>,
    parts: HashMap<String, usize>,
}

impl ModelBinding {
    pub fn new<M: ModelRuntime + ?Sized>(model: &M) -> Self {
        Self {
            parameters: index_ids(model.parameter_ids()),
            parts: index_ids(model.part_ids()),
        }
    }

    #[inline]
    pub fn parameter_index(&self, id: &str) -> Option<usize> {
        self.parameters.get(id).copied()
    }

    #[inline]
    pub fn part_index(&self, id: &str) -> Option<usize> {
        self.parts.get(id).copied()
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }
}

fn index_ids(ids: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::with_capacity(ids.len());
    for (idx, id) in ids.iter().enumerate() {
        map.entry(id.clone()).or_insert(idx);
    }
    map
}

/// What a parameter group's ids refer to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum GroupTarget {
    Parameter,
    Part,
    #[serde(other)]
    Other,
}

/// Named id set from a model settings document (e.g. "EyeBlink", "LipSync").
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterGroup {
    pub target: GroupTarget,
    pub name: String,
    #[serde(default)]
    pub ids: Vec<String>,
}

/// Groups consulted by model-level curves.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ParameterGroups {
    pub groups: Vec<ParameterGroup>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ModelSettingsGroups {
    #[serde(default)]
    groups: Option<ParameterGroups>,
}

impl ParameterGroups {
    pub fn new(groups: Vec<ParameterGroup>) -> Self {
        Self { groups }
    }

    /// First group whose name is `id`.
    pub fn get_group_by_id(&self, id: &str) -> Option<&ParameterGroup> {
        self.groups.iter().find(|g| g.name == id)
    }

    /// Read the `"Groups"` array of a model settings document. A document
    /// without groups yields an empty set.
    pub fn from_model_settings_json(s: &str) -> Result<Self> {
        let settings: ModelSettingsGroups = serde_json::from_str(s)
            .map_err(|e| AnimationError::MalformedModelSettings(e.to_string()))?;
        Ok(settings.groups.unwrap_or_default())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
