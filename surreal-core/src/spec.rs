//! Observation and action specifications.
//!
//! Specs are recomputed by every stage of a pipeline so that, for any stage,
//! `spec_after = f(spec_before)` where `f` mirrors the transform the stage applies to
//! observations at runtime. Agents build their models from the final spec.
use serde::{Deserialize, Serialize};

/// Element type of an array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// `uint8`.
    U8,
    /// `float32`.
    F32,
    /// `float64`.
    F64,
}

/// Shape and element type of an array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArraySpec {
    /// Name of the array, e.g. `pixels`.
    pub name: Option<String>,

    /// Shape.
    pub shape: Vec<usize>,

    /// Element type.
    pub dtype: DType,
}

impl ArraySpec {
    /// Constructs an [`ArraySpec`].
    pub fn new(shape: Vec<usize>, dtype: DType, name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            shape,
            dtype,
        }
    }

    /// The spec of pixels in channel-first layout, `(c, h, w)`.
    pub fn pixels(c: usize, h: usize, w: usize) -> Self {
        Self::new(vec![c, h, w], DType::U8, Some("pixels"))
    }
}

/// An [`ArraySpec`] with element-wise bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundedArraySpec {
    /// Shape, element type and name.
    #[serde(flatten)]
    pub spec: ArraySpec,

    /// Lower bounds.
    pub minimum: Vec<f64>,

    /// Upper bounds.
    pub maximum: Vec<f64>,
}

/// Kind of a space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecType {
    /// Continuous values in a box.
    Continuous,

    /// A finite set of values. No adapter emits this kind for now.
    Discrete,
}

/// `dim` field of an [`EnvSpec`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dim {
    /// Shape of a single array.
    Shape(Vec<usize>),

    /// Visual and flat components after concatenation, serialized as the pair
    /// `(visual, flat)`.
    ///
    /// The visual spec is channel first, and the flat one is the length of the flat
    /// vector. `None` means the component is absent.
    Split(Option<ArraySpec>, Option<usize>),
}

/// The `{type, dim}` spec consumed by agent model construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvSpec {
    /// Kind of the space.
    #[serde(rename = "type")]
    pub ty: SpecType,

    /// Dimension.
    pub dim: Dim,
}

impl EnvSpec {
    /// A continuous spec of a single array.
    pub fn continuous(shape: Vec<usize>) -> Self {
        Self {
            ty: SpecType::Continuous,
            dim: Dim::Shape(shape),
        }
    }

    /// A continuous spec of visual and flat components.
    pub fn split(visual: Option<ArraySpec>, flat: Option<usize>) -> Self {
        Self {
            ty: SpecType::Continuous,
            dim: Dim::Split(visual, flat),
        }
    }
}

/// Format in which specs of an environment are expressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecFormat {
    /// `{type, dim}` specs.
    SurrealClassic,

    /// Named array specs of physics backends.
    DmControl,
}

/// Spec of observations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationSpec {
    /// `{type, dim}` spec.
    Classic(EnvSpec),

    /// Named arrays, in the order the backend emits them.
    DmControl(Vec<(String, ArraySpec)>),
}

impl ObservationSpec {
    /// Format of this spec.
    pub fn format(&self) -> SpecFormat {
        match self {
            Self::Classic(_) => SpecFormat::SurrealClassic,
            Self::DmControl(_) => SpecFormat::DmControl,
        }
    }
}

/// Spec of actions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSpec {
    /// `{type, dim}` spec.
    Classic(EnvSpec),

    /// Bounded array spec of physics backends.
    DmControl(BoundedArraySpec),
}

impl ActionSpec {
    /// Shape of an action.
    pub fn shape(&self) -> Option<&[usize]> {
        match self {
            Self::Classic(EnvSpec {
                dim: Dim::Shape(shape),
                ..
            }) => Some(shape),
            Self::Classic(_) => None,
            Self::DmControl(b) => Some(&b.spec.shape),
        }
    }

    /// Converts to a `{type, dim}` spec.
    ///
    /// Bounds are dropped.
    pub fn to_classic(&self) -> Option<EnvSpec> {
        self.shape().map(|s| EnvSpec::continuous(s.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_spec_json_layout() {
        let spec = EnvSpec::continuous(vec![3]);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json, serde_json::json!({"type": "continuous", "dim": [3]}));

        let spec = EnvSpec::split(Some(ArraySpec::pixels(4, 84, 84)), None);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["dim"][0]["shape"], serde_json::json!([4, 84, 84]));
        assert_eq!(json["dim"][1], serde_json::Value::Null);

        let spec = EnvSpec::split(Some(ArraySpec::pixels(1, 84, 84)), Some(6));
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(serde_json::from_str::<EnvSpec>(&json).unwrap(), spec);
        let spec = EnvSpec::split(None, Some(6));
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["dim"], serde_json::json!([null, 6]));
        assert_eq!(serde_json::from_value::<EnvSpec>(json).unwrap(), spec);
    }

    #[test]
    fn test_action_spec_to_classic() {
        let spec = ActionSpec::DmControl(BoundedArraySpec {
            spec: ArraySpec::new(vec![6], DType::F64, None),
            minimum: vec![-1.0; 6],
            maximum: vec![1.0; 6],
        });
        assert_eq!(spec.to_classic(), Some(EnvSpec::continuous(vec![6])));
    }
}
