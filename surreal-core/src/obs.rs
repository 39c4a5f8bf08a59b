//! Observations.
use crate::Array;
use ndarray::{Array1, Array3};

/// Visual and flat components of an observation.
///
/// Produced by the concatenation stage and transformed by the stages after it.
/// At most one visual component exists at any stage. An empty flat component is
/// represented as `None`, never as an empty vector.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitObs {
    /// Pixels in channel-first layout, `(c, h, w)`.
    pub visual: Option<Array3<u8>>,

    /// Concatenated rank-1 features.
    pub flat: Option<Array1<f64>>,
}

impl SplitObs {
    /// Constructs a [`SplitObs`], collapsing an empty flat vector to `None`.
    pub fn new(visual: Option<Array3<u8>>, flat: Option<Array1<f64>>) -> Self {
        let flat = flat.filter(|f| !f.is_empty());
        Self { visual, flat }
    }
}

/// An observation at some stage of a pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum Observation {
    /// A single array, passed through from classic-control backends.
    Array(Array),

    /// Named arrays, in the order the backend emits them.
    Dict(Vec<(String, Array)>),

    /// Visual and flat components.
    Split(SplitObs),
}

impl Observation {
    /// Returns the split components if this observation has been concatenated.
    pub fn as_split(&self) -> Option<&SplitObs> {
        match self {
            Self::Split(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a named array of a dict observation.
    pub fn get(&self, key: &str) -> Option<&Array> {
        match self {
            Self::Dict(items) => items.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
            Self::Split(_) => "split",
        }
    }
}

impl From<SplitObs> for Observation {
    fn from(obs: SplitObs) -> Self {
        Self::Split(obs)
    }
}
