//! Metrics sent by processes, one JSON object per line.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scalar values reported by a process at a step.
///
/// Processes of a normal group set `id`, processes of an indexed group set `index`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Metric {
    /// Group of the process, e.g. `agent`.
    pub group: String,

    /// Name of the process in a normal group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Index of the process in an indexed group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    /// Global step of the values.
    pub step: usize,

    /// Values by tag.
    pub values: BTreeMap<String, f32>,
}

impl Metric {
    /// Metric of process `id` in a normal group.
    pub fn normal(group: &str, id: &str, step: usize) -> Self {
        Self {
            group: group.to_string(),
            id: Some(id.to_string()),
            index: None,
            step,
            values: BTreeMap::new(),
        }
    }

    /// Metric of process `index` in an indexed group.
    pub fn indexed(group: &str, index: usize, step: usize) -> Self {
        Self {
            group: group.to_string(),
            id: None,
            index: Some(index),
            step,
            values: BTreeMap::new(),
        }
    }

    /// Adds a value.
    pub fn value(mut self, tag: &str, v: f32) -> Self {
        self.values.insert(tag.to_string(), v);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() -> anyhow::Result<()> {
        let m = Metric::indexed("agent", 3, 100).value("reward", 1.5);
        let line = serde_json::to_string(&m)?;
        assert_eq!(
            line,
            r#"{"group":"agent","index":3,"step":100,"values":{"reward":1.5}}"#
        );

        let m: Metric = serde_json::from_str(r#"{"group":"nonagent","id":"learner","step":1,"values":{}}"#)?;
        assert_eq!(m, Metric::normal("nonagent", "learner", 1));
        Ok(())
    }
}
