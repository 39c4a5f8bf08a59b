//! Routing of metrics to tensorboard runs.
use crate::{Metric, TensorplexError};
use anyhow::Result;
use std::collections::{HashMap, HashSet};

/// A scalar to be written in a run.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarEvent {
    /// Run directory relative to the server folder, e.g. `agent/0-7`.
    pub run: String,

    /// Tag in the run. Indexed groups suffix it with the index.
    pub tag: String,

    /// Global step.
    pub step: usize,

    /// The scalar.
    pub value: f32,
}

/// Normal and indexed groups known to the server.
#[derive(Clone, Debug)]
pub struct Groups {
    normal: HashSet<String>,
    indexed: HashMap<String, usize>,
}

impl Groups {
    /// `index_bin_sizes[i]` is the bin size of `indexed_groups[i]`.
    pub fn new(
        normal_groups: &[&str],
        indexed_groups: &[&str],
        index_bin_sizes: &[usize],
    ) -> Result<Self> {
        if indexed_groups.len() != index_bin_sizes.len() || index_bin_sizes.contains(&0) {
            return Err(TensorplexError::InvalidBinSize(format!(
                "{:?} for groups {:?}",
                index_bin_sizes, indexed_groups
            ))
            .into());
        }
        let normal: HashSet<String> = normal_groups.iter().map(|g| g.to_string()).collect();
        let mut indexed = HashMap::new();
        for (g, bin) in indexed_groups.iter().zip(index_bin_sizes.iter()) {
            if normal.contains(*g) || indexed.insert(g.to_string(), *bin).is_some() {
                return Err(TensorplexError::DuplicateGroup(g.to_string()).into());
            }
        }
        Ok(Self { normal, indexed })
    }

    /// Maps the values of a metric to the scalars of its run.
    pub fn route(&self, metric: Metric) -> Result<Vec<ScalarEvent>> {
        let Metric {
            group,
            id,
            index,
            step,
            values,
        } = metric;

        let events = if self.normal.contains(&group) {
            let id = id.ok_or_else(|| TensorplexError::MissingId(group.clone()))?;
            let run = format!("{}/{}", group, id);
            values
                .into_iter()
                .map(|(tag, value)| ScalarEvent {
                    run: run.clone(),
                    tag,
                    step,
                    value,
                })
                .collect()
        } else if let Some(bin) = self.indexed.get(&group) {
            let index = index.ok_or_else(|| TensorplexError::MissingIndex(group.clone()))?;
            let lo = index / bin * bin;
            let run = format!("{}/{}-{}", group, lo, lo + bin - 1);
            values
                .into_iter()
                .map(|(tag, value)| ScalarEvent {
                    run: run.clone(),
                    tag: format!("{}/{}", tag, index),
                    step,
                    value,
                })
                .collect()
        } else {
            return Err(TensorplexError::UnknownGroup(group).into());
        };
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AGENT_GROUP_NAME, NONAGENT_GROUP_NAME};

    fn groups() -> Groups {
        Groups::new(&[NONAGENT_GROUP_NAME], &[AGENT_GROUP_NAME], &[8]).unwrap()
    }

    #[test]
    fn test_normal_group() -> Result<()> {
        let m = Metric::normal("nonagent", "learner", 5).value("loss", 0.5);
        assert_eq!(
            groups().route(m)?,
            vec![ScalarEvent {
                run: "nonagent/learner".to_string(),
                tag: "loss".to_string(),
                step: 5,
                value: 0.5
            }]
        );
        Ok(())
    }

    #[test]
    fn test_indexed_group_bins() -> Result<()> {
        for (index, run) in [(0, "agent/0-7"), (7, "agent/0-7"), (8, "agent/8-15"), (21, "agent/16-23")] {
            let events = groups().route(Metric::indexed("agent", index, 1).value("reward", 1.0))?;
            assert_eq!(events[0].run, run);
            assert_eq!(events[0].tag, format!("reward/{}", index));
        }
        Ok(())
    }

    #[test]
    fn test_rejected_metrics() {
        let g = groups();
        for m in [
            Metric::normal("learner", "0", 0),
            Metric::indexed("nonagent", 0, 0),
            Metric::normal("agent", "0", 0),
        ] {
            assert!(g.route(m).is_err());
        }
    }

    #[test]
    fn test_invalid_groups() {
        assert!(Groups::new(&[], &["agent"], &[]).is_err());
        assert!(Groups::new(&[], &["agent"], &[0]).is_err());
        assert!(Groups::new(&["agent"], &["agent"], &[8]).is_err());
    }
}
