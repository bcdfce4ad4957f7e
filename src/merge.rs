//! Merge selected activities into a copy of the wheel template.
//!
//! Each activity claims one unit of its month's remaining value. When the
//! month is missing or already used up, the unit overflows to the quarter
//! ring instead.

use crate::schema::{ActivityRecord, WheelNode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use tracing::debug;

/// Which nodes receive an activity's value when its parent cannot absorb it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowTarget {
    /// Nodes whose id starts with `Q` (the quarters).
    #[default]
    QuarterIds,
    /// Nodes whose parent starts with `Q` (the months under a quarter).
    QuarterChildren,
}

impl FromStr for OverflowTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quarter_ids" => Ok(Self::QuarterIds),
            "quarter_children" => Ok(Self::QuarterChildren),
            _ => anyhow::bail!(
                "Unknown overflow target: {}. Expected quarter_ids or quarter_children",
                s
            ),
        }
    }
}

impl OverflowTarget {
    fn accepts(self, node: &WheelNode) -> bool {
        match self {
            Self::QuarterIds => node.id.starts_with('Q'),
            Self::QuarterChildren => node.parent.starts_with('Q'),
        }
    }
}

/// Merge the activities whose category is selected into `template`.
///
/// The working set is built up front (template, then filtered activities in
/// order). Activity `k` only sees the template plus activities `0..=k`, the
/// same view it would have if activities were appended one at a time.
pub fn incorporate_activities(
    template: &[WheelNode],
    activities: &[ActivityRecord],
    selected: &HashSet<String>,
    overflow: OverflowTarget,
) -> Vec<WheelNode> {
    let base = template.len();
    let mut nodes: Vec<WheelNode> = template.to_vec();
    nodes.extend(
        activities
            .iter()
            .filter(|a| selected.contains(&a.category))
            .cloned()
            .map(WheelNode::from),
    );

    let mut overflowed = 0usize;
    for k in base..nodes.len() {
        let visible = k + 1;
        let parent = nodes[k].parent.clone();
        let value = nodes[k].value;

        match nodes[..visible].iter().position(|n| n.id == parent) {
            Some(idx) if nodes[idx].value > 0.0 => nodes[idx].value -= value,
            _ => {
                overflowed += 1;
                for node in nodes[..visible].iter_mut() {
                    if overflow.accepts(node) && node.id != parent {
                        node.value += value;
                    }
                }
            }
        }
    }

    debug!(
        "Merged {} of {} activities into {} template nodes ({} overflowed)",
        nodes.len() - base,
        activities.len(),
        base,
        overflowed
    );

    nodes
}
