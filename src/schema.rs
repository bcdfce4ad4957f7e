//! Wheel data types shared by the template, the sheet rows and the chart.

use serde::{Deserialize, Serialize};

/// One arc of the wheel (quarter, month or activity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelNode {
    pub id: String,
    pub label: String,
    /// Id of the parent node; empty for the root ring.
    #[serde(default)]
    pub parent: String,
    /// Arc size. Non-negative in the template, but the merge may move it.
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub category: String,
}

/// Root of the template file: `{"data": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDocument {
    pub data: Vec<WheelNode>,
}

/// An activity read from one spreadsheet row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// `<activity>_<month3>_<seq>`, unique within one fetch.
    pub id: String,
    pub label: String,
    /// Three-letter month, expected to match a template id.
    pub parent: String,
    pub value: f64,
    pub description: String,
    pub category: String,
}

impl From<ActivityRecord> for WheelNode {
    fn from(activity: ActivityRecord) -> Self {
        Self {
            id: activity.id,
            label: activity.label,
            parent: activity.parent,
            value: activity.value,
            description: Some(activity.description),
            category: activity.category,
        }
    }
}
