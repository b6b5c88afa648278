use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A savings goal. Amounts are carried as the server sends them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    /// Server fields this client does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /goals` and `PUT /goals/{id}`. Absent fields are left
/// unchanged on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GoalInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
}
