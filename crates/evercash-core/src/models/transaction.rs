use serde::{Deserialize, Serialize};

use crate::utils::money::{minor_units, minor_units_opt};

/// A ledger entry. Negative amounts are outflows.
///
/// `payee` and `category` hold whatever the backend reports: an id for the
/// remote server, a display name for the demo dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(alias = "account")]
    pub account_id: String,
    #[serde(with = "minor_units")]
    pub amount: f64,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "payee_id", alias = "payee", default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,
    #[serde(rename = "category_id", alias = "category", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub cleared: bool,
    #[serde(default)]
    pub imported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Transaction {
    pub fn is_outflow(&self) -> bool {
        self.amount < 0.0
    }

    pub fn is_inflow(&self) -> bool {
        self.amount > 0.0
    }

    /// Whether the date (`YYYY-MM-DD`) falls in `month` (`YYYY-MM`).
    pub fn in_month(&self, month: &str) -> bool {
        self.date.starts_with(month)
    }
}

/// Body of `POST /transactions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewTransaction {
    pub account_id: String,
    #[serde(with = "minor_units")]
    pub amount: f64,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "payee_id", skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,
    #[serde(rename = "category_id", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub cleared: bool,
}

/// Body of `PUT /transactions/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(with = "minor_units_opt", skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "payee_id", skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,
    #[serde(rename = "category_id", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared: Option<bool>,
}
