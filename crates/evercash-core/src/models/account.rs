use serde::{Deserialize, Serialize};

use crate::utils::money::{minor_units, minor_units_opt};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub account_type: String,
    #[serde(with = "minor_units", default)]
    pub balance: f64,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub offbudget: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Account {
    pub fn is_open(&self) -> bool {
        !self.closed
    }
}

/// Body of `POST /accounts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAccount {
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(with = "minor_units")]
    pub balance: f64,
    pub closed: bool,
}

impl NewAccount {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for NewAccount {
    fn default() -> Self {
        Self {
            name: "New Account".to_string(),
            account_type: "checking".to_string(),
            balance: 0.0,
            closed: false,
        }
    }
}

/// Body of `PUT /accounts/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    #[serde(with = "minor_units_opt", skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offbudget: Option<bool>,
}

impl AccountUpdate {
    pub fn closed(closed: bool) -> Self {
        Self {
            closed: Some(closed),
            ..Self::default()
        }
    }
}
