use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cat_group: Option<String>,
    #[serde(default)]
    pub is_income: bool,
    #[serde(default)]
    pub sort_order: i64,
}

/// Body of `POST /categories`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cat_group: Option<String>,
    pub is_income: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payee {
    pub id: String,
    pub name: String,
}
