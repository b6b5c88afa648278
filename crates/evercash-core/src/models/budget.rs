use serde::{Deserialize, Serialize};

use super::{Account, Transaction};
use crate::cache::CacheValue;

/// Budget summary for one month (`YYYY-MM`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetMonth {
    pub month: String,
    #[serde(default)]
    pub category_groups: Vec<CategoryGroup>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub total_budgeted: f64,
    #[serde(default)]
    pub total_spent: f64,
    #[serde(default)]
    pub total_income: f64,
    #[serde(default)]
    pub to_budget: f64,
}

impl BudgetMonth {
    pub fn group(&self, id: &str) -> Option<&CategoryGroup> {
        self.category_groups.iter().find(|g| g.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_income: bool,
    #[serde(default)]
    pub categories: Vec<BudgetCategory>,
}

impl CategoryGroup {
    pub fn category(&self, name: &str) -> Option<&BudgetCategory> {
        self.categories.iter().find(|c| c.name == name)
    }
}

/// One category line of a month: `balance = budgeted - spent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub budgeted: f64,
    #[serde(default)]
    pub spent: f64,
    #[serde(default)]
    pub balance: f64,
}

/// Amount budgeted to one category for one month, in minor units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAmount {
    #[serde(alias = "categoryId")]
    pub category_id: String,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub amount: i64,
}

impl CacheValue for BudgetMonth {
    fn is_empty_result(&self) -> bool {
        self.month.is_empty() && self.category_groups.is_empty()
    }
}
