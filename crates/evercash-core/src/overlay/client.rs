//! `BudgetApi` over the demo dataset.
//!
//! Reads are projections of the dataset and never touch the network.
//! Mutations are rejected with `ApiError::DemoModeBlocked` after a notice
//! is raised; the dataset is never modified. Operations the overlay does
//! not model (`server_version`, `get_import_credits`) are forwarded to the
//! wrapped real client.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::OverlayDataset;
use crate::api::{ApiError, BudgetApi};
use crate::models::{
    Account, AccountUpdate, BudgetAmount, BudgetCategory, BudgetMonth, Category, CategoryGroup,
    Goal, GoalInput, ImportCredits, ImportFile, ImportResult, NewAccount, NewCategory,
    NewTransaction, OrderRequest, Payee, PaymentOrder, PaymentVerification, Report, ReportRange,
    ReportSummary, Transaction, TransactionUpdate,
};
use crate::notify::{DemoNotice, Notifier};

/// Amount budgeted to every expense category in demo mode.
const DEMO_BUDGET_PER_CATEGORY: f64 = 5000.0;

/// Category groups of the demo budget month: (id, name, category names).
const EXPENSE_GROUPS: [(&str, &str, &[&str]); 2] = [
    (
        "living-expenses",
        "Living Expenses",
        &["Food & Dining", "Shopping", "Transportation", "Bills & Utilities"],
    ),
    ("lifestyle", "Lifestyle", &["Entertainment"]),
];

pub struct OverlayClient {
    base: Arc<dyn BudgetApi>,
    dataset: OverlayDataset,
    notifier: Arc<dyn Notifier>,
}

impl OverlayClient {
    pub fn new(base: Arc<dyn BudgetApi>, dataset: OverlayDataset, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            base,
            dataset,
            notifier,
        }
    }

    pub fn dataset(&self) -> &OverlayDataset {
        &self.dataset
    }

    /// The real client underneath.
    pub fn base(&self) -> &Arc<dyn BudgetApi> {
        &self.base
    }

    fn blocked<T>(&self, action: &str) -> Result<T, ApiError> {
        debug!(action = action, "Blocked mutation in demo mode");
        self.notifier.demo_blocked(&DemoNotice::blocked(action));
        Err(ApiError::demo_blocked(action))
    }

    fn month_transactions(&self, month: &str) -> Vec<Transaction> {
        self.dataset
            .transactions
            .iter()
            .filter(|t| t.in_month(month))
            .cloned()
            .collect()
    }

    fn budget_group(&self, id: &str, name: &str, names: &[&str], month_tx: &[Transaction]) -> CategoryGroup {
        let categories = names
            .iter()
            .filter_map(|name| self.dataset.categories.iter().find(|c| c.name == *name))
            .map(|category| {
                let spent: f64 = month_tx
                    .iter()
                    .filter(|t| t.is_outflow() && matches_category(t, category))
                    .map(|t| t.amount.abs())
                    .sum();
                let budgeted = if category.is_income { 0.0 } else { DEMO_BUDGET_PER_CATEGORY };
                BudgetCategory {
                    id: category.id.clone(),
                    name: category.name.clone(),
                    budgeted,
                    spent,
                    balance: budgeted - spent,
                }
            })
            .collect();

        CategoryGroup {
            id: id.to_string(),
            name: name.to_string(),
            is_income: false,
            categories,
        }
    }
}

/// Demo transactions name their category; server ones carry the id.
fn matches_category(transaction: &Transaction, category: &Category) -> bool {
    matches!(transaction.category.as_deref(), Some(c) if c == category.name || c == category.id)
}

fn summarize(data: Vec<Transaction>) -> Report {
    let total: f64 = data.iter().map(|t| t.amount.abs()).sum();
    let count = data.len();
    Report {
        data,
        summary: ReportSummary {
            total: Some(total),
            count: Some(count),
        },
    }
}

#[async_trait]
impl BudgetApi for OverlayClient {
    fn is_demo(&self) -> bool {
        true
    }

    async fn server_version(&self) -> Result<String, ApiError> {
        self.base.server_version().await
    }

    // ===== Accounts =====

    async fn get_accounts(&self) -> Result<Vec<Account>, ApiError> {
        Ok(self.dataset.accounts.clone())
    }

    async fn create_account(&self, _account: &NewAccount) -> Result<String, ApiError> {
        self.blocked("creating accounts")
    }

    async fn update_account(&self, _id: &str, _update: &AccountUpdate) -> Result<(), ApiError> {
        self.blocked("editing accounts")
    }

    async fn delete_account(&self, _id: &str) -> Result<(), ApiError> {
        self.blocked("deleting accounts")
    }

    async fn close_account(&self, _id: &str) -> Result<(), ApiError> {
        self.blocked("editing accounts")
    }

    async fn reopen_account(&self, _id: &str) -> Result<(), ApiError> {
        self.blocked("editing accounts")
    }

    // ===== Transactions =====

    async fn get_transactions(&self, account_id: Option<&str>) -> Result<Vec<Transaction>, ApiError> {
        let mut transactions: Vec<Transaction> = self
            .dataset
            .transactions
            .iter()
            .filter(|t| account_id.map_or(true, |id| t.account_id == id))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(transactions)
    }

    async fn create_transaction(&self, _transaction: &NewTransaction) -> Result<String, ApiError> {
        self.blocked("adding transactions")
    }

    async fn update_transaction(&self, _id: &str, _update: &TransactionUpdate) -> Result<(), ApiError> {
        self.blocked("editing transactions")
    }

    async fn delete_transaction(&self, _id: &str) -> Result<(), ApiError> {
        self.blocked("deleting transactions")
    }

    async fn delete_all_transactions(&self) -> Result<(), ApiError> {
        self.blocked("deleting transactions")
    }

    async fn import_transactions(&self, _account_id: &str, _file: ImportFile) -> Result<ImportResult, ApiError> {
        self.blocked("importing transactions")
    }

    async fn get_import_credits(&self) -> Result<ImportCredits, ApiError> {
        self.base.get_import_credits().await
    }

    // ===== Categories and payees =====

    async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        Ok(self.dataset.categories.clone())
    }

    async fn create_category(&self, _category: &NewCategory) -> Result<String, ApiError> {
        self.blocked("creating categories")
    }

    async fn get_payees(&self) -> Result<Vec<Payee>, ApiError> {
        let mut seen = HashSet::new();
        let payees = self
            .dataset
            .transactions
            .iter()
            .filter_map(|t| t.payee.as_deref())
            .filter(|name| !name.is_empty() && seen.insert(*name))
            .enumerate()
            .map(|(idx, name)| Payee {
                id: format!("payee-{}", idx),
                name: name.to_string(),
            })
            .collect();
        Ok(payees)
    }

    // ===== Budgets =====

    async fn get_budget_month(&self, month: &str) -> Result<BudgetMonth, ApiError> {
        let month_tx = self.month_transactions(month);

        let mut category_groups: Vec<CategoryGroup> = EXPENSE_GROUPS
            .iter()
            .map(|(id, name, names)| self.budget_group(id, name, names, &month_tx))
            .collect();
        category_groups.push(CategoryGroup {
            id: "income".to_string(),
            name: "Income".to_string(),
            is_income: true,
            categories: self
                .dataset
                .income_categories()
                .map(|c| BudgetCategory {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    ..BudgetCategory::default()
                })
                .collect(),
        });

        let expense_count = self.dataset.expense_categories().count();
        let total_spent: f64 = month_tx.iter().filter(|t| t.is_outflow()).map(|t| t.amount.abs()).sum();
        let total_income: f64 = month_tx.iter().filter(|t| t.is_inflow()).map(|t| t.amount).sum();

        Ok(BudgetMonth {
            month: month.to_string(),
            category_groups,
            accounts: self.dataset.accounts.clone(),
            transactions: month_tx,
            total_budgeted: DEMO_BUDGET_PER_CATEGORY * expense_count as f64,
            total_spent,
            total_income,
            to_budget: 0.0,
        })
    }

    async fn get_budget_amounts(&self, month: &str) -> Result<Vec<BudgetAmount>, ApiError> {
        Ok(self
            .dataset
            .expense_categories()
            .map(|c| BudgetAmount {
                category_id: c.id.clone(),
                month: month.to_string(),
                amount: DEMO_BUDGET_PER_CATEGORY as i64,
            })
            .collect())
    }

    async fn set_budget_amount(&self, _category_id: &str, _month: &str, _amount_minor: i64) -> Result<Value, ApiError> {
        self.blocked("changing budgets")
    }

    // ===== Goals =====

    async fn get_goals(&self) -> Result<Vec<Goal>, ApiError> {
        Ok(Vec::new())
    }

    async fn create_goal(&self, _goal: &GoalInput) -> Result<Goal, ApiError> {
        self.blocked("creating goals")
    }

    async fn update_goal(&self, _id: &str, _update: &GoalInput) -> Result<Goal, ApiError> {
        self.blocked("editing goals")
    }

    async fn delete_goal(&self, _id: &str) -> Result<(), ApiError> {
        self.blocked("deleting goals")
    }

    // ===== Reports =====

    async fn generate_report(&self, kind: &str, range: &ReportRange) -> Result<Report, ApiError> {
        let in_range = |t: &&Transaction| range.contains(&t.date);
        let transactions = self.dataset.transactions.iter();
        let report = match kind {
            "spending" => summarize(transactions.filter(|t| t.is_outflow()).filter(in_range).cloned().collect()),
            "income" => summarize(transactions.filter(|t| t.is_inflow()).filter(in_range).cloned().collect()),
            _ => Report::default(),
        };
        Ok(report)
    }

    // ===== Payments =====

    async fn create_payment_order(&self, _order: &OrderRequest) -> Result<PaymentOrder, ApiError> {
        self.blocked("payments")
    }

    async fn verify_payment(&self, _payment: &PaymentVerification) -> Result<(), ApiError> {
        self.blocked("payments")
    }
}
