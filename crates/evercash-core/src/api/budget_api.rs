//! The operation set shared by the real client and the demo overlay.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use super::ApiError;
use crate::models::{
    Account, AccountUpdate, BudgetAmount, BudgetMonth, Category, Goal, GoalInput, ImportCredits,
    ImportFile, ImportResult, NewAccount, NewCategory, NewTransaction, OrderRequest, Payee,
    PaymentOrder, PaymentVerification, Report, ReportRange, Transaction, TransactionUpdate,
};

/// Everything a consumer can do with a session handle.
///
/// Implemented by `RealClient` (network + cache) and `OverlayClient`
/// (local demo dataset). Callers never need to know which one they hold.
#[async_trait]
pub trait BudgetApi: Send + Sync {
    /// Whether this handle serves the local demo dataset.
    fn is_demo(&self) -> bool {
        false
    }

    async fn server_version(&self) -> Result<String, ApiError>;

    // ===== Accounts =====

    async fn get_accounts(&self) -> Result<Vec<Account>, ApiError>;
    /// Returns the new account's id.
    async fn create_account(&self, account: &NewAccount) -> Result<String, ApiError>;
    async fn update_account(&self, id: &str, update: &AccountUpdate) -> Result<(), ApiError>;
    async fn delete_account(&self, id: &str) -> Result<(), ApiError>;
    async fn close_account(&self, id: &str) -> Result<(), ApiError>;
    async fn reopen_account(&self, id: &str) -> Result<(), ApiError>;

    // ===== Transactions =====

    /// All transactions, or one account's when `account_id` is given.
    async fn get_transactions(&self, account_id: Option<&str>) -> Result<Vec<Transaction>, ApiError>;
    /// Returns the new transaction's id.
    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<String, ApiError>;
    async fn update_transaction(&self, id: &str, update: &TransactionUpdate) -> Result<(), ApiError>;
    async fn delete_transaction(&self, id: &str) -> Result<(), ApiError>;
    async fn delete_all_transactions(&self) -> Result<(), ApiError>;
    async fn import_transactions(&self, account_id: &str, file: ImportFile) -> Result<ImportResult, ApiError>;
    async fn get_import_credits(&self) -> Result<ImportCredits, ApiError>;

    // ===== Categories and payees =====

    async fn get_categories(&self) -> Result<Vec<Category>, ApiError>;
    /// Returns the new category's id.
    async fn create_category(&self, category: &NewCategory) -> Result<String, ApiError>;
    async fn get_payees(&self) -> Result<Vec<Payee>, ApiError>;

    // ===== Budgets =====

    async fn get_budget_month(&self, month: &str) -> Result<BudgetMonth, ApiError>;
    async fn get_budget_amounts(&self, month: &str) -> Result<Vec<BudgetAmount>, ApiError>;
    async fn set_budget_amount(&self, category_id: &str, month: &str, amount_minor: i64) -> Result<Value, ApiError>;

    // ===== Goals =====

    async fn get_goals(&self) -> Result<Vec<Goal>, ApiError>;
    async fn create_goal(&self, goal: &GoalInput) -> Result<Goal, ApiError>;
    async fn update_goal(&self, id: &str, update: &GoalInput) -> Result<Goal, ApiError>;
    async fn delete_goal(&self, id: &str) -> Result<(), ApiError>;

    // ===== Reports =====

    async fn generate_report(&self, kind: &str, range: &ReportRange) -> Result<Report, ApiError>;

    // ===== Payments =====

    async fn create_payment_order(&self, order: &OrderRequest) -> Result<PaymentOrder, ApiError>;
    async fn verify_payment(&self, payment: &PaymentVerification) -> Result<(), ApiError>;
}

impl fmt::Debug for dyn BudgetApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BudgetApi").field("demo", &self.is_demo()).finish()
    }
}
