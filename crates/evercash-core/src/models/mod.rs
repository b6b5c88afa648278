//! Data models for Evercash entities.
//!
//! - `Account`, `NewAccount`, `AccountUpdate`: ledgers with balances
//! - `Transaction`, `NewTransaction`, `TransactionUpdate`
//! - `Category`, `NewCategory`, `Payee`
//! - Budget types: `BudgetMonth`, `CategoryGroup`, `BudgetCategory`, `BudgetAmount`
//! - `Goal`, `GoalInput`
//! - Import and payment types: `ImportFile`, `ImportResult`, `ImportCredits`,
//!   `OrderRequest`, `PaymentOrder`, `PaymentVerification`
//! - `Report`, `ReportRange`, `ReportSummary`
//!
//! Account balances and transaction amounts are major units in memory and
//! minor units on the wire (see `utils::money`).

pub mod account;
pub mod budget;
pub mod category;
pub mod goal;
pub mod payment;
pub mod report;
pub mod transaction;

pub use account::{Account, AccountUpdate, NewAccount};
pub use budget::{BudgetAmount, BudgetCategory, BudgetMonth, CategoryGroup};
pub use category::{Category, NewCategory, Payee};
pub use goal::{Goal, GoalInput};
pub use payment::{
    ImportCredits, ImportFile, ImportResult, LocaleHint, OrderRequest, PaymentOrder,
    PaymentVerification,
};
pub use report::{Report, ReportRange, ReportSummary};
pub use transaction::{NewTransaction, Transaction, TransactionUpdate};

use serde::Deserialize;

/// Envelope returned by create/update endpoints: `{"data": {...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// The `data` payload of a create call.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedId {
    pub id: String,
}
