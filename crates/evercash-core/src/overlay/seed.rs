//! Sample data written to a real account so a new user has something to look at.
//!
//! Unlike the overlay dataset this goes through `BudgetApi` and lands on the
//! server. Everything it creates is marked (`DEMO` notes, `Demo ` account
//! names) so `clear_demo_data` can find it again.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::dataset::drand;
use crate::api::{ApiError, BudgetApi};
use crate::models::{Account, Category, NewAccount, NewCategory, NewTransaction};

/// Notes of seeded transactions start with this.
pub const SEED_NOTE_PREFIX: &str = "DEMO";

/// Names of seeded accounts start with this.
pub const SEED_ACCOUNT_PREFIX: &str = "Demo ";

/// Days of seeded history, counting today.
const SEED_DAYS: u32 = 28;

const SEED_NOTE: &str = "DEMO: seed";

/// Totals after seeding (or of the existing data when seeding was skipped).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeedStats {
    pub net_worth: f64,
    pub tx_count: usize,
}

/// How many seeded items `clear_demo_data` removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cleanup {
    pub transactions: usize,
    pub accounts: usize,
}

/// Category ids (or names, when creation failed) used by the seeded rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedCategories {
    pub food: String,
    pub shopping: String,
    pub transport: String,
    pub entertainment: String,
    pub bills: String,
    pub income: String,
}

impl SeedCategories {
    /// Plain category names, for backends that take names directly.
    pub fn by_name() -> Self {
        Self {
            food: "Food & Dining".to_string(),
            shopping: "Shopping".to_string(),
            transport: "Transportation".to_string(),
            entertainment: "Entertainment".to_string(),
            bills: "Bills & Utilities".to_string(),
            income: "Salary".to_string(),
        }
    }
}

fn net_worth(accounts: &[Account]) -> f64 {
    accounts.iter().map(|a| a.balance).sum()
}

/// Id of the category called `name`, creating it when missing. Falls back to
/// the name itself if the backend refuses the create.
async fn ensure_category(api: &dyn BudgetApi, existing: &[Category], name: &str, is_income: bool) -> String {
    if let Some(category) = existing.iter().find(|c| c.name == name) {
        return category.id.clone();
    }
    let category = NewCategory {
        name: name.to_string(),
        cat_group: None,
        is_income,
    };
    match api.create_category(&category).await {
        Ok(id) => id,
        Err(e) => {
            warn!(category = name, error = %e, "Could not create seed category");
            name.to_string()
        }
    }
}

fn seed_account(name: &str, account_type: &str, balance: f64) -> NewAccount {
    NewAccount {
        name: name.to_string(),
        account_type: account_type.to_string(),
        balance,
        closed: false,
    }
}

fn row(account_id: &str, date: &str, amount: f64, payee: &str, category: &str, cleared: bool) -> NewTransaction {
    NewTransaction {
        account_id: account_id.to_string(),
        amount,
        date: date.to_string(),
        notes: Some(SEED_NOTE.to_string()),
        payee: Some(payee.to_string()),
        category: Some(category.to_string()),
        cleared,
    }
}

/// The transactions seeded into `account_id` over the four weeks before `today`.
pub fn seed_transactions(account_id: &str, today: NaiveDate, categories: &SeedCategories) -> Vec<NewTransaction> {
    let days: Vec<String> = (0..SEED_DAYS)
        .map(|i| (today - Duration::days(i64::from(i))).format("%Y-%m-%d").to_string())
        .collect();

    let mut rows = vec![NewTransaction {
        account_id: account_id.to_string(),
        amount: 3200.0,
        date: days[25].clone(),
        notes: Some("DEMO: Monthly salary".to_string()),
        payee: Some("ACME Corp".to_string()),
        category: Some(categories.income.clone()),
        cleared: true,
    }];

    for (idx, date) in (0u32..).zip(&days) {
        if idx % 7 == 0 {
            rows.push(row(account_id, date, -drand(idx + 1, 40.0, 80.0), "Groceries", &categories.food, true));
        }
        if idx % 5 == 0 {
            rows.push(row(account_id, date, -drand(idx + 2, 8.0, 18.0), "Coffee Shop", &categories.food, true));
        }
        if idx % 6 == 0 {
            rows.push(row(account_id, date, -drand(idx + 3, 25.0, 60.0), "Uber", &categories.transport, true));
        }
        if idx % 9 == 0 {
            rows.push(row(account_id, date, -drand(idx + 4, 30.0, 120.0), "Amazon", &categories.shopping, false));
        }
    }

    rows.push(row(account_id, &days[10], -89.99, "Electric Utility", &categories.bills, true));
    rows.push(row(account_id, &days[15], -59.99, "Streaming Service", &categories.entertainment, true));
    rows
}

/// Write sample accounts and four weeks of transactions.
///
/// Does nothing when the user already has transactions, unless `force` is set.
pub async fn seed_demo_data(api: &dyn BudgetApi, today: NaiveDate, force: bool) -> Result<SeedStats, ApiError> {
    let accounts = api.get_accounts().await?;
    let transactions = api.get_transactions(None).await?;

    if !force && !transactions.is_empty() {
        debug!(count = transactions.len(), "User already has transactions, not seeding");
        return Ok(SeedStats {
            net_worth: net_worth(&accounts),
            tx_count: transactions.len(),
        });
    }

    let existing = api.get_categories().await?;
    let names = SeedCategories::by_name();
    let categories = SeedCategories {
        food: ensure_category(api, &existing, &names.food, false).await,
        shopping: ensure_category(api, &existing, &names.shopping, false).await,
        transport: ensure_category(api, &existing, &names.transport, false).await,
        entertainment: ensure_category(api, &existing, &names.entertainment, false).await,
        bills: ensure_category(api, &existing, &names.bills, false).await,
        income: ensure_category(api, &existing, &names.income, true).await,
    };

    let checking = api
        .create_account(&seed_account("Demo Checking", "checking", 4200.0))
        .await?;
    api.create_account(&seed_account("Demo Savings", "savings", 12500.0))
        .await?;
    api.create_account(&seed_account("Demo Credit Card", "credit", -1200.0))
        .await?;

    let rows = seed_transactions(&checking, today, &categories);
    for transaction in &rows {
        api.create_transaction(transaction).await?;
    }
    info!(transactions = rows.len(), "Seeded demo data");

    let accounts = api.get_accounts().await?;
    let transactions = api.get_transactions(None).await?;
    Ok(SeedStats {
        net_worth: net_worth(&accounts),
        tx_count: transactions.len(),
    })
}

/// Remove what `seed_demo_data` wrote. Best effort: a failure stops the
/// current phase and is logged, never returned.
pub async fn clear_demo_data(api: &dyn BudgetApi) -> Cleanup {
    let mut cleanup = Cleanup::default();

    match api.get_transactions(None).await {
        Ok(transactions) => {
            for transaction in transactions {
                let seeded = transaction
                    .notes
                    .as_deref()
                    .is_some_and(|notes| notes.starts_with(SEED_NOTE_PREFIX));
                if !seeded {
                    continue;
                }
                if let Err(e) = api.delete_transaction(&transaction.id).await {
                    warn!(id = %transaction.id, error = %e, "Failed to delete seeded transaction");
                    break;
                }
                cleanup.transactions += 1;
            }
        }
        Err(e) => warn!(error = %e, "Failed to list transactions for cleanup"),
    }

    match api.get_accounts().await {
        Ok(accounts) => {
            for account in accounts.iter().filter(|a| a.name.starts_with(SEED_ACCOUNT_PREFIX)) {
                if let Err(e) = api.delete_account(&account.id).await {
                    warn!(id = %account.id, error = %e, "Failed to delete seeded account");
                    break;
                }
                cleanup.accounts += 1;
            }
        }
        Err(e) => warn!(error = %e, "Failed to list accounts for cleanup"),
    }

    info!(
        transactions = cleanup.transactions,
        accounts = cleanup.accounts,
        "Cleared demo data"
    );
    cleanup
}
