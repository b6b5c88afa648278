use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{Account, Category, Transaction};
use crate::storage::{self, KeyValueStore, OVERLAY_DATA_KEY};

/// Days of history in the seeded dataset.
const HISTORY_DAYS: i64 = 60;

/// Monthly salary paid into the demo checking account.
const SALARY: f64 = 32000.0;

const CHECKING: &str = "demo-acc-1";
const OVERLAY_NOTE: &str = "DEMO overlay";

/// The demo snapshot. Only `build`/`reset` ever produce a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayDataset {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
}

/// Deterministic amount in `[min, max)` for day index `i`, rounded to cents.
pub(crate) fn drand(i: u32, min: f64, max: f64) -> f64 {
    let x = (f64::from(i) * 9999.0).sin() * 10000.0;
    let f = x - x.floor();
    ((f * (max - min) + min) * 100.0).round() / 100.0
}

fn account(id: &str, name: &str, account_type: &str, balance: f64) -> Account {
    Account {
        id: id.to_string(),
        name: name.to_string(),
        account_type: account_type.to_string(),
        balance,
        closed: false,
        offbudget: false,
        created_at: None,
        updated_at: None,
    }
}

fn category(sort_order: i64, id: &str, name: &str, is_income: bool) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        cat_group: None,
        is_income,
        sort_order,
    }
}

struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    fn push(&mut self, date: NaiveDate, amount: f64, payee: &str, category: &str, cleared: bool, notes: &str) {
        let id = format!("demo-tx-{}", self.transactions.len() + 1);
        self.transactions.push(Transaction {
            id,
            account_id: CHECKING.to_string(),
            amount,
            date: date.format("%Y-%m-%d").to_string(),
            notes: Some(notes.to_string()),
            payee: Some(payee.to_string()),
            category: Some(category.to_string()),
            cleared,
            imported: false,
            created_at: None,
        });
    }

    fn expense(&mut self, date: NaiveDate, amount: f64, payee: &str, category: &str, cleared: bool) {
        self.push(date, -amount, payee, category, cleared, OVERLAY_NOTE);
    }
}

impl OverlayDataset {
    /// Seed the dataset for the 60 days ending on `today`.
    pub fn build(today: NaiveDate) -> Self {
        let accounts = vec![
            account("demo-acc-1", "Demo Checking", "checking", 42000.0),
            account("demo-acc-2", "Demo Savings", "savings", 125000.0),
            account("demo-acc-3", "Demo Credit Card", "credit", -12000.0),
        ];

        let categories = vec![
            category(0, "cat-income-salary", "Salary", true),
            category(1, "cat-food", "Food & Dining", false),
            category(2, "cat-shopping", "Shopping", false),
            category(3, "cat-transport", "Transportation", false),
            category(4, "cat-bills", "Bills & Utilities", false),
            category(5, "cat-entertainment", "Entertainment", false),
            category(6, "cat-other", "Other", false),
        ];

        let base = today - Duration::days(HISTORY_DAYS - 1);
        let mut ledger = Ledger { transactions: Vec::new() };

        for month in 0..2 {
            let date = base + Duration::days(5 + 30 * month);
            ledger.push(date, SALARY, "ACME Corp", "Salary", true, "DEMO overlay: salary");
        }

        for i in 0..HISTORY_DAYS as u32 {
            let date = base + Duration::days(i64::from(i));
            if i % 5 == 0 {
                ledger.expense(date, drand(i, 200.0, 600.0), "Groceries", "Food & Dining", true);
            }
            if i % 3 == 0 {
                ledger.expense(date, drand(i, 80.0, 200.0), "Coffee Shop", "Food & Dining", true);
            }
            if i % 7 == 0 {
                ledger.expense(date, drand(i, 300.0, 900.0), "Uber", "Transportation", true);
            }
            if i % 9 == 0 {
                ledger.expense(date, drand(i, 400.0, 2000.0), "Amazon", "Shopping", false);
            }
        }

        ledger.expense(base + Duration::days(45), 1299.0, "Electric Utility", "Bills & Utilities", true);
        ledger.expense(base + Duration::days(35), 799.0, "Streaming", "Entertainment", true);

        Self {
            accounts,
            transactions: ledger.transactions,
            categories,
        }
    }

    /// The persisted dataset, or a freshly seeded (and persisted) one when
    /// nothing usable is stored.
    pub fn load(store: &dyn KeyValueStore, today: NaiveDate) -> Self {
        if let Some(raw) = storage::read(store, OVERLAY_DATA_KEY) {
            match serde_json::from_str(&raw) {
                Ok(dataset) => {
                    debug!("Loaded demo dataset from storage");
                    return dataset;
                }
                Err(e) => warn!(error = %e, "Stored demo dataset is unreadable, reseeding"),
            }
        }
        let dataset = Self::build(today);
        dataset.persist(store);
        dataset
    }

    /// Replace whatever is stored with a freshly seeded dataset.
    pub fn reset(store: &dyn KeyValueStore, today: NaiveDate) -> Self {
        let dataset = Self::build(today);
        dataset.persist(store);
        dataset
    }

    pub fn persist(&self, store: &dyn KeyValueStore) -> bool {
        match serde_json::to_string(self) {
            Ok(json) => storage::write(store, OVERLAY_DATA_KEY, &json),
            Err(e) => {
                warn!(error = %e, "Could not serialize demo dataset");
                false
            }
        }
    }

    pub fn expense_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| !c.is_income)
    }

    pub fn income_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| c.is_income)
    }
}
