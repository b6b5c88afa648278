//! Terminal rendering of command results.

use anyhow::Result;
use serde::Serialize;

use evercash_core::models::{
    Account, BudgetMonth, Category, Goal, ImportCredits, Payee, Report, Transaction,
};
use evercash_core::utils::format::format_amount;
use evercash_core::utils::truncate_string;

/// Column width for names and payees
const NAME_WIDTH: usize = 24;

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print as JSON when asked, otherwise with the given table renderer.
pub fn print<T: Serialize + ?Sized>(as_json: bool, value: &T, table: fn(&T)) {
    if as_json {
        if let Err(e) = json(value) {
            eprintln!("Could not encode output: {}", e);
        }
    } else {
        table(value);
    }
}

pub fn accounts(accounts: &[Account]) {
    if accounts.is_empty() {
        println!("No accounts.");
        return;
    }
    for account in accounts {
        println!(
            "{:<NAME_WIDTH$} {:<10} {:>14}{}",
            truncate_string(&account.name, NAME_WIDTH),
            account.account_type,
            format_amount(account.balance),
            if account.closed { "  (closed)" } else { "" },
        );
    }
    let total: f64 = accounts.iter().filter(|a| a.is_open()).map(|a| a.balance).sum();
    println!("{:<NAME_WIDTH$} {:<10} {:>14}", "Total", "", format_amount(total));
}

pub fn transactions(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("No transactions.");
        return;
    }
    for tx in transactions {
        println!(
            "{}  {:<NAME_WIDTH$} {:<18} {:>12}{}",
            tx.date,
            truncate_string(tx.payee.as_deref().unwrap_or("-"), NAME_WIDTH),
            truncate_string(tx.category.as_deref().unwrap_or("-"), 18),
            format_amount(tx.amount),
            if tx.cleared { "" } else { "  *" },
        );
    }
}

pub fn categories(categories: &[Category]) {
    for category in categories {
        let kind = if category.is_income { "income" } else { "expense" };
        println!("{:<NAME_WIDTH$} {:<8} {}", category.name, kind, category.id);
    }
}

pub fn payees(payees: &[Payee]) {
    for payee in payees {
        println!("{:<NAME_WIDTH$} {}", payee.name, payee.id);
    }
}

pub fn budget_month(budget: &BudgetMonth) {
    println!("Budget {}", budget.month);
    for group in &budget.category_groups {
        println!();
        println!("{}", group.name);
        for line in &group.categories {
            println!(
                "  {:<NAME_WIDTH$} {:>12} {:>12} {:>12}",
                truncate_string(&line.name, NAME_WIDTH),
                format_amount(line.budgeted),
                format_amount(line.spent),
                format_amount(line.balance),
            );
        }
    }
    println!();
    println!("Budgeted: {}", format_amount(budget.total_budgeted));
    println!("Spent:    {}", format_amount(budget.total_spent));
    println!("Income:   {}", format_amount(budget.total_income));
    println!("To budget: {}", format_amount(budget.to_budget));
}

pub fn goals(goals: &[Goal]) {
    if goals.is_empty() {
        println!("No goals.");
        return;
    }
    for goal in goals {
        println!(
            "{:<NAME_WIDTH$} {:>12} / {:<12} {}",
            truncate_string(&goal.name, NAME_WIDTH),
            format_amount(goal.current_amount),
            format_amount(goal.target_amount),
            goal.target_date.as_deref().unwrap_or(""),
        );
    }
}

pub fn report(report: &Report) {
    transactions(&report.data);
    if let Some(total) = report.summary.total {
        println!("Total: {}", format_amount(total));
    }
    if let Some(count) = report.summary.count {
        println!("Count: {}", count);
    }
}

pub fn credits(credits: &ImportCredits) {
    println!(
        "Import credits: {} of {} left{}",
        credits.remaining(),
        credits.import_credits_total,
        if credits.is_premium { " (premium)" } else { "" },
    );
}
