//! Command dispatch. Each data command runs against whichever backend the
//! session controller hands out (real or demo).

use std::sync::Arc;

use anyhow::{anyhow, bail, Context as _, Result};
use chrono::Local;
use tracing::warn;

use evercash_core::models::{ImportFile, NewTransaction, ReportRange};
use evercash_core::utils::format::format_amount;
use evercash_core::{overlay, ApiError, BudgetApi};

use crate::output;
use crate::{App, Command, DemoAction};

pub async fn run(command: Command, app: &App) -> Result<()> {
    match command {
        Command::Login { email } => login(app, email).await,
        Command::Logout => {
            app.controller.sign_out().await;
            println!("Signed out.");
            Ok(())
        }
        Command::Status => status(app).await,
        Command::Demo { action, force } => demo(app, action, force).await,
        command => {
            let handle = app.controller.initialize().await.map_err(explain)?;
            if !app.controller.is_authenticated() {
                warn!("Not signed in; the server may reject requests");
            }
            data_command(command, handle.as_ref(), app.json)
                .await
                .map_err(explain)
        }
    }
}

/// Turn an API error into a message that tells the user what to do next.
fn explain(err: ApiError) -> anyhow::Error {
    match &err {
        ApiError::DemoModeBlocked { .. } => {
            anyhow!("{}. Run `evercash demo off` to exit demo mode.", err)
        }
        _ if err.is_unauthorized() => anyhow!("{} (run `evercash login`)", err),
        ApiError::Initialization(_) => anyhow!("{} (check EVERCASH_API_BASE_URL)", err),
        _ => err.into(),
    }
}

async fn login(app: &App, email: Option<String>) -> Result<()> {
    let Some(provider) = &app.gotrue else {
        bail!("No identity provider configured (set EVERCASH_AUTH_URL and EVERCASH_AUTH_ANON_KEY)");
    };
    let email = match email {
        Some(email) => email,
        None => prompt("Email: ")?,
    };
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    let credential = provider.sign_in_with_password(&email, &password).await?;
    app.controller.sign_in(&credential).await.map_err(explain)?;

    if app.controller.is_authenticated() {
        println!("Signed in as {}.", email);
    } else {
        println!("Signed in as {}, but the server did not accept the session yet.", email);
    }
    offer_demo(app).await;
    Ok(())
}

/// Point a brand-new user at demo mode, once.
async fn offer_demo(app: &App) {
    // No accounts yet stands in for "onboarding not completed"
    let onboarded = match app.controller.initialize().await {
        Ok(handle) => handle.get_accounts().await.map(|a| !a.is_empty()).unwrap_or(true),
        Err(_) => true,
    };
    if !overlay::should_show_demo_for_new_user(app.storage.as_ref(), app.controller.is_authenticated(), onboarded) {
        return;
    }
    println!();
    println!("New here? Try `evercash demo on` to explore sample data,");
    println!("or `evercash demo seed` to add sample accounts you can edit.");
    overlay::mark_demo_seen(app.storage.as_ref());
}

fn prompt(label: &str) -> Result<String> {
    use std::io::Write;

    print!("{}", label);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        bail!("{} is required", label.trim_end_matches(": "));
    }
    Ok(value)
}

async fn status(app: &App) -> Result<()> {
    let outcome = app.controller.initialize().await;
    let version = match &outcome {
        Ok(handle) => handle.server_version().await.ok(),
        Err(_) => None,
    };

    let state = app.controller.state();
    if app.json {
        return output::json(&serde_json::json!({
            "state": state.name(),
            "demo": app.controller.is_demo_mode(),
            "authenticated": app.controller.is_authenticated(),
            "server_version": version,
            "error": outcome.as_ref().err().map(ToString::to_string),
        }));
    }

    println!("State:          {}", state.name());
    println!("Demo mode:      {}", if app.controller.is_demo_mode() { "on" } else { "off" });
    println!("Authenticated:  {}", if app.controller.is_authenticated() { "yes" } else { "no" });
    println!("Server version: {}", version.as_deref().unwrap_or("unknown"));
    if let Err(e) = outcome {
        println!("Error:          {}", e);
    }
    Ok(())
}

async fn demo(app: &App, action: DemoAction, force: bool) -> Result<()> {
    match action {
        DemoAction::On => {
            app.controller.set_demo_mode(true).await.map_err(explain)?;
            overlay::mark_demo_seen(app.storage.as_ref());
            println!("Demo mode on. Changes are disabled; data is local sample data.");
        }
        DemoAction::Off => {
            app.controller.exit_demo_mode().await.map_err(explain)?;
            println!("Demo mode off.");
        }
        DemoAction::Reset => {
            app.controller.reset_demo_data().await.map_err(explain)?;
            println!("Demo data reset.");
        }
        DemoAction::Seed => {
            let handle = real_handle(app).await?;
            let stats = overlay::seed_demo_data(handle.as_ref(), Local::now().date_naive(), force)
                .await
                .map_err(explain)?;
            if app.json {
                return output::json(&stats);
            }
            println!(
                "{} transactions, net worth {}.",
                stats.tx_count,
                format_amount(stats.net_worth)
            );
        }
        DemoAction::Clear => {
            let handle = real_handle(app).await?;
            let cleanup = overlay::clear_demo_data(handle.as_ref()).await;
            if app.json {
                return output::json(&cleanup);
            }
            println!(
                "Removed {} sample transactions and {} sample accounts.",
                cleanup.transactions, cleanup.accounts
            );
        }
    }
    Ok(())
}

/// The real backend. Sample data is written to the server, so demo mode
/// (which blocks every change) must be off.
async fn real_handle(app: &App) -> Result<Arc<dyn BudgetApi>> {
    if app.controller.is_demo_mode() {
        bail!("Sample data goes to your real account. Run `evercash demo off` first.");
    }
    app.controller.initialize().await.map_err(explain)
}

fn current_month() -> String {
    Local::now().format("%Y-%m").to_string()
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

async fn data_command(command: Command, api: &dyn BudgetApi, json: bool) -> Result<(), ApiError> {
    if api.is_demo() && !json {
        println!("[demo mode]");
    }

    match command {
        Command::Accounts => {
            let accounts = api.get_accounts().await?;
            output::print(json, accounts.as_slice(), output::accounts);
        }
        Command::Transactions { account, limit } => {
            let mut transactions = api.get_transactions(account.as_deref()).await?;
            transactions.truncate(limit);
            output::print(json, transactions.as_slice(), output::transactions);
        }
        Command::Categories => {
            let categories = api.get_categories().await?;
            output::print(json, categories.as_slice(), output::categories);
        }
        Command::Payees => {
            let payees = api.get_payees().await?;
            output::print(json, payees.as_slice(), output::payees);
        }
        Command::Budget { month } => {
            let month = month.unwrap_or_else(current_month);
            let budget = api.get_budget_month(&month).await?;
            output::print(json, &budget, output::budget_month);
        }
        Command::Goals => {
            let goals = api.get_goals().await?;
            output::print(json, goals.as_slice(), output::goals);
        }
        Command::Report { kind, start, end } => {
            let report = api.generate_report(&kind, &ReportRange { start, end }).await?;
            output::print(json, &report, output::report);
        }
        Command::Credits => {
            let credits = api.get_import_credits().await?;
            output::print(json, &credits, output::credits);
        }
        Command::AddTransaction {
            account,
            amount,
            date,
            payee,
            category,
            notes,
        } => {
            let id = api
                .create_transaction(&NewTransaction {
                    account_id: account,
                    amount,
                    date: date.unwrap_or_else(today),
                    notes,
                    payee,
                    category,
                    cleared: false,
                })
                .await?;
            println!("Created transaction {}", id);
        }
        Command::Import { account, file } => {
            let bytes = std::fs::read(&file).map_err(|e| {
                ApiError::InvalidResponse(format!("could not read {}: {}", file.display(), e))
            })?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "import.csv".to_string());
            let result = api
                .import_transactions(&account, ImportFile::new(file_name, bytes))
                .await?;
            println!("Imported {} transactions", result.imported);
        }
        Command::Login { .. } | Command::Logout | Command::Status | Command::Demo { .. } => {}
    }
    Ok(())
}
