//! Typed operations against the Evercash REST API.
//!
//! Reads go through the shared [`ResponseCache`] under category-scoped keys
//! (see `cache::keys`). Mutations hit the network first and invalidate the
//! affected key prefixes only after they succeed, so a failed mutation
//! leaves the cache untouched.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::request::{RequestClient, RequestOptions, ResponseBody};
use super::transport::MultipartForm;
use super::{ApiError, BudgetApi};
use crate::cache::{keys, CacheValue, ResponseCache};
use crate::models::{
    Account, AccountUpdate, BudgetAmount, BudgetMonth, Category, CreatedId, DataEnvelope, Goal,
    GoalInput, ImportCredits, ImportFile, ImportResult, LocaleHint, NewAccount, NewCategory,
    NewTransaction, OrderRequest, Payee, PaymentOrder, PaymentVerification, Report, ReportRange,
    Transaction, TransactionUpdate,
};

/// Reported when `GET /` carries no version field.
const DEFAULT_SERVER_VERSION: &str = "2.0.0";

/// Header carrying the buyer's country on payment orders
const COUNTRY_HEADER: &str = "x-country-code";

pub struct RealClient {
    requests: Arc<RequestClient>,
    cache: Arc<ResponseCache>,
    ttl: Duration,
    locale: LocaleHint,
}

impl RealClient {
    pub fn new(requests: RequestClient, cache: Arc<ResponseCache>) -> Self {
        let ttl = cache.default_ttl();
        Self {
            requests: Arc::new(requests),
            cache,
            ttl,
            locale: LocaleHint::default(),
        }
    }

    pub fn with_locale(mut self, locale: LocaleHint) -> Self {
        self.locale = locale;
        self
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn requests(&self) -> &RequestClient {
        &self.requests
    }

    /// Cached GET: `key` scopes the entry, `endpoint` is fetched on a miss.
    async fn cached<T>(&self, key: &str, endpoint: String) -> Result<T, ApiError>
    where
        T: CacheValue + DeserializeOwned,
    {
        let requests = Arc::clone(&self.requests);
        self.cache
            .get_or_fetch(key, self.ttl, move || async move {
                requests.request(&endpoint, RequestOptions::get()).await?.decode::<T>()
            })
            .await
    }

    async fn send(&self, endpoint: &str, options: RequestOptions) -> Result<ResponseBody, ApiError> {
        self.requests.request(endpoint, options).await
    }

    fn invalidate(&self, prefixes: &[&str]) {
        self.cache.invalidate(prefixes);
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::InvalidResponse(format!("could not encode request body: {}", e)))
}

fn created_id(body: ResponseBody) -> Result<String, ApiError> {
    body.decode::<DataEnvelope<CreatedId>>().map(|envelope| envelope.data.id)
}

/// The `data` field of a response, or `null`.
fn data_field(body: ResponseBody) -> Value {
    match body.into_value() {
        Value::Object(mut fields) => fields.remove("data").unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn report_endpoint(kind: &str, range: &ReportRange) -> String {
    match (&range.start, &range.end) {
        (Some(start), Some(end)) => format!("/reports/{}?startDate={}&endDate={}", kind, start, end),
        _ => format!("/reports/{}", kind),
    }
}

#[async_trait]
impl BudgetApi for RealClient {
    async fn server_version(&self) -> Result<String, ApiError> {
        let body = self.send("/", RequestOptions::get()).await?.into_value();
        Ok(body
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_SERVER_VERSION)
            .to_string())
    }

    // ===== Accounts =====

    async fn get_accounts(&self) -> Result<Vec<Account>, ApiError> {
        self.cached(keys::ACCOUNTS, "/accounts".to_string()).await
    }

    async fn create_account(&self, account: &NewAccount) -> Result<String, ApiError> {
        let body = self.send("/accounts", RequestOptions::post(encode(account)?)).await?;
        self.invalidate(&[keys::ACCOUNTS]);
        created_id(body)
    }

    async fn update_account(&self, id: &str, update: &AccountUpdate) -> Result<(), ApiError> {
        self.send(&format!("/accounts/{}", id), RequestOptions::put(encode(update)?))
            .await?;
        self.invalidate(&[keys::ACCOUNTS]);
        Ok(())
    }

    async fn delete_account(&self, id: &str) -> Result<(), ApiError> {
        self.send(&format!("/accounts/{}", id), RequestOptions::delete()).await?;
        let account_transactions = keys::transactions(Some(id));
        self.invalidate(&[keys::ACCOUNTS, &account_transactions, keys::REPORTS]);
        Ok(())
    }

    async fn close_account(&self, id: &str) -> Result<(), ApiError> {
        self.update_account(id, &AccountUpdate::closed(true)).await
    }

    async fn reopen_account(&self, id: &str) -> Result<(), ApiError> {
        self.update_account(id, &AccountUpdate::closed(false)).await
    }

    // ===== Transactions =====

    async fn get_transactions(&self, account_id: Option<&str>) -> Result<Vec<Transaction>, ApiError> {
        let endpoint = match account_id {
            Some(id) => format!("/transactions?account={}", id),
            None => "/transactions".to_string(),
        };
        let transactions: Vec<Transaction> = self.cached(&keys::transactions(account_id), endpoint).await?;
        debug!(count = transactions.len(), account = ?account_id, "Loaded transactions");
        Ok(transactions)
    }

    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<String, ApiError> {
        let body = self
            .send("/transactions", RequestOptions::post(encode(transaction)?))
            .await?;
        let account_transactions = keys::transactions(Some(&transaction.account_id));
        self.invalidate(&[keys::TRANSACTIONS_ALL, &account_transactions, keys::ACCOUNTS, keys::REPORTS]);
        created_id(body)
    }

    async fn update_transaction(&self, id: &str, update: &TransactionUpdate) -> Result<(), ApiError> {
        self.send(&format!("/transactions/{}", id), RequestOptions::put(encode(update)?))
            .await?;
        self.invalidate(&[keys::TRANSACTIONS_ALL, keys::TRANSACTIONS_BY_ACCOUNT, keys::ACCOUNTS, keys::REPORTS]);
        Ok(())
    }

    async fn delete_transaction(&self, id: &str) -> Result<(), ApiError> {
        self.send(&format!("/transactions/{}", id), RequestOptions::delete())
            .await?;
        self.invalidate(&[keys::TRANSACTIONS_ALL, keys::TRANSACTIONS_BY_ACCOUNT, keys::ACCOUNTS, keys::REPORTS]);
        Ok(())
    }

    async fn delete_all_transactions(&self) -> Result<(), ApiError> {
        self.send("/transactions/bulk-delete", RequestOptions::delete()).await?;
        info!("Deleted all transactions");
        self.invalidate(&[keys::TRANSACTIONS_ALL, keys::TRANSACTIONS_BY_ACCOUNT, keys::ACCOUNTS, keys::REPORTS]);
        Ok(())
    }

    async fn import_transactions(&self, account_id: &str, file: ImportFile) -> Result<ImportResult, ApiError> {
        let mime = file.mime_type().to_string();
        let form = MultipartForm::new()
            .file("file", file.file_name, file.bytes, Some(mime))
            .text("accountId", account_id);
        let body = self.send("/import-transactions", RequestOptions::upload(form)).await?;

        let account_transactions = keys::transactions(Some(account_id));
        self.invalidate(&[keys::TRANSACTIONS_ALL, &account_transactions, keys::ACCOUNTS, keys::REPORTS]);
        let result: ImportResult = body.decode()?;
        info!(account = account_id, imported = result.imported, "Imported transactions");
        Ok(result)
    }

    async fn get_import_credits(&self) -> Result<ImportCredits, ApiError> {
        self.send("/user/credits", RequestOptions::get()).await?.decode()
    }

    // ===== Categories and payees =====

    async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.cached(keys::CATEGORIES, "/categories".to_string()).await
    }

    async fn create_category(&self, category: &NewCategory) -> Result<String, ApiError> {
        let body = self
            .send("/categories", RequestOptions::post(encode(category)?))
            .await?;
        self.invalidate(&[keys::CATEGORIES]);
        created_id(body)
    }

    async fn get_payees(&self) -> Result<Vec<Payee>, ApiError> {
        self.cached(keys::PAYEES, "/payees".to_string()).await
    }

    // ===== Budgets =====

    async fn get_budget_month(&self, month: &str) -> Result<BudgetMonth, ApiError> {
        self.cached(&keys::budget_month(month), format!("/budget/{}", month)).await
    }

    async fn get_budget_amounts(&self, month: &str) -> Result<Vec<BudgetAmount>, ApiError> {
        self.cached(&keys::budget_amounts(month), format!("/budgets/{}", month)).await
    }

    async fn set_budget_amount(&self, category_id: &str, month: &str, amount_minor: i64) -> Result<Value, ApiError> {
        let payload = json!({
            "categoryId": category_id,
            "month": month,
            "amount": amount_minor,
        });
        let body = self
            .send("/budgets/set-amount", RequestOptions::post(payload))
            .await?;
        let amounts = keys::budget_amounts(month);
        let summary = keys::budget_month(month);
        self.invalidate(&[&amounts, &summary]);
        Ok(data_field(body))
    }

    // ===== Goals =====

    async fn get_goals(&self) -> Result<Vec<Goal>, ApiError> {
        self.cached(keys::GOALS, "/goals".to_string()).await
    }

    async fn create_goal(&self, goal: &GoalInput) -> Result<Goal, ApiError> {
        let body = self.send("/goals", RequestOptions::post(encode(goal)?)).await?;
        self.invalidate(&[keys::GOALS]);
        body.decode::<DataEnvelope<Goal>>().map(|envelope| envelope.data)
    }

    async fn update_goal(&self, id: &str, update: &GoalInput) -> Result<Goal, ApiError> {
        let body = self
            .send(&format!("/goals/{}", id), RequestOptions::put(encode(update)?))
            .await?;
        self.invalidate(&[keys::GOALS]);
        body.decode::<DataEnvelope<Goal>>().map(|envelope| envelope.data)
    }

    async fn delete_goal(&self, id: &str) -> Result<(), ApiError> {
        self.send(&format!("/goals/{}", id), RequestOptions::delete()).await?;
        self.invalidate(&[keys::GOALS]);
        Ok(())
    }

    // ===== Reports =====

    async fn generate_report(&self, kind: &str, range: &ReportRange) -> Result<Report, ApiError> {
        let key = keys::report(kind, range.start.as_deref(), range.end.as_deref());
        self.cached(&key, report_endpoint(kind, range)).await
    }

    // ===== Payments =====

    async fn create_payment_order(&self, order: &OrderRequest) -> Result<PaymentOrder, ApiError> {
        let mut options = RequestOptions::post(encode(order)?);
        if let Some(country) = self.locale.country_code() {
            options = options.with_header(COUNTRY_HEADER, country);
        }
        self.send("/payments/razorpay/order", options).await?.decode()
    }

    async fn verify_payment(&self, payment: &PaymentVerification) -> Result<(), ApiError> {
        self.send("/payments/razorpay/verify", RequestOptions::post(encode(payment)?))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Transport;
    use crate::auth::{Credential, CredentialManager, IdentityProvider};
    use crate::clock::Clock;
    use crate::storage::MemoryStore;
    use crate::testing::{jwt, FakeIdentity, FakeTransport, ManualClock, FAKE_BASE_URL};
    use chrono::Utc;

    struct Harness {
        transport: Arc<FakeTransport>,
        cache: Arc<ResponseCache>,
        client: RealClient,
    }

    fn harness() -> Harness {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let credentials = Arc::new(CredentialManager::new(
            Arc::new(FakeIdentity::new()) as Arc<dyn IdentityProvider>,
            Arc::new(MemoryStore::new()),
            Arc::clone(&clock) as Arc<dyn Clock>,
        ));
        credentials.sign_in(&Credential::from_token(jwt(clock.now() + chrono::Duration::hours(1))));

        let transport = Arc::new(FakeTransport::new());
        let requests =
            RequestClient::new(FAKE_BASE_URL, Arc::clone(&transport) as Arc<dyn Transport>, credentials).unwrap();
        let cache = Arc::new(ResponseCache::new(Duration::from_secs(180)));
        let client = RealClient::new(requests, Arc::clone(&cache));
        Harness { transport, cache, client }
    }

    fn seed_reads(h: &Harness) {
        h.transport.respond("GET", "/accounts", 200, r#"[{"id":"A","name":"Checking","type":"checking","balance":1000,"closed":false}]"#);
        h.transport.respond("GET", "/transactions", 200, r#"[{"id":"t1","account_id":"A","amount":-500,"date":"2024-01-02"}]"#);
        h.transport.respond("GET", "/transactions?account=A", 200, r#"[{"id":"t1","account_id":"A","amount":-500,"date":"2024-01-02"}]"#);
        h.transport.respond("GET", "/transactions?account=B", 200, r#"[{"id":"t2","account_id":"B","amount":-700,"date":"2024-01-03"}]"#);
        h.transport.respond("GET", "/categories", 200, r#"[{"id":"c1","name":"Food","is_income":false,"sort_order":1}]"#);
        h.transport.respond("GET", "/goals", 200, r#"[{"id":"g1","name":"Trip","target_amount":500.0}]"#);
    }

    async fn warm(h: &Harness) {
        h.client.get_accounts().await.unwrap();
        h.client.get_transactions(None).await.unwrap();
        h.client.get_transactions(Some("A")).await.unwrap();
        h.client.get_transactions(Some("B")).await.unwrap();
        h.client.get_categories().await.unwrap();
        h.client.get_goals().await.unwrap();
    }

    #[tokio::test]
    async fn test_reads_are_cached_and_converted() {
        let h = harness();
        seed_reads(&h);

        let first = h.client.get_accounts().await.unwrap();
        let second = h.client.get_accounts().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].balance, 10.0);
        assert_eq!(h.transport.requests_to("GET", "/accounts").len(), 1);
    }

    #[tokio::test]
    async fn test_account_transactions_use_scoped_key() {
        let h = harness();
        seed_reads(&h);

        let txs = h.client.get_transactions(Some("A")).await.unwrap();
        assert_eq!(txs[0].amount, -5.0);
        assert!(h.cache.contains("transactions:account:A"));
        assert!(!h.cache.contains("transactions:all"));
    }

    #[tokio::test]
    async fn test_create_transaction_invalidates_only_affected_keys() {
        let h = harness();
        seed_reads(&h);
        warm(&h).await;
        h.transport.respond("POST", "/transactions", 200, r#"{"data":{"id":"t9"}}"#);

        let id = h
            .client
            .create_transaction(&NewTransaction {
                account_id: "A".into(),
                amount: -12.5,
                date: "2024-01-05".into(),
                ..NewTransaction::default()
            })
            .await
            .unwrap();

        assert_eq!(id, "t9");
        assert!(!h.cache.contains("transactions:all"));
        assert!(!h.cache.contains("transactions:account:A"));
        assert!(!h.cache.contains("accounts"));
        assert!(h.cache.contains("transactions:account:B"));
        assert!(h.cache.contains("categories"));
        assert!(h.cache.contains("goals"));

        let sent = h.transport.requests_to("POST", "/transactions");
        assert_eq!(sent[0].body, crate::api::RequestBody::Json(json!({
            "account_id": "A",
            "amount": -1250,
            "date": "2024-01-05",
            "cleared": false
        })));
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_cache_untouched() {
        let h = harness();
        seed_reads(&h);
        warm(&h).await;
        h.transport.respond("DELETE", "/transactions/t1", 500, r#"{"error":"db down"}"#);

        let err = h.client.delete_transaction("t1").await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(h.cache.contains("transactions:all"));
        assert!(h.cache.contains("transactions:account:A"));
        assert!(h.cache.contains("accounts"));
    }

    #[tokio::test]
    async fn test_update_transaction_invalidates_every_account_scope() {
        let h = harness();
        seed_reads(&h);
        warm(&h).await;
        h.transport.respond("PUT", "/transactions/t1", 200, "{}");

        h.client
            .update_transaction("t1", &TransactionUpdate { cleared: Some(true), ..TransactionUpdate::default() })
            .await
            .unwrap();

        assert!(!h.cache.contains("transactions:account:A"));
        assert!(!h.cache.contains("transactions:account:B"));
        assert!(!h.cache.contains("accounts"));
        assert!(h.cache.contains("categories"));
    }

    #[tokio::test]
    async fn test_delete_account_invalidates_its_transactions() {
        let h = harness();
        seed_reads(&h);
        warm(&h).await;
        h.transport.respond("DELETE", "/accounts/A", 200, "");

        h.client.delete_account("A").await.unwrap();

        assert!(!h.cache.contains("accounts"));
        assert!(!h.cache.contains("transactions:account:A"));
        assert!(h.cache.contains("transactions:account:B"));
        assert!(h.cache.contains("transactions:all"));
    }

    #[tokio::test]
    async fn test_set_budget_amount_invalidates_that_month() {
        let h = harness();
        h.transport.respond("GET", "/budgets/2024-01", 200, r#"[{"category_id":"c1","month":"2024-01","amount":5000}]"#);
        h.transport.respond("GET", "/budgets/2024-02", 200, r#"[{"category_id":"c1","month":"2024-02","amount":7000}]"#);
        h.transport.respond("POST", "/budgets/set-amount", 200, r#"{"data":{"ok":true}}"#);
        h.client.get_budget_amounts("2024-01").await.unwrap();
        h.client.get_budget_amounts("2024-02").await.unwrap();

        let data = h.client.set_budget_amount("c1", "2024-01", 9000).await.unwrap();

        assert_eq!(data, json!({ "ok": true }));
        assert!(!h.cache.contains("budget:2024-01"));
        assert!(h.cache.contains("budget:2024-02"));
        let sent = h.transport.requests_to("POST", "/budgets/set-amount");
        assert_eq!(sent[0].body, crate::api::RequestBody::Json(json!({
            "categoryId": "c1",
            "month": "2024-01",
            "amount": 9000
        })));
    }

    #[tokio::test]
    async fn test_goal_mutations_invalidate_goals() {
        let h = harness();
        seed_reads(&h);
        warm(&h).await;
        h.transport.respond("POST", "/goals", 200, r#"{"data":{"id":"g2","name":"Car","target_amount":9000.0}}"#);

        let goal = h
            .client
            .create_goal(&GoalInput { name: Some("Car".into()), target_amount: Some(9000.0), ..GoalInput::default() })
            .await
            .unwrap();

        assert_eq!(goal.id, "g2");
        assert!(!h.cache.contains("goals"));
        assert!(h.cache.contains("accounts"));
    }

    #[tokio::test]
    async fn test_import_sends_multipart_without_json_content_type() {
        let h = harness();
        h.transport.respond("POST", "/import-transactions", 200, r#"{"imported":4}"#);

        let result = h
            .client
            .import_transactions("A", ImportFile::new("march.csv", b"date,amount\n".to_vec()))
            .await
            .unwrap();

        assert_eq!(result.imported, 4);
        let sent = &h.transport.requests_to("POST", "/import-transactions")[0];
        assert_eq!(sent.header_value("content-type"), None);
        match &sent.body {
            crate::api::RequestBody::Multipart(form) => assert_eq!(form.parts().len(), 2),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_payment_order_carries_country_header() {
        let h = harness();
        let client = h.client.with_locale(LocaleHint {
            timezone: Some("Asia/Kolkata".into()),
            language: None,
        });
        h.transport.respond(
            "POST",
            "/payments/razorpay/order",
            200,
            r#"{"order_id":"order_1","amount":49900,"currency":"INR","key_id":"rzp_test"}"#,
        );

        let order = client.create_payment_order(&OrderRequest::new(49900)).await.unwrap();

        assert_eq!(order.order_id, "order_1");
        let sent = &h.transport.requests_to("POST", "/payments/razorpay/order")[0];
        assert_eq!(sent.header_value("x-country-code"), Some("IN"));
    }

    #[tokio::test]
    async fn test_payment_order_without_locale_match_has_no_country() {
        let h = harness();
        h.transport.respond(
            "POST",
            "/payments/razorpay/order",
            200,
            r#"{"order_id":"order_2","amount":100,"currency":"USD","key_id":"rzp_test"}"#,
        );

        h.client.create_payment_order(&OrderRequest::new(100)).await.unwrap();

        let sent = &h.transport.requests_to("POST", "/payments/razorpay/order")[0];
        assert_eq!(sent.header_value("x-country-code"), None);
    }

    #[tokio::test]
    async fn test_server_version_falls_back() {
        let h = harness();
        h.transport.respond("GET", "/", 200, "OK");
        assert_eq!(h.client.server_version().await.unwrap(), DEFAULT_SERVER_VERSION);
    }

    #[tokio::test]
    async fn test_report_endpoint_and_key() {
        let h = harness();
        h.transport.respond(
            "GET",
            "/reports/spending?startDate=2024-01-01&endDate=2024-01-31",
            200,
            r#"{"data":[{"id":"t1","account_id":"A","amount":-500,"date":"2024-01-02"}],"summary":{"total":5.0,"count":1}}"#,
        );

        let report = h
            .client
            .generate_report("spending", &ReportRange::between("2024-01-01", "2024-01-31"))
            .await
            .unwrap();

        assert_eq!(report.summary.count, Some(1));
        assert!(h.cache.contains("report:spending:2024-01-01:2024-01-31"));
    }

    #[tokio::test]
    async fn test_new_transaction_refreshes_reports() {
        let h = harness();
        let endpoint = "/reports/spending?startDate=2024-01-01&endDate=2024-01-31";
        h.transport.respond(
            "GET",
            endpoint,
            200,
            r#"{"data":[{"id":"t1","account_id":"A","amount":-500,"date":"2024-01-02"}],"summary":{"total":5.0,"count":1}}"#,
        );
        h.transport.respond(
            "GET",
            endpoint,
            200,
            r#"{"data":[{"id":"t1","account_id":"A","amount":-500,"date":"2024-01-02"},{"id":"t9","account_id":"A","amount":-1250,"date":"2024-01-05"}],"summary":{"total":17.5,"count":2}}"#,
        );
        h.transport.respond("POST", "/transactions", 200, r#"{"data":{"id":"t9"}}"#);
        let january = ReportRange::between("2024-01-01", "2024-01-31");

        let before = h.client.generate_report("spending", &january).await.unwrap();
        h.client
            .create_transaction(&NewTransaction {
                account_id: "A".into(),
                amount: -12.5,
                date: "2024-01-05".into(),
                ..NewTransaction::default()
            })
            .await
            .unwrap();
        assert!(!h.cache.contains("report:spending:2024-01-01:2024-01-31"));
        let after = h.client.generate_report("spending", &january).await.unwrap();

        assert_eq!(before.summary.count, Some(1));
        assert_eq!(after.summary.count, Some(2));
        assert_eq!(h.transport.requests_to("GET", endpoint).len(), 2);
    }

    #[tokio::test]
    async fn test_transaction_for_one_account_keeps_similar_ids_cached() {
        let h = harness();
        h.transport.respond("GET", "/transactions?account=A", 200, r#"[{"id":"t1","account_id":"A","amount":-500,"date":"2024-01-02"}]"#);
        h.transport.respond("GET", "/transactions?account=A1", 200, r#"[{"id":"t5","account_id":"A1","amount":-100,"date":"2024-01-04"}]"#);
        h.transport.respond("POST", "/transactions", 200, r#"{"data":{"id":"t9"}}"#);
        h.client.get_transactions(Some("A")).await.unwrap();
        h.client.get_transactions(Some("A1")).await.unwrap();

        h.client
            .create_transaction(&NewTransaction {
                account_id: "A".into(),
                amount: -1.0,
                date: "2024-01-06".into(),
                ..NewTransaction::default()
            })
            .await
            .unwrap();

        assert!(!h.cache.contains("transactions:account:A"));
        assert!(h.cache.contains("transactions:account:A1"));
    }
}
