//! REST API access for the Evercash backend.
//!
//! Layers, outermost first:
//!
//! - `BudgetApi`: the typed operation set handed to consumers
//! - `RealClient`: implements it over the response cache and `RequestClient`
//! - `RequestClient`: bearer credential, single 401 retry, error normalization
//! - `Transport`: the HTTP seam (`ReqwestTransport` in production)
//!
//! The backend authenticates with JWT bearer tokens issued by a
//! GoTrue-compatible identity service (see `auth`).

pub mod budget_api;
pub mod client;
pub mod error;
pub mod request;
pub mod transport;

pub use budget_api::BudgetApi;
pub use client::RealClient;
pub use error::ApiError;
pub use request::{RequestClient, RequestOptions, ResponseBody};
pub use transport::{
    FormPart, HttpRequest, HttpResponse, MultipartForm, RequestBody, ReqwestTransport, Transport,
};
