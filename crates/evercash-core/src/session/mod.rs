//! Session orchestration: which backend is active, and whether it is
//! authenticated.

pub mod controller;

pub use controller::{SessionController, SessionOptions, SessionState};
