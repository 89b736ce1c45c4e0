//! REST client for the hosted product database.
//!
//! Exposes a small query builder ([`Query`]), the HTTP client
//! ([`SupabaseClient`]) and its error type.

pub mod client;
pub mod error;
pub mod query;
mod retry;

pub use client::{ClientOptions, SelectPage, SupabaseClient};
pub use error::SupabaseError;
pub use query::{escape_like, Filter, Order, Query};
