//! The seam between the catalog engine and the backend.

use std::future::Future;

use cps_supabase::{Query, SelectPage, SupabaseClient, SupabaseError};
use serde_json::Value;

/// Read access to the marketplace tables.
///
/// [`SupabaseClient`] is the production implementation; tests use an
/// in-memory table set that interprets the same [`Query`].
pub trait ProductSource: Send + Sync {
    /// Runs `query`, returning the rows and, if requested, the exact total.
    fn fetch_page(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<SelectPage, SupabaseError>> + Send;

    /// Calls a server-side function that may not exist.
    fn call_rpc(
        &self,
        function: &str,
        args: &Value,
    ) -> impl Future<Output = Result<Value, SupabaseError>> + Send;
}

impl ProductSource for SupabaseClient {
    async fn fetch_page(&self, query: &Query) -> Result<SelectPage, SupabaseError> {
        self.select_page(query).await
    }

    async fn call_rpc(&self, function: &str, args: &Value) -> Result<Value, SupabaseError> {
        self.rpc(function, args).await
    }
}
