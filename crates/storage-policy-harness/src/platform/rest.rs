// crates/storage-policy-harness/src/platform/rest.rs
// ============================================================================
// Module: Platform Row API
// Description: Row insert/select/delete and remote procedure calls.
// Purpose: Manage fixture records and invoke role procedures.
// Dependencies: reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! Row calls follow the PostgREST conventions: equality filters are query
//! parameters of the form `column=eq.value`, and inserts ask for the stored
//! representation so generated ids come back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::Authority;
use super::PlatformClient;
use super::PlatformError;
use super::RequestSpec;
use super::decode_json;

// ============================================================================
// SECTION: Client Methods
// ============================================================================

impl PlatformClient {
    /// Inserts one row and returns the stored representation.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the platform refuses, is unreachable,
    /// or returns no row.
    pub async fn insert_row<T, R>(
        &self,
        authority: Authority,
        table: &str,
        row: &T,
    ) -> Result<R, PlatformError>
    where
        T: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(&format!("/rest/v1/{table}"))?;
        let body = serde_json::to_value(row)
            .map_err(|err| PlatformError::Request(format!("serialize {table} row: {err}")))?;
        let spec = RequestSpec::new(Method::POST, url, authority)
            .header("prefer", "return=representation")
            .json(body)
            .no_retry();
        let path = spec.url.path().to_string();
        let bytes = self.execute_ok(spec).await?;
        let mut rows: Vec<R> = decode_json(&path, &bytes)?;
        if rows.is_empty() {
            return Err(PlatformError::Decode(format!("insert into {table} returned no rows")));
        }
        Ok(rows.swap_remove(0))
    }

    /// Selects rows where `column` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the platform refuses or is unreachable.
    pub async fn select_eq<R: DeserializeOwned>(
        &self,
        authority: Authority,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<Vec<R>, PlatformError> {
        let url = self.filtered(table, column, value)?;
        let spec = RequestSpec::new(Method::GET, url, authority);
        self.execute_json(spec).await
    }

    /// Deletes rows where `column` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the platform refuses or is unreachable.
    pub async fn delete_eq(
        &self,
        authority: Authority,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<(), PlatformError> {
        let url = self.filtered(table, column, value)?;
        let spec = RequestSpec::new(Method::DELETE, url, authority);
        self.execute_ok(spec).await.map(|_| ())
    }

    /// Invokes a remote procedure with JSON arguments.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the platform refuses or is unreachable.
    pub async fn rpc(
        &self,
        authority: Authority,
        function: &str,
        args: Value,
    ) -> Result<Value, PlatformError> {
        let url = self.endpoint(&format!("/rest/v1/rpc/{function}"))?;
        let spec = RequestSpec::new(Method::POST, url, authority).json(args).no_retry();
        self.execute_json(spec).await
    }

    /// Builds a table URL with one equality filter.
    fn filtered(&self, table: &str, column: &str, value: &str) -> Result<Url, PlatformError> {
        let mut url = self.endpoint(&format!("/rest/v1/{table}"))?;
        url.query_pairs_mut().append_pair(column, &format!("eq.{value}"));
        Ok(url)
    }
}
