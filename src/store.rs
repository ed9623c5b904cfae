//! Store connection capability, injected by the caller.
//!
//! The engine never assembles connection strings or talks to a driver
//! directly. Callers hand it a [`StoreConnector`]; every store round-trip
//! (the one-time schema query and each batch execute/commit) acquires its own
//! connection through `connect`, uses it, and releases it before the next
//! round-trip begins. The happy path closes explicitly; failure paths release
//! through drop.

use std::time::Duration;

use crate::error::Result;

/// Opens connections to the destination store.
///
/// Implementations wrap whatever driver the caller uses: an ODBC handle, a
/// wire-protocol client, or a test double. One connector serves one job run.
pub trait StoreConnector {
    fn connect(&self) -> Result<Box<dyn StoreConnection + '_>>;
}

/// One scoped connection: query, execute, commit, close.
pub trait StoreConnection {
    /// Runs a row-returning query; each row comes back as its column values
    /// rendered to strings. Used only for metadata lookups.
    fn query_rows(&mut self, sql: &str) -> Result<Vec<Vec<String>>>;

    /// Executes statement text. A `timeout` of `None` may block indefinitely;
    /// there is no cancellation once an execute is issued.
    fn execute(&mut self, sql: &str, timeout: Option<Duration>) -> Result<()>;

    /// Commits the work executed on this connection.
    fn commit(&mut self) -> Result<()>;

    /// Releases the connection. Failure paths may drop instead.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Connector for jobs that never touch a store: script-only runs driven by a
/// table-meta snapshot. Any attempt to connect is a configuration error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStore;

impl StoreConnector for NoStore {
    fn connect(&self) -> Result<Box<dyn StoreConnection + '_>> {
        Err(crate::error::ImportError::config(
            "no store configured; script jobs resolve their schema from a table-meta file",
        ))
    }
}
