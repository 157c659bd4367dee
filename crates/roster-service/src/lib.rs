//! Contact resolution for Roster: the repository that maps contacts onto
//! encrypted store documents, and the cache-aside service in front of it.

mod document;
pub mod repository;
pub mod service;

pub use repository::{ContactRepository, Repository};
pub use service::ContactService;

use std::{future::Future, time::Duration};

use roster_core::{Error, Result};

/// Run `fut`, failing with [`Error::Timeout`] once `limit` has elapsed.
pub(crate) async fn bounded<T>(
  operation: &'static str,
  limit: Duration,
  fut: impl Future<Output = T>,
) -> Result<T> {
  tokio::time::timeout(limit, fut)
    .await
    .map_err(|_| Error::Timeout { operation })
}
