//! Cleanup pipeline
//!
//! - [`policy`]: which tags may be deleted
//! - [`fetcher`]: full, newest-first tag list of one repository
//! - [`repository`]: fetch, select and delete for one repository
//! - [`batch`]: all configured repositories, reduced to one outcome

pub mod batch;
pub mod fetcher;
pub mod policy;
pub mod repository;

pub use batch::{BatchRunner, BatchSummary, RepositoryFailure};
pub use fetcher::fetch_all_tags;
pub use policy::{RetentionPolicy, is_eligible_for_deletion};
pub use repository::{CleanupReport, DeleteFailure, RepositoryCleaner};

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::num::NonZeroUsize;

/// Drive all futures to completion, at most `limit` at a time.
/// Results come back in input order and every future settles.
pub(crate) async fn fan_out<F, T>(futures: Vec<F>, limit: Option<NonZeroUsize>) -> Vec<T>
where
    F: Future<Output = T>,
{
    match limit {
        None => join_all(futures).await,
        Some(limit) => stream::iter(futures).buffered(limit.get()).collect().await,
    }
}
