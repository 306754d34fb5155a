//! Storage port — repository trait for thing rows.

use std::future::Future;

use toxotes_domain::command::Selector;
use toxotes_domain::error::ToxotesError;
use toxotes_domain::reconcile::ThingUpdate;
use toxotes_domain::thing::Thing;

/// Repository for reading and updating [`Thing`]s.
pub trait ThingRepository {
    /// Every thing matching `selector` exactly, in the store's natural order.
    ///
    /// An empty result is not an error at this level.
    fn find_by_selector(
        &self,
        selector: &Selector,
    ) -> impl Future<Output = Result<Vec<Thing>, ToxotesError>> + Send;

    /// Apply all updates as one atomic batch: either every row changes or none.
    fn apply_updates(
        &self,
        batch: Vec<ThingUpdate>,
    ) -> impl Future<Output = Result<(), ToxotesError>> + Send;

    /// Get all things.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Thing>, ToxotesError>> + Send;

    /// Create or replace a thing by unique id.
    fn upsert(&self, thing: Thing) -> impl Future<Output = Result<Thing, ToxotesError>> + Send;
}

impl<T: ThingRepository + Send + Sync> ThingRepository for std::sync::Arc<T> {
    fn find_by_selector(
        &self,
        selector: &Selector,
    ) -> impl Future<Output = Result<Vec<Thing>, ToxotesError>> + Send {
        (**self).find_by_selector(selector)
    }

    fn apply_updates(
        &self,
        batch: Vec<ThingUpdate>,
    ) -> impl Future<Output = Result<(), ToxotesError>> + Send {
        (**self).apply_updates(batch)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Thing>, ToxotesError>> + Send {
        (**self).get_all()
    }

    fn upsert(&self, thing: Thing) -> impl Future<Output = Result<Thing, ToxotesError>> + Send {
        (**self).upsert(thing)
    }
}
