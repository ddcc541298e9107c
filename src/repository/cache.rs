//! Time-bounded listing cache layered over any repository.
//!
//! Only per-category listings are cached. Counts and single-row lookups always
//! reach the store. Every successful write drops the whole cache so a trainer
//! never sees a listing older than their own last change.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::domain::category::Category;
use crate::domain::trainer_data::{NewTrainerDataRow, TrainerDataChanges, TrainerDataRow};
use crate::domain::types::{RowId, TrainerId};
use crate::repository::{
    ListingInvalidator, RepositoryResult, TrainerDataReader, TrainerDataWriter,
};

type ListingKey = (TrainerId, Category);

struct CachedListing {
    stored_at: Instant,
    rows: Vec<TrainerDataRow>,
}

/// Listings keyed by owner and category, each valid for `ttl`.
pub struct ListingCache {
    ttl: Duration,
    entries: Mutex<HashMap<ListingKey, CachedListing>>,
}

impl ListingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    // A panic while holding the lock cannot leave a half-written entry behind,
    // so a poisoned map is still usable.
    fn entries(&self) -> MutexGuard<'_, HashMap<ListingKey, CachedListing>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, trainer_id: &TrainerId, category: Category) -> Option<Vec<TrainerDataRow>> {
        let mut entries = self.entries();
        let key = (trainer_id.clone(), category);
        match entries.get(&key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.rows.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, trainer_id: &TrainerId, category: Category, rows: Vec<TrainerDataRow>) {
        if self.ttl.is_zero() {
            return;
        }
        let mut entries = self.entries();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        entries.insert(
            (trainer_id.clone(), category),
            CachedListing {
                stored_at: Instant::now(),
                rows,
            },
        );
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Repository decorator serving listings from a shared [`ListingCache`].
#[derive(Clone)]
pub struct CachedRepository<R> {
    inner: R,
    cache: Arc<ListingCache>,
}

impl<R> CachedRepository<R> {
    pub fn new(inner: R, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Arc::new(ListingCache::new(ttl)),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn cache(&self) -> &ListingCache {
        &self.cache
    }
}

impl<R: TrainerDataReader> TrainerDataReader for CachedRepository<R> {
    fn count_rows(&self, trainer_id: &TrainerId, category: Category) -> RepositoryResult<usize> {
        self.inner.count_rows(trainer_id, category)
    }

    fn list_rows(
        &self,
        trainer_id: &TrainerId,
        category: Category,
    ) -> RepositoryResult<Vec<TrainerDataRow>> {
        if let Some(rows) = self.cache.get(trainer_id, category) {
            return Ok(rows);
        }
        let rows = self.inner.list_rows(trainer_id, category)?;
        self.cache.put(trainer_id, category, rows.clone());
        Ok(rows)
    }

    fn get_row(&self, category: Category, id: RowId) -> RepositoryResult<Option<TrainerDataRow>> {
        self.inner.get_row(category, id)
    }
}

impl<R: TrainerDataWriter> TrainerDataWriter for CachedRepository<R> {
    fn create_row(&self, row: &NewTrainerDataRow) -> RepositoryResult<RowId> {
        let id = self.inner.create_row(row)?;
        self.cache.clear();
        Ok(id)
    }

    fn update_row(&self, changes: &TrainerDataChanges) -> RepositoryResult<usize> {
        let affected = self.inner.update_row(changes)?;
        self.cache.clear();
        Ok(affected)
    }

    fn delete_row(&self, category: Category, id: RowId) -> RepositoryResult<usize> {
        let affected = self.inner.delete_row(category, id)?;
        self.cache.clear();
        Ok(affected)
    }
}

impl<R> ListingInvalidator for CachedRepository<R> {
    fn invalidate_listings(&self) {
        log::info!("Clearing {} cached listings", self.cache.len());
        self.cache.clear();
    }
}
