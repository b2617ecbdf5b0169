//! Repository layer for visit storage

pub mod memory;
pub mod visits;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    error::AppResult,
    models::visit::{NewVisit, Visit, VisitChanges, VisitFilter},
};

pub use memory::MemoryVisitStore;
pub use visits::VisitsRepository;

/// Storage contract consumed by the visit lifecycle service.
///
/// Implementations enforce that a card is held by at most one checked-in
/// visit: `insert` fails with `AppError::Conflict` otherwise.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Visits matching the filter, most recent check-in first
    async fn list(&self, filter: &VisitFilter) -> AppResult<Vec<Visit>>;

    async fn get(&self, id: i32) -> AppResult<Option<Visit>>;

    /// Store a new checked-in visit and assign its id
    async fn insert(&self, visit: NewVisit) -> AppResult<Visit>;

    /// Apply changes; `None` when the visit does not exist
    async fn update(&self, id: i32, changes: VisitChanges) -> AppResult<Option<Visit>>;

    /// Returns false when the visit does not exist
    async fn delete(&self, id: i32) -> AppResult<bool>;

    /// Delete every visit checked in strictly before `cutoff`
    async fn delete_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;

    /// Most recent visit (by check-in time) carrying this card
    async fn find_latest_by_card(&self, card_id: &str) -> AppResult<Option<Visit>>;

    /// Cheap connectivity check for readiness probes
    async fn ping(&self) -> AppResult<()>;
}
