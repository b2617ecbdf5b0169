//! Visit lifecycle service
//!
//! Owns the check-in/check-out state machine for a single stay:
//! `register -> checked_in -> (checkout | card scan | patch) -> checked_out`.
//! A checked-out visit is terminal; a returning visitor gets a new record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use validator::Validate;

use super::clock::Clock;
use crate::{
    error::{AppError, AppResult},
    models::visit::{
        patched_optional, patched_required, CreateVisit, PurgeRange, ScanResult, Visit,
        VisitChanges, VisitFilter, VisitPatch, VisitQuery, VisitStatus,
    },
    repository::VisitStore,
};

/// Result of presenting a card at the scanner
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// The card's active visit was checked out
    CheckedOut(Visit),
    /// The card's latest visit is already closed
    AlreadyCheckedOut(Visit),
    /// No visit ever carried this card
    NotRegistered,
}

impl ScanOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::CheckedOut(_))
    }
}

impl From<ScanOutcome> for ScanResult {
    fn from(outcome: ScanOutcome) -> Self {
        match outcome {
            ScanOutcome::CheckedOut(visit) => ScanResult {
                success: true,
                message: format!("Checked out: {}", visit.full_name),
                visit: Some(visit),
            },
            ScanOutcome::AlreadyCheckedOut(visit) => ScanResult {
                success: false,
                message: format!(
                    "Card {} has already been checked out. Please register again for a new visit.",
                    visit.rfid_card_id.as_deref().unwrap_or_default()
                ),
                visit: Some(visit),
            },
            ScanOutcome::NotRegistered => ScanResult {
                success: false,
                visit: None,
                message: "Card is not registered or has no active visit.".to_string(),
            },
        }
    }
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Visit {} not found", id))
}

#[derive(Clone)]
pub struct VisitsService {
    store: Arc<dyn VisitStore>,
    clock: Arc<dyn Clock>,
}

impl VisitsService {
    pub fn new(store: Arc<dyn VisitStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// List visits, most recent check-in first
    pub async fn list(&self, query: &VisitQuery) -> AppResult<Vec<Visit>> {
        self.store.list(&VisitFilter::from(query)).await
    }

    /// Unfiltered snapshot of the whole register
    pub async fn backup(&self) -> AppResult<Vec<Visit>> {
        self.store.list(&VisitFilter::default()).await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Visit> {
        self.store.get(id).await?.ok_or_else(|| not_found(id))
    }

    /// Check a new visitor in.
    ///
    /// A card already bound to a checked-in visit is refused; the holder must
    /// be checked out first.
    pub async fn register(&self, data: CreateVisit) -> AppResult<Visit> {
        let new_visit = data.into_new_visit(self.clock.now())?;
        new_visit.validate()?;

        if let Some(ref card) = new_visit.rfid_card_id {
            if let Some(holder) = self.store.find_latest_by_card(card).await? {
                if holder.is_checked_in() {
                    tracing::warn!(card = %card, holder_id = holder.id, "Card already in use");
                    return Err(AppError::Conflict(format!(
                        "RFID {} is currently being used by {}. Please check them out first or use a different card.",
                        card, holder.full_name
                    )));
                }
            }
        }

        let visit = self.store.insert(new_visit).await?;
        tracing::info!(visit_id = visit.id, card = ?visit.rfid_card_id, "Visitor checked in");
        Ok(visit)
    }

    /// Check a visit out. Already checked-out visits are returned unchanged.
    pub async fn checkout(&self, id: i32) -> AppResult<Visit> {
        let visit = self.get_by_id(id).await?;
        if !visit.is_checked_in() {
            tracing::debug!(visit_id = id, "Visit already checked out");
            return Ok(visit);
        }
        self.close(visit).await
    }

    async fn close(&self, visit: Visit) -> AppResult<Visit> {
        let at = self.clock.now().max(visit.check_in_time);
        let updated = self
            .store
            .update(visit.id, VisitChanges::checkout(at))
            .await?
            .ok_or_else(|| not_found(visit.id))?;
        tracing::info!(visit_id = updated.id, "Visitor checked out");
        Ok(updated)
    }

    /// Check out the visit bound to a presented card
    pub async fn scan_card(&self, card_id: &str) -> AppResult<ScanOutcome> {
        let card_id = card_id.trim();
        if card_id.is_empty() {
            return Err(AppError::Validation("RFID required".to_string()));
        }

        let outcome = match self.store.find_latest_by_card(card_id).await? {
            Some(visit) if visit.is_checked_in() => ScanOutcome::CheckedOut(self.close(visit).await?),
            Some(visit) => ScanOutcome::AlreadyCheckedOut(visit),
            None => ScanOutcome::NotRegistered,
        };

        tracing::info!(card = %card_id, success = outcome.is_success(), "Card scanned");
        Ok(outcome)
    }

    /// Apply a partial update
    pub async fn update(&self, id: i32, patch: VisitPatch) -> AppResult<Visit> {
        let visit = self.get_by_id(id).await?;
        let changes = resolve_patch(&visit, &patch, self.clock.now())?;
        changes.validate()?;
        self.store.update(id, changes).await?.ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(visit_id = id, "Visit deleted");
        Ok(())
    }

    /// Delete every visit checked in before the retention window
    pub async fn purge(&self, range: PurgeRange) -> AppResult<u64> {
        let cutoff = range.cutoff(self.clock.now())?;
        let deleted = self.store.delete_before(cutoff).await?;
        tracing::info!(range = range.label(), %cutoff, deleted, "Visits purged");
        Ok(deleted)
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

/// Turn a patch into column changes without breaking the status invariants
fn resolve_patch(visit: &Visit, patch: &VisitPatch, now: DateTime<Utc>) -> AppResult<VisitChanges> {
    let mut changes = VisitChanges {
        full_name: patched_required("full_name", &patch.full_name)?,
        phone_number: patched_required("phone_number", &patch.phone_number)?,
        address: patched_optional(&patch.address),
        meeting_with: patched_required("meeting_with", &patch.meeting_with)?,
        purpose: patched_required("purpose", &patch.purpose)?,
        photo_url: patched_optional(&patch.photo_url),
        check_out_time: None,
    };

    // Some(requested time) when the patch asks for a checkout
    let checkout = match (patch.status, patch.check_out_time) {
        (Some(VisitStatus::CheckedIn), Some(_)) => {
            return Err(AppError::Validation(
                "check_out_time cannot be set on a checked_in visit".to_string(),
            ));
        }
        (Some(VisitStatus::CheckedIn), None) => {
            if !visit.is_checked_in() {
                return Err(AppError::Validation(
                    "A checked-out visit cannot be checked in again; register a new visit".to_string(),
                ));
            }
            None
        }
        (Some(VisitStatus::CheckedOut), at) => Some(at),
        (None, Some(at)) => Some(Some(at)),
        (None, None) => None,
    };

    if let Some(requested) = checkout {
        match (visit.check_out_time, requested) {
            (Some(_), None) => {}
            (Some(existing), Some(at)) if existing == at => {}
            (Some(_), Some(_)) => {
                return Err(AppError::Validation(format!(
                    "Check-out time is already recorded for visit {}",
                    visit.id
                )));
            }
            (None, requested) => {
                let at = requested.unwrap_or_else(|| now.max(visit.check_in_time));
                if at < visit.check_in_time {
                    return Err(AppError::Validation(
                        "check_out_time cannot be earlier than check_in_time".to_string(),
                    ));
                }
                changes.check_out_time = Some(at);
            }
        }
    }

    Ok(changes)
}
