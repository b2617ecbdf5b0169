//! In-process visit store
//!
//! Used for development runs (`storage.backend = "memory"`) and tests.
//! Everything lives behind one lock, so the active-card check and the insert
//! happen atomically.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::VisitStore;
use crate::{
    error::{AppError, AppResult},
    models::visit::{NewVisit, Visit, VisitChanges, VisitFilter, VisitStatus},
};

#[derive(Default)]
struct MemoryState {
    next_id: i32,
    visits: BTreeMap<i32, Visit>,
}

#[derive(Clone, Default)]
pub struct MemoryVisitStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryVisitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Most recent check-in first; later ids win ties
fn newest_first(a: &Visit, b: &Visit) -> std::cmp::Ordering {
    b.check_in_time
        .cmp(&a.check_in_time)
        .then_with(|| b.id.cmp(&a.id))
}

#[async_trait]
impl VisitStore for MemoryVisitStore {
    async fn list(&self, filter: &VisitFilter) -> AppResult<Vec<Visit>> {
        let state = self.state.read().await;
        let mut visits: Vec<Visit> = state
            .visits
            .values()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect();
        visits.sort_by(newest_first);
        Ok(visits)
    }

    async fn get(&self, id: i32) -> AppResult<Option<Visit>> {
        let state = self.state.read().await;
        Ok(state.visits.get(&id).cloned())
    }

    async fn insert(&self, visit: NewVisit) -> AppResult<Visit> {
        let mut state = self.state.write().await;

        if let Some(ref card) = visit.rfid_card_id {
            let holder = state
                .visits
                .values()
                .find(|v| v.is_checked_in() && v.rfid_card_id.as_ref() == Some(card));
            if let Some(holder) = holder {
                return Err(AppError::Conflict(format!(
                    "RFID {} is currently being used by {}",
                    card, holder.full_name
                )));
            }
        }

        state.next_id += 1;
        let stored = Visit {
            id: state.next_id,
            full_name: visit.full_name,
            rfid_card_id: visit.rfid_card_id,
            phone_number: visit.phone_number,
            address: visit.address,
            meeting_with: visit.meeting_with,
            purpose: visit.purpose,
            photo_url: visit.photo_url,
            check_in_time: visit.check_in_time,
            check_out_time: None,
            status: VisitStatus::CheckedIn,
        };
        state.visits.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i32, changes: VisitChanges) -> AppResult<Option<Visit>> {
        let mut state = self.state.write().await;
        let Some(visit) = state.visits.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(full_name) = changes.full_name {
            visit.full_name = full_name;
        }
        if let Some(phone_number) = changes.phone_number {
            visit.phone_number = phone_number;
        }
        if let Some(address) = changes.address {
            visit.address = address;
        }
        if let Some(meeting_with) = changes.meeting_with {
            visit.meeting_with = meeting_with;
        }
        if let Some(purpose) = changes.purpose {
            visit.purpose = purpose;
        }
        if let Some(photo_url) = changes.photo_url {
            visit.photo_url = photo_url;
        }
        if let Some(at) = changes.check_out_time {
            visit.check_out_time = Some(at);
            visit.status = VisitStatus::CheckedOut;
        }

        Ok(Some(visit.clone()))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut state = self.state.write().await;
        Ok(state.visits.remove(&id).is_some())
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.visits.len();
        state.visits.retain(|_, v| v.check_in_time >= cutoff);
        Ok((before - state.visits.len()) as u64)
    }

    async fn find_latest_by_card(&self, card_id: &str) -> AppResult<Option<Visit>> {
        let state = self.state.read().await;
        Ok(state
            .visits
            .values()
            .filter(|v| v.rfid_card_id.as_deref() == Some(card_id))
            .min_by(|a, b| newest_first(a, b))
            .cloned())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_visit(name: &str, card: Option<&str>, at: DateTime<Utc>) -> NewVisit {
        NewVisit {
            full_name: name.to_string(),
            phone_number: "08123456789".to_string(),
            rfid_card_id: card.map(str::to_string),
            address: None,
            meeting_with: "HRD".to_string(),
            purpose: "Interview".to_string(),
            photo_url: None,
            check_in_time: at,
        }
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_with_stable_ties() {
        let store = MemoryVisitStore::new();
        let now = Utc::now();
        let older = store.insert(new_visit("Older", None, now - Duration::hours(1))).await.unwrap();
        let tie_a = store.insert(new_visit("Tie A", None, now)).await.unwrap();
        let tie_b = store.insert(new_visit("Tie B", None, now)).await.unwrap();

        let ids: Vec<i32> = store
            .list(&VisitFilter::default())
            .await
            .unwrap()
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, vec![tie_b.id, tie_a.id, older.id]);
    }

    #[tokio::test]
    async fn test_insert_rejects_active_card() {
        let store = MemoryVisitStore::new();
        let now = Utc::now();
        store.insert(new_visit("Budi", Some("123"), now)).await.unwrap();

        match store.insert(new_visit("Siti", Some("123"), now)).await {
            Err(AppError::Conflict(msg)) => assert!(msg.contains("Budi")),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_checkout_releases_card() {
        let store = MemoryVisitStore::new();
        let now = Utc::now();
        let budi = store.insert(new_visit("Budi", Some("123"), now)).await.unwrap();
        let updated = store
            .update(budi.id, VisitChanges::checkout(now))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, VisitStatus::CheckedOut);

        let siti = store.insert(new_visit("Siti", Some("123"), now + Duration::seconds(1))).await.unwrap();
        let latest = store.find_latest_by_card("123").await.unwrap().unwrap();
        assert_eq!(latest.id, siti.id);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let store = MemoryVisitStore::new();
        assert!(store.update(42, VisitChanges::default()).await.unwrap().is_none());
        assert!(!store.delete(42).await.unwrap());
        assert!(store.get(42).await.unwrap().is_none());
    }
}
