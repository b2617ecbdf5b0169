//! Demo data for empty registers

use crate::{
    error::AppResult,
    models::visit::{CreateVisit, VisitQuery},
};

use super::visits::VisitsService;

/// Insert one active and one closed visit when the register is empty.
///
/// Returns the number of visits created.
pub async fn seed_if_empty(visits: &VisitsService) -> AppResult<usize> {
    if !visits.list(&VisitQuery::default()).await?.is_empty() {
        tracing::info!("Register already seeded");
        return Ok(0);
    }

    tracing::info!("Seeding register with demo visits");

    visits
        .register(CreateVisit {
            full_name: "Budi Santoso".to_string(),
            phone_number: "08123456789".to_string(),
            rfid_card_id: Some("1234567890".to_string()),
            address: Some("PT. Maju Mundur".to_string()),
            meeting_with: "Pak Manager".to_string(),
            purpose: "Meeting Project A".to_string(),
            photo_url: Some(
                "https://ui-avatars.com/api/?name=Budi+Santoso&background=random".to_string(),
            ),
        })
        .await?;

    let siti = visits
        .register(CreateVisit {
            full_name: "Siti Aminah".to_string(),
            phone_number: "08198765432".to_string(),
            rfid_card_id: Some("0987654321".to_string()),
            address: Some("Freelancer".to_string()),
            meeting_with: "HRD".to_string(),
            purpose: "Interview".to_string(),
            photo_url: None,
        })
        .await?;
    visits.checkout(siti.id).await?;

    Ok(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::visit::VisitStatus,
        repository::MemoryVisitStore,
        services::clock::SystemClock,
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn test_seed_only_runs_once() {
        let service = VisitsService::new(Arc::new(MemoryVisitStore::new()), Arc::new(SystemClock));

        assert_eq!(seed_if_empty(&service).await.unwrap(), 2);
        assert_eq!(seed_if_empty(&service).await.unwrap(), 0);

        let visits = service.backup().await.unwrap();
        assert_eq!(visits.len(), 2);
        let siti = visits.iter().find(|v| v.full_name == "Siti Aminah").unwrap();
        assert_eq!(siti.status, VisitStatus::CheckedOut);
        assert!(siti.check_out_time.is_some());
    }
}
