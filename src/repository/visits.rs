//! Visits repository for PostgreSQL

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use super::VisitStore;
use crate::{
    error::{AppError, AppResult},
    models::visit::{NewVisit, Visit, VisitChanges, VisitFilter, VisitStatus},
};

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct VisitsRepository {
    pool: Pool<Postgres>,
}

impl VisitsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards so the search text matches literally
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl VisitStore for VisitsRepository {
    async fn list(&self, filter: &VisitFilter) -> AppResult<Vec<Visit>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if filter.status.is_some() {
            conditions.push(format!("status = ${}", idx));
            idx += 1;
        }
        if filter.search.is_some() {
            conditions.push(format!(
                "(full_name ILIKE ${0} OR address ILIKE ${0} OR meeting_with ILIKE ${0})",
                idx
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT * FROM visits {} ORDER BY check_in_time DESC, id DESC",
            where_clause
        );

        let mut builder = sqlx::query_as::<_, Visit>(&query);
        if let Some(status) = filter.status {
            builder = builder.bind(status);
        }
        if let Some(ref search) = filter.search {
            builder = builder.bind(like_pattern(search));
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn get(&self, id: i32) -> AppResult<Option<Visit>> {
        let row = sqlx::query_as::<_, Visit>("SELECT * FROM visits WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, visit: NewVisit) -> AppResult<Visit> {
        sqlx::query_as::<_, Visit>(
            r#"
            INSERT INTO visits (full_name, rfid_card_id, phone_number, address, meeting_with,
                                purpose, photo_url, check_in_time, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&visit.full_name)
        .bind(&visit.rfid_card_id)
        .bind(&visit.phone_number)
        .bind(&visit.address)
        .bind(&visit.meeting_with)
        .bind(&visit.purpose)
        .bind(&visit.photo_url)
        .bind(visit.check_in_time)
        .bind(VisitStatus::CheckedIn)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // The partial unique index on active cards closes the register race
            let card_in_use = matches!(
                &e,
                sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION)
            );
            if card_in_use {
                AppError::Conflict(format!(
                    "RFID {} is currently in use by another visitor",
                    visit.rfid_card_id.as_deref().unwrap_or_default()
                ))
            } else {
                AppError::Database(e)
            }
        })
    }

    async fn update(&self, id: i32, changes: VisitChanges) -> AppResult<Option<Visit>> {
        if changes.is_empty() {
            return self.get(id).await;
        }

        let mut sets = Vec::new();
        let mut idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(changes.full_name, "full_name");
        add_field!(changes.phone_number, "phone_number");
        add_field!(changes.address, "address");
        add_field!(changes.meeting_with, "meeting_with");
        add_field!(changes.purpose, "purpose");
        add_field!(changes.photo_url, "photo_url");
        if changes.check_out_time.is_some() {
            sets.push(format!("check_out_time = ${}", idx));
            sets.push(format!("status = '{}'", VisitStatus::CheckedOut));
            idx += 1;
        }

        let query = format!(
            "UPDATE visits SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Visit>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(changes.full_name);
        bind_field!(changes.phone_number);
        bind_field!(changes.address);
        bind_field!(changes.meeting_with);
        bind_field!(changes.purpose);
        bind_field!(changes.photo_url);
        bind_field!(changes.check_out_time);

        let row = builder.bind(id).fetch_optional(&self.pool).await?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM visits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM visits WHERE check_in_time < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn find_latest_by_card(&self, card_id: &str) -> AppResult<Option<Visit>> {
        let row = sqlx::query_as::<_, Visit>(
            r#"
            SELECT * FROM visits
            WHERE rfid_card_id = $1
            ORDER BY check_in_time DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(card_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
