//! Media manager: transit card records, their invariants at the boundary,
//! and the lookups the transaction protocol builds on
use crate::{
    db::models::{Media, MediaStatus, MediaWithOwner},
    error::{FareboxError, FareboxResult},
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

const MEDIA_WITH_OWNER_QUERY: &str = "SELECT m.alias_no, m.account_id, m.create_date, \
     m.expiry_date, m.balance, m.status, a.phone_number \
     FROM media m LEFT JOIN account a ON m.account_id = a.account_id";

/// Fields for a new media record
#[derive(Debug, Clone)]
pub struct NewMedia {
    /// None creates an orphan card
    pub account_id: Option<i64>,
    pub expiry_date: NaiveDate,
    pub balance: f64,
    pub status: Option<MediaStatus>,
}

/// Result of a direct balance overwrite
#[derive(Debug, Clone, Serialize)]
pub struct BalanceUpdate {
    pub alias_no: i64,
    pub balance: f64,
    pub changes: u64,
}

/// Result of a status toggle
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub alias_no: i64,
    pub status: MediaStatus,
    pub changes: u64,
}

/// Media manager service
pub struct MediaManager {
    db: SqlitePool,
}

impl MediaManager {
    /// Create a new media manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a media record. Balance must be strictly positive at
    /// creation; a supplied account must exist.
    pub async fn create(&self, new: NewMedia) -> FareboxResult<Media> {
        if !new.balance.is_finite() {
            return Err(FareboxError::Validation(
                "Balance must be a valid number".to_string(),
            ));
        }
        if new.balance < 0.0 {
            return Err(FareboxError::Validation(
                "Balance cannot be negative".to_string(),
            ));
        }
        if new.balance == 0.0 {
            return Err(FareboxError::Validation(
                "Balance must be greater than 0 - zero balance cards are not allowed".to_string(),
            ));
        }

        if let Some(account_id) = new.account_id {
            self.ensure_account_exists(account_id).await?;
        }

        let status = new.status.unwrap_or(MediaStatus::Active);
        let create_date = Utc::now();

        let result = sqlx::query(
            "INSERT INTO media (account_id, create_date, expiry_date, balance, status) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(new.account_id)
        .bind(create_date)
        .bind(new.expiry_date)
        .bind(new.balance)
        .bind(status)
        .execute(&self.db)
        .await?;

        let media = Media {
            alias_no: result.last_insert_rowid(),
            account_id: new.account_id,
            create_date,
            expiry_date: new.expiry_date,
            balance: new.balance,
            status,
        };
        info!("created media {}", media.alias_no);

        Ok(media)
    }

    /// Fetch one media record with its owner's phone number
    pub async fn get(&self, alias_no: i64) -> FareboxResult<MediaWithOwner> {
        let query = format!("{} WHERE m.alias_no = ?1", MEDIA_WITH_OWNER_QUERY);

        sqlx::query_as::<_, MediaWithOwner>(&query)
            .bind(alias_no)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| FareboxError::NotFound("Media not found".to_string()))
    }

    /// List all media with their owners' phone numbers
    pub async fn list(&self) -> FareboxResult<Vec<MediaWithOwner>> {
        let query = format!("{} ORDER BY m.alias_no", MEDIA_WITH_OWNER_QUERY);

        Ok(sqlx::query_as::<_, MediaWithOwner>(&query)
            .fetch_all(&self.db)
            .await?)
    }

    /// List media in one status
    pub async fn list_by_status(&self, status: MediaStatus) -> FareboxResult<Vec<MediaWithOwner>> {
        let query = format!("{} WHERE m.status = ?1 ORDER BY m.alias_no", MEDIA_WITH_OWNER_QUERY);

        Ok(sqlx::query_as::<_, MediaWithOwner>(&query)
            .bind(status)
            .fetch_all(&self.db)
            .await?)
    }

    /// List the media owned by one account; the account must exist
    pub async fn list_by_account(&self, account_id: i64) -> FareboxResult<Vec<Media>> {
        self.ensure_account_exists(account_id).await?;

        Ok(sqlx::query_as::<_, Media>(
            "SELECT alias_no, account_id, create_date, expiry_date, balance, status \
             FROM media WHERE account_id = ?1 ORDER BY alias_no",
        )
        .bind(account_id)
        .fetch_all(&self.db)
        .await?)
    }

    /// List unowned media
    pub async fn list_orphans(&self) -> FareboxResult<Vec<Media>> {
        Ok(sqlx::query_as::<_, Media>(
            "SELECT alias_no, account_id, create_date, expiry_date, balance, status \
             FROM media WHERE account_id IS NULL ORDER BY alias_no",
        )
        .fetch_all(&self.db)
        .await?)
    }

    /// Direct admin overwrite of a card's balance. Unlike creation, zero is
    /// permitted here; negative never is.
    pub async fn set_balance(&self, alias_no: i64, balance: f64) -> FareboxResult<BalanceUpdate> {
        if !balance.is_finite() {
            return Err(FareboxError::Validation(
                "Balance must be a valid number".to_string(),
            ));
        }
        if balance < 0.0 {
            return Err(FareboxError::Validation(
                "Balance cannot be negative".to_string(),
            ));
        }

        let result = sqlx::query("UPDATE media SET balance = ?1 WHERE alias_no = ?2")
            .bind(balance)
            .bind(alias_no)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(FareboxError::NotFound("Media not found".to_string()));
        }

        info!("media {} balance overwritten to {}", alias_no, balance);
        Ok(BalanceUpdate {
            alias_no,
            balance,
            changes: result.rows_affected(),
        })
    }

    /// Toggle a card's status. No transition restrictions: blacklisting a
    /// card with a balance is allowed, and reactivating restores its
    /// transaction eligibility.
    pub async fn set_status(
        &self,
        alias_no: i64,
        status: MediaStatus,
    ) -> FareboxResult<StatusUpdate> {
        let result = sqlx::query("UPDATE media SET status = ?1 WHERE alias_no = ?2")
            .bind(status)
            .bind(alias_no)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(FareboxError::NotFound("Media not found".to_string()));
        }

        Ok(StatusUpdate {
            alias_no,
            status,
            changes: result.rows_affected(),
        })
    }

    /// Delete a media record. Its ledger entries are append-only history
    /// and stay behind, orphaned by alias.
    pub async fn delete(&self, alias_no: i64) -> FareboxResult<u64> {
        let result = sqlx::query("DELETE FROM media WHERE alias_no = ?1")
            .bind(alias_no)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(FareboxError::NotFound("Media not found".to_string()));
        }

        info!("deleted media {}", alias_no);
        Ok(result.rows_affected())
    }

    async fn ensure_account_exists(&self, account_id: i64) -> FareboxResult<()> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT 1 FROM account WHERE account_id = ?1")
            .bind(account_id)
            .fetch_optional(&self.db)
            .await?;

        if exists.is_none() {
            return Err(FareboxError::NotFound("Account not found".to_string()));
        }

        Ok(())
    }
}
