//! Transaction protocol and ledger queries
//!
//! `apply` is the one write path for balances: it validates the card's
//! state, computes the new balance, and persists the ledger entry together
//! with the balance update as a single database transaction. The balance
//! write is conditional on the balance observed at read time, so two
//! concurrent calls against the same card serialize through a retry
//! instead of silently losing one update.
use crate::{
    db::models::{LedgerEntry, LedgerEntryWithOwner, Media, MediaStatus, Operation},
    error::{FareboxError, FareboxResult},
    validation::DateRange,
};
use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Attempts before a contended balance write gives up and reports a
/// conflict to the caller
const BALANCE_WRITE_RETRIES: u32 = 5;

const LEDGER_WITH_OWNER_QUERY: &str = "SELECT t.id, t.alias_no, t.amount, t.date, t.operation, \
     m.account_id, a.phone_number \
     FROM ledger t \
     LEFT JOIN media m ON t.alias_no = m.alias_no \
     LEFT JOIN account a ON m.account_id = a.account_id";

/// Result of a successful `apply`: the created ledger entry and the
/// balance pair around it
#[derive(Debug, Clone, Serialize)]
pub struct TransactionOutcome {
    pub transaction: LedgerEntry,
    #[serde(rename = "oldBalance")]
    pub old_balance: f64,
    #[serde(rename = "newBalance")]
    pub new_balance: f64,
}

/// Transaction manager service
pub struct TransactionManager {
    db: SqlitePool,
}

impl TransactionManager {
    /// Create a new transaction manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Apply one balance-mutating transaction to a card.
    ///
    /// Validation order: media must exist, must not be blacklisted, and a
    /// usage must be covered by the current balance. The ledger insert and
    /// the balance update commit together or not at all.
    pub async fn apply(
        &self,
        alias_no: i64,
        amount: f64,
        operation: Operation,
    ) -> FareboxResult<TransactionOutcome> {
        // callers validate too; re-check before touching storage
        if !amount.is_finite() || amount <= 0.0 {
            return Err(FareboxError::Validation(
                "Amount must be greater than 0".to_string(),
            ));
        }

        for attempt in 0..BALANCE_WRITE_RETRIES {
            // fresh read every attempt; a stale balance must never drive the write
            let media = sqlx::query_as::<_, Media>(
                "SELECT alias_no, account_id, create_date, expiry_date, balance, status \
                 FROM media WHERE alias_no = ?1",
            )
            .bind(alias_no)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| FareboxError::NotFound("Media not found".to_string()))?;

            if media.status == MediaStatus::Blacklist {
                return Err(FareboxError::Blacklisted);
            }

            let new_balance = match operation {
                Operation::Recharge => media.balance + amount,
                Operation::Usage => {
                    if media.balance < amount {
                        return Err(FareboxError::InsufficientBalance);
                    }
                    media.balance - amount
                }
            };

            let date = Utc::now();
            let mut tx = self.db.begin().await?;

            let inserted = sqlx::query(
                "INSERT INTO ledger (alias_no, amount, date, operation) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(alias_no)
            .bind(amount)
            .bind(date)
            .bind(operation)
            .execute(&mut *tx)
            .await?;

            // compare-and-swap: only write if nobody moved the balance
            // since our read
            let updated = sqlx::query(
                "UPDATE media SET balance = ?1 WHERE alias_no = ?2 AND balance = ?3",
            )
            .bind(new_balance)
            .bind(alias_no)
            .bind(media.balance)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                tx.rollback().await?;
                debug!(
                    "balance of media {} moved underneath attempt {}, retrying",
                    alias_no, attempt
                );
                continue;
            }

            tx.commit().await?;
            info!(
                "applied {:?} of {} to media {}: {} -> {}",
                operation, amount, alias_no, media.balance, new_balance
            );

            return Ok(TransactionOutcome {
                transaction: LedgerEntry {
                    id: inserted.last_insert_rowid(),
                    alias_no,
                    amount,
                    date,
                    operation,
                },
                old_balance: media.balance,
                new_balance,
            });
        }

        Err(FareboxError::Conflict(
            "Concurrent balance updates on this media - please retry".to_string(),
        ))
    }

    /// Recharge convenience wrapper
    pub async fn recharge(&self, alias_no: i64, amount: f64) -> FareboxResult<TransactionOutcome> {
        self.apply(alias_no, amount, Operation::Recharge).await
    }

    /// Usage convenience wrapper
    pub async fn usage(&self, alias_no: i64, amount: f64) -> FareboxResult<TransactionOutcome> {
        self.apply(alias_no, amount, Operation::Usage).await
    }

    /// All ledger entries joined with their owning account, newest first
    pub async fn list(&self) -> FareboxResult<Vec<LedgerEntryWithOwner>> {
        let query = format!("{} ORDER BY t.date DESC, t.id DESC", LEDGER_WITH_OWNER_QUERY);

        Ok(sqlx::query_as::<_, LedgerEntryWithOwner>(&query)
            .fetch_all(&self.db)
            .await?)
    }

    /// Ledger entries within a time range, newest first
    pub async fn list_by_date_range(
        &self,
        range: &DateRange,
    ) -> FareboxResult<Vec<LedgerEntryWithOwner>> {
        let query = format!(
            "{} WHERE t.date >= ?1 AND t.date < ?2 ORDER BY t.date DESC, t.id DESC",
            LEDGER_WITH_OWNER_QUERY
        );

        Ok(sqlx::query_as::<_, LedgerEntryWithOwner>(&query)
            .bind(range.start)
            .bind(range.end_exclusive)
            .fetch_all(&self.db)
            .await?)
    }

    /// One card's ledger entries, newest first; the card must exist
    pub async fn list_by_alias(&self, alias_no: i64) -> FareboxResult<Vec<LedgerEntry>> {
        self.ensure_media_exists(alias_no).await?;

        Ok(sqlx::query_as::<_, LedgerEntry>(
            "SELECT id, alias_no, amount, date, operation FROM ledger \
             WHERE alias_no = ?1 ORDER BY date DESC, id DESC",
        )
        .bind(alias_no)
        .fetch_all(&self.db)
        .await?)
    }

    /// Ledger entries of one operation kind, newest first
    pub async fn list_by_operation(&self, operation: Operation) -> FareboxResult<Vec<LedgerEntry>> {
        Ok(sqlx::query_as::<_, LedgerEntry>(
            "SELECT id, alias_no, amount, date, operation FROM ledger \
             WHERE operation = ?1 ORDER BY date DESC, id DESC",
        )
        .bind(operation)
        .fetch_all(&self.db)
        .await?)
    }

    async fn ensure_media_exists(&self, alias_no: i64) -> FareboxResult<()> {
        let exists = sqlx::query_scalar::<_, i64>("SELECT 1 FROM media WHERE alias_no = ?1")
            .bind(alias_no)
            .fetch_optional(&self.db)
            .await?;

        if exists.is_none() {
            return Err(FareboxError::NotFound("Media not found".to_string()));
        }

        Ok(())
    }
}
