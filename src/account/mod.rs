//! Account manager: subscriber CRUD over the shared pool
use crate::{
    db::models::Account,
    error::{FareboxError, FareboxResult},
    validation,
};
use sqlx::SqlitePool;
use tracing::info;

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// List all accounts
    pub async fn list(&self) -> FareboxResult<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(
            "SELECT account_id, phone_number FROM account ORDER BY account_id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(accounts)
    }

    /// Create a new account
    pub async fn create(&self, phone_number: &str) -> FareboxResult<Account> {
        validation::validate_phone_number(phone_number)?;

        let result = sqlx::query("INSERT INTO account (phone_number) VALUES (?1)")
            .bind(phone_number)
            .execute(&self.db)
            .await;

        let result = match result {
            Err(e) if is_unique_violation(&e) => {
                return Err(FareboxError::Conflict(
                    "Account with this phone number already exists".to_string(),
                ));
            }
            other => other?,
        };

        let account = Account {
            account_id: result.last_insert_rowid(),
            phone_number: phone_number.to_string(),
        };
        info!("created account {}", account.account_id);

        Ok(account)
    }

    /// Fetch one account by id
    pub async fn get(&self, account_id: i64) -> FareboxResult<Account> {
        sqlx::query_as::<_, Account>(
            "SELECT account_id, phone_number FROM account WHERE account_id = ?1",
        )
        .bind(account_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| FareboxError::NotFound("Account not found".to_string()))
    }

    /// Update an account's phone number
    pub async fn update(&self, account_id: i64, phone_number: &str) -> FareboxResult<Account> {
        validation::validate_phone_number(phone_number)?;

        let result = sqlx::query("UPDATE account SET phone_number = ?1 WHERE account_id = ?2")
            .bind(phone_number)
            .bind(account_id)
            .execute(&self.db)
            .await;

        let result = match result {
            Err(e) if is_unique_violation(&e) => {
                return Err(FareboxError::Conflict(
                    "Account with this phone number already exists".to_string(),
                ));
            }
            other => other?,
        };

        if result.rows_affected() == 0 {
            return Err(FareboxError::NotFound("Account not found".to_string()));
        }

        Ok(Account {
            account_id,
            phone_number: phone_number.to_string(),
        })
    }

    /// Delete an account. Owned media survive with their account reference
    /// cleared (ON DELETE SET NULL), never cascaded away.
    pub async fn delete(&self, account_id: i64) -> FareboxResult<u64> {
        let result = sqlx::query("DELETE FROM account WHERE account_id = ?1")
            .bind(account_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(FareboxError::NotFound("Account not found".to_string()));
        }

        info!("deleted account {}, owned media orphaned", account_id);
        Ok(result.rows_affected())
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::media::{MediaManager, NewMedia};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn create_and_get_account() {
        let db = test_pool().await;
        let manager = AccountManager::new(db);

        let created = manager.create("05551234567").await.unwrap();
        let fetched = manager.get(created.account_id).await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.phone_number, "05551234567");
    }

    #[tokio::test]
    async fn malformed_phone_numbers_rejected() {
        let db = test_pool().await;
        let manager = AccountManager::new(db);

        for phone in ["5551234567", "0555123456", "0555abc4567"] {
            let err = manager.create(phone).await.unwrap_err();
            assert!(matches!(err, FareboxError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn duplicate_phone_number_conflicts() {
        let db = test_pool().await;
        let manager = AccountManager::new(db);

        manager.create("05551234567").await.unwrap();
        let err = manager.create("05551234567").await.unwrap_err();

        assert!(matches!(err, FareboxError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_changes_phone_number() {
        let db = test_pool().await;
        let manager = AccountManager::new(db);

        let account = manager.create("05551234567").await.unwrap();
        let updated = manager.update(account.account_id, "05559876543").await.unwrap();

        assert_eq!(updated.phone_number, "05559876543");
        assert_eq!(
            manager.get(account.account_id).await.unwrap().phone_number,
            "05559876543"
        );
    }

    #[tokio::test]
    async fn update_and_delete_missing_account_not_found() {
        let db = test_pool().await;
        let manager = AccountManager::new(db);

        assert!(matches!(
            manager.update(42, "05551234567").await.unwrap_err(),
            FareboxError::NotFound(_)
        ));
        assert!(matches!(
            manager.delete(42).await.unwrap_err(),
            FareboxError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn deleting_account_orphans_its_media() {
        let db = test_pool().await;
        let accounts = AccountManager::new(db.clone());
        let media = MediaManager::new(db);

        let account = accounts.create("05551234567").await.unwrap();
        let expiry = NaiveDate::from_ymd_opt(2030, 12, 31).unwrap();
        let first = media
            .create(NewMedia {
                account_id: Some(account.account_id),
                expiry_date: expiry,
                balance: 100.0,
                status: None,
            })
            .await
            .unwrap();
        let second = media
            .create(NewMedia {
                account_id: Some(account.account_id),
                expiry_date: expiry,
                balance: 50.0,
                status: None,
            })
            .await
            .unwrap();

        let deleted = accounts.delete(account.account_id).await.unwrap();
        assert_eq!(deleted, 1);

        // both cards survive, unowned
        let orphans = media.list_orphans().await.unwrap();
        let orphan_aliases: Vec<i64> = orphans.iter().map(|m| m.alias_no).collect();
        assert!(orphan_aliases.contains(&first.alias_no));
        assert!(orphan_aliases.contains(&second.alias_no));
        assert!(media.get(first.alias_no).await.unwrap().media.account_id.is_none());
        assert!(media.get(second.alias_no).await.unwrap().media.account_id.is_none());
    }
}
