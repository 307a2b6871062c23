//! Row models shared across the API
use crate::error::FareboxError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

/// Account record in the database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub account_id: i64,
    pub phone_number: String,
}

/// Lifecycle status of a media record. Blacklisted media accept no
/// transactions of either kind until reactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MediaStatus {
    Active,
    Blacklist,
}

impl FromStr for MediaStatus {
    type Err = FareboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MediaStatus::Active),
            "blacklist" => Ok(MediaStatus::Blacklist),
            _ => Err(FareboxError::Validation(
                "Invalid status. Must be one of: active, blacklist".to_string(),
            )),
        }
    }
}

/// Ledger operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Operation {
    Recharge,
    Usage,
}

impl FromStr for Operation {
    type Err = FareboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recharge" => Ok(Operation::Recharge),
            "usage" => Ok(Operation::Usage),
            _ => Err(FareboxError::Validation(
                "Operation must be either \"recharge\" or \"usage\"".to_string(),
            )),
        }
    }
}

/// Media (transit card) record in the database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Media {
    pub alias_no: i64,
    /// NULL means the card is orphaned (unowned)
    pub account_id: Option<i64>,
    pub create_date: DateTime<Utc>,
    pub expiry_date: NaiveDate,
    pub balance: f64,
    pub status: MediaStatus,
}

/// Media joined with its owning account's phone number
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct MediaWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub media: Media,
    pub phone_number: Option<String>,
}

/// One ledger entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub alias_no: i64,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub operation: Operation,
}

/// Ledger entry joined through media to the owning account
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct LedgerEntryWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entry: LedgerEntry,
    pub account_id: Option<i64>,
    pub phone_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_values() {
        assert_eq!("active".parse::<MediaStatus>().unwrap(), MediaStatus::Active);
        assert_eq!(
            "blacklist".parse::<MediaStatus>().unwrap(),
            MediaStatus::Blacklist
        );
        assert!("suspended".parse::<MediaStatus>().is_err());
        // case-sensitive on purpose, like the storage CHECK constraint
        assert!("Active".parse::<MediaStatus>().is_err());
    }

    #[test]
    fn operation_parses_known_values() {
        assert_eq!("recharge".parse::<Operation>().unwrap(), Operation::Recharge);
        assert_eq!("usage".parse::<Operation>().unwrap(), Operation::Usage);
        assert!("refund".parse::<Operation>().is_err());
    }

    #[test]
    fn enums_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&MediaStatus::Blacklist).unwrap(),
            "\"blacklist\""
        );
        assert_eq!(
            serde_json::to_string(&Operation::Usage).unwrap(),
            "\"usage\""
        );
    }
}
