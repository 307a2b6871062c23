//! /media endpoints
use super::{AppJson, AppPath};
use crate::{
    context::AppContext,
    db::models::{Media, MediaStatus, MediaWithOwner},
    error::{FareboxError, FareboxResult},
    media::{BalanceUpdate, NewMedia, StatusUpdate},
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Build media routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/media", get(list_media).post(create_media))
        .route("/media/orphan", get(list_orphan_media))
        .route("/media/status/:status", get(list_media_by_status))
        .route("/media/account/:accountId", get(list_media_by_account))
        .route("/media/:aliasNo", get(get_media).delete(delete_media))
        .route("/media/:aliasNo/balance", put(update_balance))
        .route("/media/:aliasNo/status", put(update_status))
}

/// Distinguishes an absent `account_id` key (invalid) from an explicit
/// `null` (orphan media)
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct CreateMediaRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub account_id: Option<Option<i64>>,
    pub expiry_date: Option<String>,
    pub balance: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BalancePayload {
    pub balance: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusListing {
    pub status: MediaStatus,
    pub count: usize,
    pub data: Vec<MediaWithOwner>,
}

#[derive(Debug, Serialize)]
pub struct OrphanListing {
    pub count: usize,
    pub message: String,
    pub data: Vec<Media>,
}

#[derive(Debug, Serialize)]
pub struct MediaDeleted {
    pub message: String,
    #[serde(rename = "deletedRows")]
    pub deleted_rows: u64,
}

async fn list_media(State(ctx): State<AppContext>) -> FareboxResult<Json<Vec<MediaWithOwner>>> {
    Ok(Json(ctx.media.list().await?))
}

async fn create_media(
    State(ctx): State<AppContext>,
    AppJson(req): AppJson<CreateMediaRequest>,
) -> FareboxResult<(StatusCode, Json<Media>)> {
    let (Some(expiry_raw), Some(balance)) = (req.expiry_date.as_deref(), req.balance) else {
        return Err(FareboxError::Validation(
            "expiry_date and balance are required".to_string(),
        ));
    };

    let Some(account_id) = req.account_id else {
        return Err(FareboxError::Validation(
            "account_id field is required - use null for orphan media or provide a valid account_id"
                .to_string(),
        ));
    };

    let expiry_date = NaiveDate::parse_from_str(expiry_raw, "%Y-%m-%d").map_err(|_| {
        FareboxError::Validation("expiry_date must be a valid date in YYYY-MM-DD format".to_string())
    })?;
    let status = req
        .status
        .as_deref()
        .map(|s| s.parse::<MediaStatus>())
        .transpose()?;

    let media = ctx
        .media
        .create(NewMedia {
            account_id,
            expiry_date,
            balance,
            status,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(media)))
}

async fn get_media(
    State(ctx): State<AppContext>,
    AppPath(alias_no): AppPath<i64>,
) -> FareboxResult<Json<MediaWithOwner>> {
    Ok(Json(ctx.media.get(alias_no).await?))
}

async fn list_media_by_status(
    State(ctx): State<AppContext>,
    AppPath(status): AppPath<String>,
) -> FareboxResult<Json<StatusListing>> {
    let status = status.parse::<MediaStatus>()?;
    let data = ctx.media.list_by_status(status).await?;

    Ok(Json(StatusListing {
        status,
        count: data.len(),
        data,
    }))
}

async fn list_media_by_account(
    State(ctx): State<AppContext>,
    AppPath(account_id): AppPath<i64>,
) -> FareboxResult<Json<Vec<Media>>> {
    Ok(Json(ctx.media.list_by_account(account_id).await?))
}

async fn list_orphan_media(State(ctx): State<AppContext>) -> FareboxResult<Json<OrphanListing>> {
    let data = ctx.media.list_orphans().await?;

    Ok(Json(OrphanListing {
        count: data.len(),
        message: "Media records without account (orphaned)".to_string(),
        data,
    }))
}

async fn update_balance(
    State(ctx): State<AppContext>,
    AppPath(alias_no): AppPath<i64>,
    AppJson(req): AppJson<BalancePayload>,
) -> FareboxResult<Json<BalanceUpdate>> {
    let balance = req
        .balance
        .ok_or_else(|| FareboxError::Validation("Balance is required".to_string()))?;

    Ok(Json(ctx.media.set_balance(alias_no, balance).await?))
}

async fn update_status(
    State(ctx): State<AppContext>,
    AppPath(alias_no): AppPath<i64>,
    AppJson(req): AppJson<StatusPayload>,
) -> FareboxResult<Json<StatusUpdate>> {
    let status = req
        .status
        .ok_or_else(|| FareboxError::Validation("Status is required".to_string()))?
        .parse::<MediaStatus>()?;

    Ok(Json(ctx.media.set_status(alias_no, status).await?))
}

async fn delete_media(
    State(ctx): State<AppContext>,
    AppPath(alias_no): AppPath<i64>,
) -> FareboxResult<Json<MediaDeleted>> {
    let deleted_rows = ctx.media.delete(alias_no).await?;

    Ok(Json(MediaDeleted {
        message: "Media deleted successfully. Ledger entries are preserved.".to_string(),
        deleted_rows,
    }))
}
