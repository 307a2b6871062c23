//! /accounts endpoints
use super::{AppJson, AppPath};
use crate::{
    context::AppContext,
    db::models::Account,
    error::{FareboxError, FareboxResult},
};
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

/// Build account routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/:id",
            get(get_account).put(update_account).delete(delete_account),
        )
}

#[derive(Debug, Deserialize)]
pub struct AccountPayload {
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountDeleted {
    pub message: String,
    #[serde(rename = "deletedRows")]
    pub deleted_rows: u64,
}

async fn list_accounts(State(ctx): State<AppContext>) -> FareboxResult<Json<Vec<Account>>> {
    Ok(Json(ctx.accounts.list().await?))
}

async fn create_account(
    State(ctx): State<AppContext>,
    AppJson(req): AppJson<AccountPayload>,
) -> FareboxResult<(StatusCode, Json<Account>)> {
    let phone_number = req
        .phone_number
        .ok_or_else(|| FareboxError::Validation("Phone number is required".to_string()))?;

    let account = ctx.accounts.create(&phone_number).await?;

    Ok((StatusCode::CREATED, Json(account)))
}

async fn get_account(
    State(ctx): State<AppContext>,
    AppPath(account_id): AppPath<i64>,
) -> FareboxResult<Json<Account>> {
    Ok(Json(ctx.accounts.get(account_id).await?))
}

async fn update_account(
    State(ctx): State<AppContext>,
    AppPath(account_id): AppPath<i64>,
    AppJson(req): AppJson<AccountPayload>,
) -> FareboxResult<Json<Account>> {
    let phone_number = req
        .phone_number
        .ok_or_else(|| FareboxError::Validation("Phone number is required".to_string()))?;

    Ok(Json(ctx.accounts.update(account_id, &phone_number).await?))
}

async fn delete_account(
    State(ctx): State<AppContext>,
    AppPath(account_id): AppPath<i64>,
) -> FareboxResult<Json<AccountDeleted>> {
    let deleted_rows = ctx.accounts.delete(account_id).await?;

    Ok(Json(AccountDeleted {
        message: "Account deleted successfully. Associated media account_id set to NULL."
            .to_string(),
        deleted_rows,
    }))
}
