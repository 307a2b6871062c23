//! /transactions endpoints
use super::{AppJson, AppPath};
use crate::{
    context::AppContext,
    db::models::{LedgerEntry, LedgerEntryWithOwner, Operation},
    error::{FareboxError, FareboxResult},
    ledger::TransactionOutcome,
    validation::DateRange,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

/// Build transaction routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/transactions/recharge", post(create_recharge))
        .route("/transactions/usage", post(create_usage))
        .route("/transactions/media/:aliasNo", get(list_by_media))
        .route("/transactions/type/:type", get(list_by_type))
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub alias_no: Option<i64>,
    pub amount: Option<f64>,
    pub operation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImpliedOperationRequest {
    pub alias_no: Option<i64>,
    pub amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

async fn list_transactions(
    State(ctx): State<AppContext>,
    Query(query): Query<ListQuery>,
) -> FareboxResult<Json<Vec<LedgerEntryWithOwner>>> {
    let entries = match (query.start_date.as_deref(), query.end_date.as_deref()) {
        (Some(start), Some(end)) => {
            let range = DateRange::parse(start, end)?;
            ctx.transactions.list_by_date_range(&range).await?
        }
        (None, None) => ctx.transactions.list().await?,
        _ => {
            return Err(FareboxError::Validation(
                "startDate and endDate must be provided together".to_string(),
            ));
        }
    };

    Ok(Json(entries))
}

async fn create_transaction(
    State(ctx): State<AppContext>,
    AppJson(req): AppJson<CreateTransactionRequest>,
) -> FareboxResult<(StatusCode, Json<TransactionOutcome>)> {
    let (Some(alias_no), Some(amount), Some(operation)) =
        (req.alias_no, req.amount, req.operation.as_deref())
    else {
        return Err(FareboxError::Validation(
            "alias_no, amount, and operation are required".to_string(),
        ));
    };

    let operation = operation.parse::<Operation>()?;
    if amount <= 0.0 {
        return Err(FareboxError::Validation(
            "Amount must be greater than 0".to_string(),
        ));
    }

    let outcome = ctx.transactions.apply(alias_no, amount, operation).await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn create_recharge(
    State(ctx): State<AppContext>,
    AppJson(req): AppJson<ImpliedOperationRequest>,
) -> FareboxResult<(StatusCode, Json<TransactionOutcome>)> {
    let (alias_no, amount) = require_alias_and_amount(&req)?;
    let outcome = ctx.transactions.recharge(alias_no, amount).await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn create_usage(
    State(ctx): State<AppContext>,
    AppJson(req): AppJson<ImpliedOperationRequest>,
) -> FareboxResult<(StatusCode, Json<TransactionOutcome>)> {
    let (alias_no, amount) = require_alias_and_amount(&req)?;
    let outcome = ctx.transactions.usage(alias_no, amount).await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

fn require_alias_and_amount(req: &ImpliedOperationRequest) -> FareboxResult<(i64, f64)> {
    let (Some(alias_no), Some(amount)) = (req.alias_no, req.amount) else {
        return Err(FareboxError::Validation(
            "Missing required fields: alias_no and amount are required".to_string(),
        ));
    };

    if amount <= 0.0 {
        return Err(FareboxError::Validation(
            "Amount must be greater than 0".to_string(),
        ));
    }

    Ok((alias_no, amount))
}

async fn list_by_media(
    State(ctx): State<AppContext>,
    AppPath(alias_no): AppPath<i64>,
) -> FareboxResult<Json<Vec<LedgerEntry>>> {
    Ok(Json(ctx.transactions.list_by_alias(alias_no).await?))
}

async fn list_by_type(
    State(ctx): State<AppContext>,
    AppPath(kind): AppPath<String>,
) -> FareboxResult<Json<Vec<LedgerEntry>>> {
    let operation = kind.parse::<Operation>()?;

    Ok(Json(ctx.transactions.list_by_operation(operation).await?))
}
