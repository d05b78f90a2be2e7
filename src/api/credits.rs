//! Credit balance and transaction history

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::organizations::require_membership;
use crate::{
    db::{OrganizationRepository, TransactionRepository},
    middleware::AuthUser,
    models::{CreditBalance, TransactionListQuery, TransactionListResponse, TransactionView},
    utils::{validation::clamp_page_size, AppError},
    AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/credits", get(get_credits))
        .route("/{id}/credits/transactions", get(list_transactions))
}

async fn get_credits(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(org_id): Path<Uuid>,
) -> Result<Json<CreditBalance>, AppError> {
    require_membership(&state, auth_user.id, org_id).await?;

    let organization = OrganizationRepository::new(&state.db)
        .get_by_id(org_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load organization {}: {:#}", org_id, e);
            AppError::internal("Failed to load organization")
        })?
        .filter(|org| !org.status.is_deleted())
        .ok_or_else(|| AppError::not_found("Organization not found"))?;

    Ok(Json(CreditBalance::from(&organization)))
}

async fn list_transactions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(org_id): Path<Uuid>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, AppError> {
    require_membership(&state, auth_user.id, org_id).await?;

    let repo = TransactionRepository::new(&state.db);
    let transactions = repo
        .list_for_organization(org_id, clamp_page_size(query.limit), query.offset)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list transactions for {}: {:#}", org_id, e);
            AppError::internal("Failed to list transactions")
        })?;
    let total = repo.count_for_organization(org_id).await.map_err(|e| {
        tracing::error!("Failed to count transactions for {}: {:#}", org_id, e);
        AppError::internal("Failed to list transactions")
    })?;

    Ok(Json(TransactionListResponse {
        transactions: transactions.iter().map(TransactionView::from).collect(),
        total,
    }))
}
