use api_types::account::{
    AccountDetailResponse, AccountKind, AccountListResponse, AccountNew, AccountUpdate,
    AccountView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Account, Money, NewAccountCmd, UpdateAccountCmd};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, transactions::transaction_view, user};

fn engine_kind(kind: AccountKind) -> engine::AccountKind {
    match kind {
        AccountKind::Current => engine::AccountKind::Current,
        AccountKind::Savings => engine::AccountKind::Savings,
    }
}

fn api_kind(kind: engine::AccountKind) -> AccountKind {
    match kind {
        engine::AccountKind::Current => AccountKind::Current,
        engine::AccountKind::Savings => AccountKind::Savings,
    }
}

fn account_view(account: Account, transaction_count: Option<u64>) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        kind: api_kind(account.kind),
        balance_minor: account.balance,
        opening_balance_minor: account.opening_balance,
        is_included_in_budget: account.is_included_in_budget,
        created_at: account.created_at.fixed_offset(),
        updated_at: account.updated_at.fixed_offset(),
        transaction_count,
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<AccountListResponse>, ServerError> {
    let accounts = state
        .engine
        .list_accounts(&user.id)
        .await?
        .into_iter()
        .map(|summary| account_view(summary.account, Some(summary.transaction_count)))
        .collect();

    Ok(Json(AccountListResponse { accounts }))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    let balance = match payload.balance.as_deref() {
        Some(raw) => raw.parse::<Money>()?,
        None => Money::ZERO,
    };
    let cmd = NewAccountCmd::new(user.id, payload.name, engine_kind(payload.kind))
        .balance_minor(balance.cents())
        .included_in_budget(payload.is_included_in_budget);
    let account = state.engine.new_account(cmd).await?;

    Ok((StatusCode::CREATED, Json(account_view(account, None))))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountDetailResponse>, ServerError> {
    let (account, transactions) = state
        .engine
        .account_with_transactions(id, &user.id)
        .await?;

    Ok(Json(AccountDetailResponse {
        account: account_view(account, None),
        transactions: transactions.into_iter().map(transaction_view).collect(),
    }))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<AccountView>, ServerError> {
    let mut cmd = UpdateAccountCmd::new(user.id, id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(engine_kind(kind));
    }
    if let Some(raw) = payload.balance.as_deref() {
        cmd = cmd.balance_minor(raw.parse::<Money>()?.cents());
    }
    if let Some(included) = payload.is_included_in_budget {
        cmd = cmd.included_in_budget(included);
    }
    let account = state.engine.update_account(cmd).await?;

    Ok(Json(account_view(account, None)))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_account(id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rebuilds the cached balance from the account's transactions.
pub async fn recompute(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.recompute_balance(id, &user.id).await?;
    Ok(Json(account_view(account, None)))
}
