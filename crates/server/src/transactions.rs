use api_types::transaction::{
    BulkDelete, BulkDeleteResponse, Pagination, RecurringFilter, RecurringInterval,
    SortDirection, SortField, TransactionKind, TransactionListQuery, TransactionListResponse,
    TransactionNew, TransactionUpdate, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{
    CreateTransactionCmd, Money, PageRequest, Transaction, TransactionListFilter,
    TransactionSort, UpdateTransactionCmd,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn engine_kind(kind: TransactionKind) -> engine::TransactionKind {
    match kind {
        TransactionKind::Expense => engine::TransactionKind::Expense,
        TransactionKind::Income => engine::TransactionKind::Income,
    }
}

fn engine_interval(interval: RecurringInterval) -> engine::RecurringInterval {
    match interval {
        RecurringInterval::Daily => engine::RecurringInterval::Daily,
        RecurringInterval::Weekly => engine::RecurringInterval::Weekly,
        RecurringInterval::Monthly => engine::RecurringInterval::Monthly,
        RecurringInterval::Yearly => engine::RecurringInterval::Yearly,
    }
}

fn api_interval(interval: engine::RecurringInterval) -> RecurringInterval {
    match interval {
        engine::RecurringInterval::Daily => RecurringInterval::Daily,
        engine::RecurringInterval::Weekly => RecurringInterval::Weekly,
        engine::RecurringInterval::Monthly => RecurringInterval::Monthly,
        engine::RecurringInterval::Yearly => RecurringInterval::Yearly,
    }
}

pub(crate) fn transaction_view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        account_id: tx.account_id,
        kind: match tx.kind {
            engine::TransactionKind::Expense => TransactionKind::Expense,
            engine::TransactionKind::Income => TransactionKind::Income,
        },
        amount_minor: tx.amount_minor,
        date: tx.date.fixed_offset(),
        description: tx.description,
        category: tx.category,
        is_recurring: tx.is_recurring,
        recurring_interval: tx.recurring_interval.map(api_interval),
        next_recurring_date: tx.next_recurring_date.map(|date| date.fixed_offset()),
        created_at: tx.created_at.fixed_offset(),
        updated_at: tx.updated_at.fixed_offset(),
    }
}

fn list_filter(query: &TransactionListQuery) -> TransactionListFilter {
    TransactionListFilter {
        account_id: query.account_id,
        kind: query.kind.map(engine_kind),
        recurring: query.recurring.map(|recurring| match recurring {
            RecurringFilter::Recurring => engine::RecurringFilter::Recurring,
            RecurringFilter::NonRecurring => engine::RecurringFilter::NonRecurring,
        }),
        search: query.search.clone(),
        from: query.from,
        to: query.to,
    }
}

fn list_sort(query: &TransactionListQuery) -> TransactionSort {
    let mut sort = TransactionSort::default();
    if let Some(field) = query.sort_by {
        sort.field = match field {
            SortField::Date => engine::SortField::Date,
            SortField::Amount => engine::SortField::Amount,
            SortField::Category => engine::SortField::Category,
            SortField::Description => engine::SortField::Description,
        };
    }
    if let Some(direction) = query.sort_dir {
        sort.direction = match direction {
            SortDirection::Asc => engine::SortDirection::Asc,
            SortDirection::Desc => engine::SortDirection::Desc,
        };
    }
    sort
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let defaults = PageRequest::default();
    let page = PageRequest::new(
        query.page.unwrap_or(defaults.page),
        query.limit.unwrap_or(defaults.page_size),
    )?;
    let result = state
        .engine
        .list_transactions(&user.id, &list_filter(&query), list_sort(&query), page)
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: result.items.into_iter().map(transaction_view).collect(),
        pagination: Pagination {
            total: result.total,
            total_pages: result.total_pages,
            current_page: result.current_page,
            limit: page.page_size,
        },
    }))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let amount = Money::parse_positive(&payload.amount)?;
    let mut cmd = CreateTransactionCmd::new(
        user.id,
        payload.account_id,
        engine_kind(payload.kind),
        amount.cents(),
        payload.date.with_timezone(&Utc),
        payload.category,
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    cmd.is_recurring = payload.is_recurring;
    cmd.recurring_interval = payload.recurring_interval.map(engine_interval);
    let tx = state.engine.create_transaction(cmd).await?;

    Ok((StatusCode::CREATED, Json(transaction_view(tx))))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(id, &user.id).await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let mut cmd = UpdateTransactionCmd::new(user.id, id);
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(engine_kind(kind));
    }
    if let Some(raw) = payload.amount.as_deref() {
        cmd = cmd.amount_minor(Money::parse_positive(raw)?.cents());
    }
    if let Some(account_id) = payload.account_id {
        cmd = cmd.account_id(account_id);
    }
    if let Some(date) = payload.date {
        cmd = cmd.date(date.with_timezone(&Utc));
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(category) = payload.category {
        cmd = cmd.category(category);
    }
    if let Some(is_recurring) = payload.is_recurring {
        cmd = cmd.is_recurring(is_recurring);
    }
    if let Some(interval) = payload.recurring_interval {
        cmd = cmd.recurring_interval(engine_interval(interval));
    }
    let tx = state.engine.update_transaction(cmd).await?;

    Ok(Json(transaction_view(tx)))
}

/// Deletes the caller's transactions among `transaction_ids`; other ids are
/// skipped.
pub async fn bulk_delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BulkDelete>,
) -> Result<Json<BulkDeleteResponse>, ServerError> {
    let deleted = state
        .engine
        .bulk_delete_transactions(&user.id, &payload.transaction_ids)
        .await?;
    Ok(Json(BulkDeleteResponse { deleted }))
}
