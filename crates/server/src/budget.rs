use api_types::budget::{BudgetProgressResponse, BudgetSet, BudgetView};
use axum::{Extension, Json, extract::State};
use chrono::Utc;
use engine::{Budget, Money};

use crate::{ServerError, server::ServerState, user};

fn budget_view(budget: Budget) -> BudgetView {
    BudgetView {
        id: budget.id,
        amount_minor: budget.amount_minor,
        updated_at: budget.updated_at.fixed_offset(),
    }
}

/// Budget and the current month's expenses on included accounts.
pub async fn progress(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<BudgetProgressResponse>, ServerError> {
    let progress = state.engine.budget_progress(&user.id, Utc::now()).await?;
    let percentage_used = progress.percentage_used();

    Ok(Json(BudgetProgressResponse {
        budget: progress.budget.map(budget_view),
        current_expenses_minor: progress.current_expenses_minor,
        percentage_used,
    }))
}

pub async fn set(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetSet>,
) -> Result<Json<BudgetView>, ServerError> {
    let amount = Money::parse_positive(&payload.amount)?;
    let budget = state.engine.set_budget(&user.id, amount.cents()).await?;
    Ok(Json(budget_view(budget)))
}
