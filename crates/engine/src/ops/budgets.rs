use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, Statement, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{Budget, BudgetProgress, ResultEngine, TransactionKind, budgets, util::month_bounds};

use super::{Engine, ensure_positive_amount, with_tx};

impl Engine {
    /// Returns the user's budget, if one is set.
    pub async fn budget(&self, user_id: &str) -> ResultEngine<Option<Budget>> {
        with_tx!(self, |db_tx| {
            budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id.to_string()))
                .one(&db_tx)
                .await?
                .map(Budget::try_from)
                .transpose()
        })
    }

    /// Creates or replaces the user's monthly budget.
    pub async fn set_budget(&self, user_id: &str, amount_minor: i64) -> ResultEngine<Budget> {
        ensure_positive_amount(amount_minor)?;
        with_tx!(self, |db_tx| {
            let now = Utc::now();
            let existing = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id.to_string()))
                .one(&db_tx)
                .await?;

            let model = match existing {
                Some(model) => {
                    let active = budgets::ActiveModel {
                        id: ActiveValue::Unchanged(model.id),
                        amount_minor: ActiveValue::Set(amount_minor),
                        updated_at: ActiveValue::Set(now),
                        ..Default::default()
                    };
                    active.update(&db_tx).await?
                }
                None => {
                    let active = budgets::ActiveModel {
                        id: ActiveValue::Set(Uuid::new_v4().to_string()),
                        user_id: ActiveValue::Set(user_id.to_string()),
                        amount_minor: ActiveValue::Set(amount_minor),
                        created_at: ActiveValue::Set(now),
                        updated_at: ActiveValue::Set(now),
                    };
                    active.insert(&db_tx).await?
                }
            };
            Budget::try_from(model)
        })
    }

    /// Budget plus the expenses booked on budget-included accounts during the
    /// calendar month containing `now`.
    pub async fn budget_progress(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<BudgetProgress> {
        let (from, to) = month_bounds(now)?;
        with_tx!(self, |db_tx| {
            let budget = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id.to_string()))
                .one(&db_tx)
                .await?
                .map(Budget::try_from)
                .transpose()?;

            let backend = db_tx.get_database_backend();
            let stmt = Statement::from_sql_and_values(
                backend,
                "SELECT COALESCE(SUM(t.amount_minor), 0) AS sum \
                 FROM transactions t \
                 JOIN accounts a ON a.id = t.account_id \
                 WHERE t.user_id = ? AND t.kind = ? \
                   AND a.is_included_in_budget = ? \
                   AND t.date >= ? AND t.date < ?",
                [
                    user_id.into(),
                    TransactionKind::Expense.as_str().into(),
                    true.into(),
                    from.into(),
                    to.into(),
                ],
            );
            let current_expenses_minor: i64 = match db_tx.query_one(stmt).await? {
                Some(row) => row.try_get("", "sum")?,
                None => 0,
            };

            Ok(BudgetProgress {
                budget,
                current_expenses_minor,
            })
        })
    }
}
