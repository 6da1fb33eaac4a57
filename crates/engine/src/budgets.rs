//! Monthly budget threshold, one per user.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: String,
    pub amount_minor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Current-month spending against the (optional) budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetProgress {
    pub budget: Option<Budget>,
    /// Sum of expenses on included accounts in the current calendar month.
    pub current_expenses_minor: i64,
}

impl BudgetProgress {
    /// Percentage of the budget consumed, if a budget is set.
    pub fn percentage_used(&self) -> Option<f64> {
        self.budget.as_ref().map(|budget| {
            self.current_expenses_minor as f64 * 100.0 / budget.amount_minor as f64
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub user_id: String,
    pub amount_minor: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "budget")?,
            user_id: model.user_id,
            amount_minor: model.amount_minor,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
