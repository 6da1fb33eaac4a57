//! Transaction primitives.
//!
//! A `Transaction` is a single expense or income booked on one account. Its
//! signed amount (see [`TransactionKind::signed`]) is what the account's
//! cached balance aggregates.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Money, RecurringInterval,
    util::{fold_for_search, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "EXPENSE",
            Self::Income => "INCOME",
        }
    }

    /// Contribution of `amount_minor` to the account balance.
    pub fn signed(self, amount_minor: i64) -> Money {
        match self {
            Self::Expense => Money::new(amount_minor.saturating_neg()),
            Self::Income => Money::new(amount_minor),
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "EXPENSE" => Ok(Self::Expense),
            "INCOME" => Ok(Self::Income),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub category: String,
    pub is_recurring: bool,
    pub recurring_interval: Option<RecurringInterval>,
    pub next_recurring_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Signed contribution of this transaction to its account balance.
    pub fn delta(&self) -> Money {
        self.kind.signed(self.amount_minor)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub account_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub date: DateTimeUtc,
    pub description: Option<String>,
    /// Lowercased description, matched by the list search.
    pub description_search: Option<String>,
    pub category: String,
    pub is_recurring: bool,
    pub recurring_interval: Option<String>,
    pub next_recurring_date: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub(crate) fn delta(&self) -> Result<Money, EngineError> {
        Ok(TransactionKind::try_from(self.kind.as_str())?.signed(self.amount_minor))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            date: ActiveValue::Set(tx.date),
            description: ActiveValue::Set(tx.description.clone()),
            description_search: ActiveValue::Set(tx.description.as_deref().map(fold_for_search)),
            category: ActiveValue::Set(tx.category.clone()),
            is_recurring: ActiveValue::Set(tx.is_recurring),
            recurring_interval: ActiveValue::Set(
                tx.recurring_interval.map(|i| i.as_str().to_string()),
            ),
            next_recurring_date: ActiveValue::Set(tx.next_recurring_date),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            user_id: model.user_id,
            account_id: parse_uuid(&model.account_id, "account")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            date: model.date,
            description: model.description,
            category: model.category,
            is_recurring: model.is_recurring,
            recurring_interval: model
                .recurring_interval
                .as_deref()
                .map(RecurringInterval::try_from)
                .transpose()?,
            next_recurring_date: model.next_recurring_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
