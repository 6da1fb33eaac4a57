use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, Statement, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{Account, EngineError, Money, ResultEngine, TransactionKind, accounts};

use super::{Engine, balance_out_of_range, with_tx};

/// Balance changes keyed by account id.
///
/// A `BTreeMap` so increments are always applied in ascending account-id
/// order, which keeps lock acquisition order stable across concurrent
/// mutations.
pub(super) type BalanceDeltas = BTreeMap<String, Money>;

/// Adds `delta` to the entry of `account_id`, failing on overflow.
pub(super) fn add_delta(
    deltas: &mut BalanceDeltas,
    account_id: &str,
    delta: Money,
) -> ResultEngine<()> {
    let entry = deltas.entry(account_id.to_string()).or_insert(Money::ZERO);
    *entry = entry.checked_add(delta).ok_or_else(balance_out_of_range)?;
    Ok(())
}

impl Engine {
    /// Adds `delta` to the cached balance of one account with a single
    /// increment statement.
    ///
    /// The statement never reads the balance first, so concurrent mutations
    /// of the same account cannot lose each other's updates. It only matches
    /// when the new balance stays within [`Money::MAX_BALANCE`]; otherwise
    /// nothing is written and `InvalidAmount` is returned.
    pub(super) async fn apply_balance_delta(
        &self,
        db: &DatabaseTransaction,
        account_id: &str,
        user_id: &str,
        delta: Money,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        if delta.cents().unsigned_abs() > 2 * Money::MAX_BALANCE.cents().unsigned_abs() {
            return Err(balance_out_of_range());
        }
        let max = Money::MAX_BALANCE.cents();
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::BalanceMinor,
                Expr::col(accounts::Column::BalanceMinor).add(delta.cents()),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
            .filter(accounts::Column::Id.eq(account_id.to_string()))
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .filter(
                Expr::expr(Expr::col(accounts::Column::BalanceMinor).add(delta.cents()))
                    .between(-max, max),
            )
            .exec(db)
            .await?;
        if result.rows_affected != 1 {
            let exists = accounts::Entity::find_by_id(account_id.to_string())
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .one(db)
                .await?
                .is_some();
            if exists {
                tracing::warn!(
                    account_id,
                    delta = delta.cents(),
                    "balance increment out of range"
                );
                return Err(balance_out_of_range());
            }
            return Err(EngineError::KeyNotFound("account not exists".to_string()));
        }
        tracing::trace!(account_id, delta = delta.cents(), "balance increment applied");
        Ok(())
    }

    pub(super) async fn apply_balance_deltas(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        deltas: &BalanceDeltas,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        for (account_id, delta) in deltas {
            self.apply_balance_delta(db, account_id, user_id, *delta, now)
                .await?;
        }
        Ok(())
    }

    /// Sum of the signed amounts of every transaction booked on the account.
    pub(super) async fn ledger_sum(
        &self,
        db: &DatabaseTransaction,
        account_id: &str,
    ) -> ResultEngine<i64> {
        let backend = db.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT COALESCE(SUM(CASE WHEN kind = ? THEN -amount_minor ELSE amount_minor END), 0) \
             AS sum \
             FROM transactions \
             WHERE account_id = ?",
            [
                TransactionKind::Expense.as_str().into(),
                account_id.into(),
            ],
        );
        match db.query_one(stmt).await? {
            Some(row) => Ok(row.try_get("", "sum")?),
            None => Ok(0),
        }
    }

    /// Rebuilds the cached balance of an account from its opening balance and
    /// its transactions, persists it and returns the refreshed account.
    ///
    /// Balances are normally kept current by increments; this is the repair
    /// path and the reference the invariant is checked against.
    pub async fn recompute_balance(&self, account_id: Uuid, user_id: &str) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_account_owned(&db_tx, account_id, user_id)
                .await?;
            let sum = self.ledger_sum(&db_tx, &model.id).await?;
            let expected = model
                .opening_balance_minor
                .checked_add(sum)
                .filter(|value| Money::new(*value).is_valid_balance())
                .ok_or_else(balance_out_of_range)?;
            if expected != model.balance_minor {
                tracing::warn!(
                    account_id = %account_id,
                    cached = model.balance_minor,
                    expected,
                    "cached balance drifted, repairing"
                );
            }

            let active = accounts::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                balance_minor: ActiveValue::Set(expected),
                ..Default::default()
            };
            let updated = active.update(&db_tx).await?;
            Account::try_from(updated)
        })
    }
}
