use chrono::Utc;
use sea_orm::{TransactionTrait, prelude::*};

use crate::{
    ResultEngine, Transaction, UpdateTransactionCmd, recurrence::Recurrence, transactions,
};

use super::super::helpers::{
    apply_optional_datetime_patch, apply_optional_text_patch, update_deltas,
};
use super::super::super::{Engine, ensure_positive_amount, normalize_required_name, with_tx};

impl Engine {
    /// Updates an existing transaction.
    ///
    /// Fields left `None` keep their stored value. The balance step always
    /// runs: on the same account it applies `new - old` (possibly zero); when
    /// the account changes it reverts the old contribution on the old account
    /// and applies the new one on the target account.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<Transaction> {
        if let Some(amount_minor) = cmd.amount_minor {
            ensure_positive_amount(amount_minor)?;
        }
        let category = cmd
            .category
            .as_deref()
            .map(|category| normalize_required_name(category, "category"))
            .transpose()?;
        let user_id = cmd.user_id.as_str();

        with_tx!(self, |db_tx| {
            let stored = self
                .require_transaction_owned(&db_tx, cmd.transaction_id, user_id)
                .await?;
            let old = Transaction::try_from(stored)?;

            let account_id = cmd.account_id.unwrap_or(old.account_id);
            if account_id != old.account_id {
                self.require_account_owned(&db_tx, account_id, user_id)
                    .await?;
            }

            let date = apply_optional_datetime_patch(old.date, cmd.date);
            let is_recurring = cmd.is_recurring.unwrap_or(old.is_recurring);
            let interval = cmd.recurring_interval.or(old.recurring_interval);
            let recurrence = Recurrence::resolve(is_recurring, interval, date)?;
            let now = Utc::now();

            let updated = Transaction {
                id: old.id,
                user_id: old.user_id.clone(),
                account_id,
                kind: cmd.kind.unwrap_or(old.kind),
                amount_minor: cmd.amount_minor.unwrap_or(old.amount_minor),
                date,
                description: apply_optional_text_patch(
                    old.description.clone(),
                    cmd.description.as_deref(),
                ),
                category: category.unwrap_or_else(|| old.category.clone()),
                is_recurring: recurrence.is_recurring,
                recurring_interval: recurrence.interval,
                next_recurring_date: recurrence.next_date,
                created_at: old.created_at,
                updated_at: now,
            };

            transactions::ActiveModel::from(&updated)
                .update(&db_tx)
                .await?;
            let deltas = update_deltas(&old, &updated)?;
            self.apply_balance_deltas(&db_tx, user_id, &deltas, now)
                .await?;

            tracing::debug!(
                transaction_id = %updated.id,
                accounts = deltas.len(),
                "transaction updated"
            );
            Ok(updated)
        })
    }
}
