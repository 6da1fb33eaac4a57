use chrono::Utc;
use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CreateTransactionCmd, ResultEngine, Transaction, recurrence::Recurrence, transactions,
};

use super::super::super::{
    Engine, ensure_positive_amount, normalize_optional_text, normalize_required_name, with_tx,
};

impl Engine {
    /// Creates a transaction and moves its account balance by the signed
    /// amount (expenses decrease it, incomes increase it).
    pub async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Transaction> {
        ensure_positive_amount(cmd.amount_minor)?;
        let category = normalize_required_name(&cmd.category, "category")?;
        let description = normalize_optional_text(cmd.description.as_deref());
        let recurrence = Recurrence::resolve(cmd.is_recurring, cmd.recurring_interval, cmd.date)?;

        with_tx!(self, |db_tx| {
            let account = self
                .require_account_owned(&db_tx, cmd.account_id, &cmd.user_id)
                .await?;
            let now = Utc::now();
            let tx = Transaction {
                id: Uuid::new_v4(),
                user_id: cmd.user_id.clone(),
                account_id: cmd.account_id,
                kind: cmd.kind,
                amount_minor: cmd.amount_minor,
                date: cmd.date,
                description,
                category,
                is_recurring: recurrence.is_recurring,
                recurring_interval: recurrence.interval,
                next_recurring_date: recurrence.next_date,
                created_at: now,
                updated_at: now,
            };

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            self.apply_balance_delta(&db_tx, &account.id, &cmd.user_id, tx.delta(), now)
                .await?;

            tracing::debug!(
                transaction_id = %tx.id,
                account_id = %tx.account_id,
                delta = tx.delta().cents(),
                "transaction created"
            );
            Ok(tx)
        })
    }
}
