use chrono::Utc;
use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Money, ResultEngine, transactions};

use super::super::super::{
    Engine, balance_out_of_range,
    balances::{BalanceDeltas, add_delta},
    with_tx,
};

/// Upper bound of ids bound into a single `IN (...)` list, well below the
/// SQLite host parameter limit.
const ID_CHUNK: usize = 500;

impl Engine {
    /// Deletes a set of transactions and reverts their effect on balances.
    ///
    /// Ids that do not exist or belong to another user are ignored. The
    /// remaining rows are grouped by account and each account receives one
    /// increment with the sum of the reversed contributions. Either every
    /// row is deleted and every balance adjusted, or nothing changes.
    ///
    /// Ids are processed in chunks, so arbitrarily long lists stay below the
    /// bind parameter limit of the database.
    ///
    /// Returns the number of deleted transactions.
    pub async fn bulk_delete_transactions(
        &self,
        user_id: &str,
        transaction_ids: &[Uuid],
    ) -> ResultEngine<u64> {
        if transaction_ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<String> = transaction_ids.iter().map(Uuid::to_string).collect();

        with_tx!(self, |db_tx| {
            let mut reversals = BalanceDeltas::new();
            let mut deleted = 0;
            for chunk in ids.chunks(ID_CHUNK) {
                let owned = transactions::Entity::find()
                    .filter(transactions::Column::Id.is_in(chunk.iter().cloned()))
                    .filter(transactions::Column::UserId.eq(user_id.to_string()))
                    .all(&db_tx)
                    .await?;
                if owned.is_empty() {
                    continue;
                }

                for model in &owned {
                    let reversal = Money::ZERO
                        .checked_sub(model.delta()?)
                        .ok_or_else(balance_out_of_range)?;
                    add_delta(&mut reversals, &model.account_id, reversal)?;
                }
                let owned_ids: Vec<String> = owned.into_iter().map(|model| model.id).collect();
                deleted += transactions::Entity::delete_many()
                    .filter(transactions::Column::Id.is_in(owned_ids))
                    .filter(transactions::Column::UserId.eq(user_id.to_string()))
                    .exec(&db_tx)
                    .await?
                    .rows_affected;
            }
            self.apply_balance_deltas(&db_tx, user_id, &reversals, Utc::now())
                .await?;

            tracing::debug!(
                requested = transaction_ids.len(),
                deleted,
                accounts = reversals.len(),
                "transactions deleted"
            );
            Ok(deleted)
        })
    }
}
