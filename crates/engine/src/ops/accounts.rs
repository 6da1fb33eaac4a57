use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, Statement,
    TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Account, AccountSummary, NewAccountCmd, ResultEngine, Transaction, UpdateAccountCmd,
    accounts, transactions,
};

use super::{Engine, ensure_valid_balance, normalize_required_name, with_tx};

impl Engine {
    /// Creates an account whose initial balance becomes its opening balance.
    ///
    /// The first account of a user is always included in the budget, whatever
    /// the command says.
    pub async fn new_account(&self, cmd: NewAccountCmd) -> ResultEngine<Account> {
        let name = normalize_required_name(&cmd.name, "account name")?;
        ensure_valid_balance(cmd.balance_minor)?;
        with_tx!(self, |db_tx| {
            let existing = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(cmd.user_id.clone()))
                .count(&db_tx)
                .await?;
            let included = cmd.is_included_in_budget || existing == 0;

            let account = Account::new(
                cmd.user_id.clone(),
                name,
                cmd.kind,
                cmd.balance_minor,
                included,
                Utc::now(),
            );
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            tracing::debug!(account_id = %account.id, user_id = %account.user_id, "account created");
            Ok(account)
        })
    }

    /// Updates name, kind, budget flag and/or balance of an account.
    ///
    /// A direct balance edit moves the opening balance by the same difference
    /// in the same statement, so the balance stays equal to the opening
    /// balance plus the transactions.
    pub async fn update_account(&self, cmd: UpdateAccountCmd) -> ResultEngine<Account> {
        let name = cmd
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "account name"))
            .transpose()?;
        if let Some(balance_minor) = cmd.balance_minor {
            ensure_valid_balance(balance_minor)?;
        }
        with_tx!(self, |db_tx| {
            let model = self
                .require_account_owned(&db_tx, cmd.account_id, &cmd.user_id)
                .await?;
            let now = Utc::now();

            let mut active = accounts::ActiveModel {
                id: ActiveValue::Unchanged(model.id.clone()),
                updated_at: ActiveValue::Set(now),
                ..Default::default()
            };
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(kind) = cmd.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(included) = cmd.is_included_in_budget {
                active.is_included_in_budget = ActiveValue::Set(included);
            }
            active.update(&db_tx).await?;

            if let Some(balance_minor) = cmd.balance_minor {
                accounts::Entity::update_many()
                    .col_expr(
                        accounts::Column::OpeningBalanceMinor,
                        Expr::col(accounts::Column::OpeningBalanceMinor)
                            .add(balance_minor)
                            .sub(Expr::col(accounts::Column::BalanceMinor)),
                    )
                    .col_expr(accounts::Column::BalanceMinor, Expr::value(balance_minor))
                    .filter(accounts::Column::Id.eq(model.id.clone()))
                    .exec(&db_tx)
                    .await?;
            }

            let refreshed = self
                .require_account_owned(&db_tx, cmd.account_id, &cmd.user_id)
                .await?;
            Account::try_from(refreshed)
        })
    }

    /// Deletes an account together with all of its transactions.
    pub async fn delete_account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_account_owned(&db_tx, account_id, user_id)
                .await?;
            let removed = transactions::Entity::delete_many()
                .filter(transactions::Column::AccountId.eq(model.id.clone()))
                .exec(&db_tx)
                .await?;
            accounts::Entity::delete_by_id(model.id.clone())
                .exec(&db_tx)
                .await?;
            tracing::debug!(
                account_id = %account_id,
                transactions = removed.rows_affected,
                "account deleted"
            );
            Ok(())
        })
    }

    /// Returns an account owned by `user_id`.
    pub async fn account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_account_owned(&db_tx, account_id, user_id)
                .await?;
            Account::try_from(model)
        })
    }

    /// Lists the user's accounts, newest first, with their transaction counts.
    pub async fn list_accounts(&self, user_id: &str) -> ResultEngine<Vec<AccountSummary>> {
        with_tx!(self, |db_tx| {
            let models = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(accounts::Column::CreatedAt)
                .order_by_desc(accounts::Column::Id)
                .all(&db_tx)
                .await?;

            let backend = db_tx.get_database_backend();
            let stmt = Statement::from_sql_and_values(
                backend,
                "SELECT account_id, COUNT(*) AS count \
                 FROM transactions \
                 WHERE user_id = ? \
                 GROUP BY account_id",
                [user_id.into()],
            );
            let mut counts: HashMap<String, i64> = HashMap::new();
            for row in db_tx.query_all(stmt).await? {
                let account_id: String = row.try_get("", "account_id")?;
                let count: i64 = row.try_get("", "count")?;
                counts.insert(account_id, count);
            }

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                let transaction_count = counts
                    .get(&model.id)
                    .copied()
                    .map(|c| u64::try_from(c).unwrap_or(0))
                    .unwrap_or(0);
                out.push(AccountSummary {
                    account: Account::try_from(model)?,
                    transaction_count,
                });
            }
            Ok(out)
        })
    }

    /// Returns an account and its transactions, newest first.
    pub async fn account_with_transactions(
        &self,
        account_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(Account, Vec<Transaction>)> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_account_owned(&db_tx, account_id, user_id)
                .await?;
            let tx_models = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(model.id.clone()))
                .order_by_desc(transactions::Column::Date)
                .order_by_desc(transactions::Column::Id)
                .all(&db_tx)
                .await?;

            let account = Account::try_from(model)?;
            let transactions = tx_models
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok((account, transactions))
        })
    }
}
