use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
    sea_query::LikeExpr,
};

use crate::{
    EngineError, ResultEngine, Transaction, TransactionKind, accounts, transactions,
    util::{end_of_day, fold_for_search, start_of_day},
};

use super::super::{Engine, normalize_optional_text, with_tx};

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecurringFilter {
    Recurring,
    NonRecurring,
}

/// Filters for listing transactions. All present filters must match.
///
/// `from`/`to` are calendar days in UTC and both inclusive. With only `from`
/// the range is that single day.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    /// Restricts the list to one account. Without it, only accounts included
    /// in the budget are listed.
    pub account_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub recurring: Option<RecurringFilter>,
    /// Case-insensitive substring of the description.
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Date,
    Amount,
    Category,
    Description,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Ordering of a transaction page; ties are broken by id in the same
/// direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransactionSort {
    pub field: SortField,
    pub direction: SortDirection,
}

/// 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u64, page_size: u64) -> ResultEngine<Self> {
        if page == 0 {
            return Err(EngineError::InvalidInput("page must be >= 1".to_string()));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(EngineError::InvalidInput(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self { page, page_size })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionPage {
    pub items: Vec<Transaction>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from > to
    {
        return Err(EngineError::InvalidInput(
            "invalid range: from must be <= to".to_string(),
        ));
    }
    Ok(())
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('%');
    for c in fold_for_search(raw).chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> ResultEngine<Self>;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionListFilter) -> ResultEngine<Self> {
        if let Some(kind) = filter.kind {
            self = self.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        match filter.recurring {
            Some(RecurringFilter::Recurring) => {
                self = self.filter(transactions::Column::IsRecurring.eq(true));
            }
            Some(RecurringFilter::NonRecurring) => {
                self = self.filter(transactions::Column::IsRecurring.eq(false));
            }
            None => {}
        }
        if let Some(search) = normalize_optional_text(filter.search.as_deref()) {
            self = self.filter(
                transactions::Column::DescriptionSearch
                    .like(LikeExpr::new(escape_like(&search)).escape('\\')),
            );
        }

        let to = filter.to.or(filter.from);
        if let Some(from) = filter.from {
            self = self.filter(transactions::Column::Date.gte(start_of_day(from)));
        }
        if let Some(to) = to {
            self = self.filter(transactions::Column::Date.lte(end_of_day(to)?));
        }

        Ok(self)
    }
}

impl Engine {
    /// Returns one transaction owned by `user_id`.
    pub async fn transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction_owned(&db_tx, transaction_id, user_id)
                .await?;
            Transaction::try_from(model)
        })
    }

    /// Lists transactions page by page.
    ///
    /// Default order is newest first. Listing without writes in between is
    /// repeatable: every order ends with the transaction id.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionListFilter,
        sort: TransactionSort,
        page: PageRequest,
    ) -> ResultEngine<TransactionPage> {
        validate_list_filter(filter)?;
        let page = PageRequest::new(page.page, page.page_size)?;
        with_tx!(self, |db_tx| {
            let mut query = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id.to_string()));

            query = match filter.account_id {
                Some(account_id) => {
                    let account = self
                        .require_account_owned(&db_tx, account_id, user_id)
                        .await?;
                    query.filter(transactions::Column::AccountId.eq(account.id))
                }
                None => {
                    let included: Vec<String> = accounts::Entity::find()
                        .select_only()
                        .column(accounts::Column::Id)
                        .filter(accounts::Column::UserId.eq(user_id.to_string()))
                        .filter(accounts::Column::IsIncludedInBudget.eq(true))
                        .into_tuple()
                        .all(&db_tx)
                        .await?;
                    query.filter(transactions::Column::AccountId.is_in(included))
                }
            };
            query = query.apply_tx_filters(filter)?;

            let total = query.clone().count(&db_tx).await?;
            let total_pages = total.div_ceil(page.page_size);

            let order = match sort.direction {
                SortDirection::Asc => Order::Asc,
                SortDirection::Desc => Order::Desc,
            };
            let column = match sort.field {
                SortField::Date => transactions::Column::Date,
                SortField::Amount => transactions::Column::AmountMinor,
                SortField::Category => transactions::Column::Category,
                SortField::Description => transactions::Column::Description,
            };

            let models = query
                .order_by(column, order.clone())
                .order_by(transactions::Column::Id, order)
                .offset((page.page - 1).saturating_mul(page.page_size))
                .limit(page.page_size)
                .all(&db_tx)
                .await?;

            let items = models
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            Ok(TransactionPage {
                items,
                total,
                total_pages,
                current_page: page.page,
            })
        })
    }
}
