mod helpers;
mod list;
mod write;

pub use list::{
    PageRequest, RecurringFilter, SortDirection, SortField, TransactionListFilter,
    TransactionPage, TransactionSort,
};
