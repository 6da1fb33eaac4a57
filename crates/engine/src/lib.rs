pub use accounts::{Account, AccountKind, AccountSummary};
pub use budgets::{Budget, BudgetProgress};
pub use commands::{
    CreateTransactionCmd, NewAccountCmd, NewContactCmd, UpdateAccountCmd, UpdateTransactionCmd,
};
pub use contacts::ContactMessage;
pub use error::EngineError;
pub use money::Money;
pub use ops::{
    Engine, EngineBuilder, PageRequest, RecurringFilter, SortDirection, SortField,
    TransactionListFilter, TransactionPage, TransactionSort,
};
pub use recurrence::RecurringInterval;
pub use transactions::{Transaction, TransactionKind};

mod accounts;
mod budgets;
mod commands;
mod contacts;
mod error;
mod money;
mod ops;
mod recurrence;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
