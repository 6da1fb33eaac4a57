use sea_orm::DatabaseConnection;

use crate::{EngineError, Money, ResultEngine};

mod access;
mod accounts;
mod balances;
mod budgets;
mod contacts;
mod transactions;

pub use transactions::{
    PageRequest, RecurringFilter, SortDirection, SortField, TransactionListFilter,
    TransactionPage, TransactionSort,
};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every ledger operation.
///
/// The engine holds only the connection pool; every public method runs as one
/// database transaction, so it can be shared behind an `Arc` by request
/// handlers.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn ensure_positive_amount(amount_minor: i64) -> ResultEngine<()> {
    if amount_minor <= 0 {
        return Err(EngineError::InvalidAmount(
            "amount must be > 0".to_string(),
        ));
    }
    if amount_minor > Money::MAX_AMOUNT.cents() {
        return Err(EngineError::InvalidAmount("amount too large".to_string()));
    }
    Ok(())
}

fn ensure_valid_balance(balance_minor: i64) -> ResultEngine<()> {
    if !Money::new(balance_minor).is_valid_balance() {
        return Err(balance_out_of_range());
    }
    Ok(())
}

fn balance_out_of_range() -> EngineError {
    EngineError::InvalidAmount("balance out of range".to_string())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
