//! Command structs for engine operations.
//!
//! These types group parameters for write operations
//! (create/update of transactions and accounts, contact messages), keeping call sites readable
//! and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{AccountKind, RecurringInterval, TransactionKind};

/// Create a transaction on one account.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub user_id: String,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub date: DateTime<Utc>,
    pub category: String,
    pub description: Option<String>,
    pub is_recurring: bool,
    pub recurring_interval: Option<RecurringInterval>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        account_id: Uuid,
        kind: TransactionKind,
        amount_minor: i64,
        date: DateTime<Utc>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            kind,
            amount_minor,
            date,
            category: category.into(),
            description: None,
            is_recurring: false,
            recurring_interval: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the transaction as recurring with the given cadence.
    #[must_use]
    pub fn recurring(mut self, interval: RecurringInterval) -> Self {
        self.is_recurring = true;
        self.recurring_interval = Some(interval);
        self
    }
}

/// Patch an existing transaction. `None` fields keep the stored value.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub user_id: String,
    pub transaction_id: Uuid,
    pub kind: Option<TransactionKind>,
    pub amount_minor: Option<i64>,
    pub account_id: Option<Uuid>,
    pub date: Option<DateTime<Utc>>,
    /// `Some("")` clears the description.
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_recurring: Option<bool>,
    pub recurring_interval: Option<RecurringInterval>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, transaction_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_id,
            kind: None,
            amount_minor: None,
            account_id: None,
            date: None,
            description: None,
            category: None,
            is_recurring: None,
            recurring_interval: None,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn is_recurring(mut self, is_recurring: bool) -> Self {
        self.is_recurring = Some(is_recurring);
        self
    }

    #[must_use]
    pub fn recurring_interval(mut self, interval: RecurringInterval) -> Self {
        self.recurring_interval = Some(interval);
        self
    }
}

/// Create an account.
#[derive(Clone, Debug)]
pub struct NewAccountCmd {
    pub user_id: String,
    pub name: String,
    pub kind: AccountKind,
    /// Initial balance; becomes the account's opening balance.
    pub balance_minor: i64,
    pub is_included_in_budget: bool,
}

impl NewAccountCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            kind,
            balance_minor: 0,
            is_included_in_budget: false,
        }
    }

    #[must_use]
    pub fn balance_minor(mut self, balance_minor: i64) -> Self {
        self.balance_minor = balance_minor;
        self
    }

    #[must_use]
    pub fn included_in_budget(mut self, included: bool) -> Self {
        self.is_included_in_budget = included;
        self
    }
}

/// Patch an account. `None` fields keep the stored value.
#[derive(Clone, Debug)]
pub struct UpdateAccountCmd {
    pub user_id: String,
    pub account_id: Uuid,
    pub name: Option<String>,
    pub kind: Option<AccountKind>,
    /// Direct balance edit.
    pub balance_minor: Option<i64>,
    pub is_included_in_budget: Option<bool>,
}

impl UpdateAccountCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, account_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            name: None,
            kind: None,
            balance_minor: None,
            is_included_in_budget: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: AccountKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn balance_minor(mut self, balance_minor: i64) -> Self {
        self.balance_minor = Some(balance_minor);
        self
    }

    #[must_use]
    pub fn included_in_budget(mut self, included: bool) -> Self {
        self.is_included_in_budget = Some(included);
        self
    }
}

/// Submit a message through the contact form.
#[derive(Clone, Debug)]
pub struct NewContactCmd {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl NewContactCmd {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }
}
