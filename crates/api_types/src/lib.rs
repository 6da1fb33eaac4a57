use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: String,
        pub email: String,
        pub name: Option<String>,
    }

    /// Body of `PATCH /auth/me`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub name: String,
    }

    /// Returned by login and refresh; the tokens themselves travel as
    /// http-only cookies.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        pub user: UserView,
        /// Access token lifetime, in seconds.
        pub expires_in: i64,
    }
}

pub mod contact {
    use super::*;

    /// Body of the public contact form.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContactNew {
        pub name: String,
        pub email: String,
        pub message: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContactView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub message: String,
        pub created_at: DateTime<FixedOffset>,
    }
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum AccountKind {
        #[default]
        Current,
        Savings,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        #[serde(default, rename = "type")]
        pub kind: AccountKind,
        /// Decimal amount, e.g. `"1250.50"`. Defaults to zero.
        pub balance: Option<String>,
        #[serde(default)]
        pub is_included_in_budget: bool,
    }

    /// Patch body: absent fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<AccountKind>,
        /// Decimal amount; moves the balance directly.
        pub balance: Option<String>,
        pub is_included_in_budget: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: AccountKind,
        pub balance_minor: i64,
        pub opening_balance_minor: i64,
        pub is_included_in_budget: bool,
        pub created_at: DateTime<FixedOffset>,
        pub updated_at: DateTime<FixedOffset>,
        /// Present in listings only.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub transaction_count: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountListResponse {
        pub accounts: Vec<AccountView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountDetailResponse {
        pub account: AccountView,
        pub transactions: Vec<super::transaction::TransactionView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum TransactionKind {
        Expense,
        Income,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
    pub enum RecurringInterval {
        Daily,
        Weekly,
        Monthly,
        Yearly,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum RecurringFilter {
        Recurring,
        NonRecurring,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum SortField {
        Date,
        Amount,
        Category,
        Description,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum SortDirection {
        Asc,
        Desc,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub account_id: Uuid,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        /// Decimal amount, strictly positive (e.g. `"30.00"`).
        pub amount: String,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub date: DateTime<FixedOffset>,
        pub description: Option<String>,
        pub category: String,
        #[serde(default)]
        pub is_recurring: bool,
        pub recurring_interval: Option<RecurringInterval>,
    }

    /// Patch body: absent fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub account_id: Option<Uuid>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        pub amount: Option<String>,
        pub date: Option<DateTime<FixedOffset>>,
        /// An empty string clears the description.
        pub description: Option<String>,
        pub category: Option<String>,
        pub is_recurring: Option<bool>,
        pub recurring_interval: Option<RecurringInterval>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub account_id: Uuid,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        /// Always positive; the kind gives the sign.
        pub amount_minor: i64,
        pub date: DateTime<FixedOffset>,
        pub description: Option<String>,
        pub category: String,
        pub is_recurring: bool,
        pub recurring_interval: Option<RecurringInterval>,
        pub next_recurring_date: Option<DateTime<FixedOffset>>,
        pub created_at: DateTime<FixedOffset>,
        pub updated_at: DateTime<FixedOffset>,
    }

    /// Query string of `GET /transactions`.
    ///
    /// `from`/`to` are inclusive calendar days (`YYYY-MM-DD`).
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub account_id: Option<Uuid>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        pub recurring: Option<RecurringFilter>,
        pub search: Option<String>,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
        pub page: Option<u64>,
        pub limit: Option<u64>,
        pub sort_by: Option<SortField>,
        pub sort_dir: Option<SortDirection>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Pagination {
        pub total: u64,
        pub total_pages: u64,
        pub current_page: u64,
        pub limit: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        pub pagination: Pagination,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BulkDelete {
        pub transaction_ids: Vec<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BulkDeleteResponse {
        pub deleted: u64,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetSet {
        /// Decimal amount, strictly positive.
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub amount_minor: i64,
        pub updated_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetProgressResponse {
        pub budget: Option<BudgetView>,
        /// Expenses of the current month on budget-included accounts.
        pub current_expenses_minor: i64,
        pub percentage_used: Option<f64>,
    }
}
