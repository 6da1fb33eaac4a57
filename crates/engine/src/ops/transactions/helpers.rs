use chrono::{DateTime, Utc};

use crate::{Money, ResultEngine, Transaction};

use super::super::{
    balance_out_of_range,
    balances::{BalanceDeltas, add_delta},
    normalize_optional_text,
};

pub(super) fn apply_optional_text_patch(
    existing: Option<String>,
    patch: Option<&str>,
) -> Option<String> {
    match patch {
        None => existing,
        Some(value) => normalize_optional_text(Some(value)),
    }
}

pub(super) fn apply_optional_datetime_patch(
    existing: DateTime<Utc>,
    patch: Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    patch.unwrap_or(existing)
}

/// Balance increments needed to move from `old` to `new`.
///
/// Same account: one entry with `new - old`, kept even when it is zero.
/// Different accounts: the old account loses the old contribution and the new
/// account gains the new one.
pub(super) fn update_deltas(
    old: &Transaction,
    new: &Transaction,
) -> ResultEngine<BalanceDeltas> {
    let mut deltas = BalanceDeltas::new();
    if old.account_id == new.account_id {
        let delta = new
            .delta()
            .checked_sub(old.delta())
            .ok_or_else(balance_out_of_range)?;
        deltas.insert(old.account_id.to_string(), delta);
    } else {
        let reversal = Money::ZERO
            .checked_sub(old.delta())
            .ok_or_else(balance_out_of_range)?;
        add_delta(&mut deltas, &old.account_id.to_string(), reversal)?;
        add_delta(&mut deltas, &new.account_id.to_string(), new.delta())?;
    }
    Ok(deltas)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::TransactionKind;

    fn tx(account_id: Uuid, kind: TransactionKind, amount_minor: i64) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: Uuid::new_v4(),
            user_id: "alice".to_string(),
            account_id,
            kind,
            amount_minor,
            date: now,
            description: None,
            category: "Food".to_string(),
            is_recurring: false,
            recurring_interval: None,
            next_recurring_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn same_account_applies_difference() {
        let account = Uuid::new_v4();
        let old = tx(account, TransactionKind::Expense, 2000);
        let new = tx(account, TransactionKind::Income, 500);
        let deltas = update_deltas(&old, &new).unwrap();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[&account.to_string()], Money::new(2500));
    }

    #[test]
    fn same_account_keeps_zero_delta() {
        let account = Uuid::new_v4();
        let old = tx(account, TransactionKind::Expense, 2000);
        let deltas = update_deltas(&old, &old.clone()).unwrap();
        assert_eq!(deltas[&account.to_string()], Money::ZERO);
    }

    #[test]
    fn moved_transaction_reverts_old_and_applies_new() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let old = tx(a, TransactionKind::Expense, 2000);
        let new = tx(b, TransactionKind::Income, 2000);
        let deltas = update_deltas(&old, &new).unwrap();
        assert_eq!(deltas[&a.to_string()], Money::new(2000));
        assert_eq!(deltas[&b.to_string()], Money::new(2000));
    }

    #[test]
    fn extreme_amounts_do_not_overflow() {
        let account = Uuid::new_v4();
        let old = tx(account, TransactionKind::Income, i64::MAX);
        let new = tx(account, TransactionKind::Expense, i64::MAX);
        assert!(matches!(
            update_deltas(&old, &new),
            Err(crate::EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn text_patch_clears_on_blank() {
        assert_eq!(
            apply_optional_text_patch(Some("old".to_string()), None),
            Some("old".to_string())
        );
        assert_eq!(apply_optional_text_patch(Some("old".to_string()), Some("  ")), None);
        assert_eq!(
            apply_optional_text_patch(None, Some(" new ")),
            Some("new".to_string())
        );
    }
}
