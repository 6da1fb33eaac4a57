use chrono::{TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AccountKind, CreateTransactionCmd, Engine, EngineError, NewAccountCmd, NewContactCmd,
    TransactionKind, UpdateAccountCmd,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for user in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (id, email, name, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
            vec![
                user.into(),
                format!("{user}@example.com").into(),
                user.into(),
                "hash".into(),
                Utc::now().into(),
            ],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

#[tokio::test]
async fn first_account_is_always_included_in_budget() {
    let (engine, _db) = engine_with_db().await;

    let first = engine
        .new_account(NewAccountCmd::new("alice", "Checking", AccountKind::Current))
        .await
        .unwrap();
    let second = engine
        .new_account(NewAccountCmd::new("alice", "Savings", AccountKind::Savings))
        .await
        .unwrap();

    assert!(first.is_included_in_budget);
    assert!(!second.is_included_in_budget);
}

#[tokio::test]
async fn new_account_rejects_blank_name() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .new_account(NewAccountCmd::new("alice", "  ", AccountKind::Current))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[tokio::test]
async fn balance_edit_moves_opening_balance() {
    let (engine, _db) = engine_with_db().await;
    let account = engine
        .new_account(
            NewAccountCmd::new("alice", "Checking", AccountKind::Current).balance_minor(10_000),
        )
        .await
        .unwrap();
    engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            account.id,
            TransactionKind::Expense,
            3_000,
            Utc::now(),
            "Food",
        ))
        .await
        .unwrap();

    let updated = engine
        .update_account(
            UpdateAccountCmd::new("alice", account.id)
                .balance_minor(50_000)
                .name("Main")
                .kind(AccountKind::Savings),
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Main");
    assert_eq!(updated.kind, AccountKind::Savings);
    assert_eq!(updated.balance, 50_000);
    assert_eq!(updated.opening_balance, 53_000);

    let recomputed = engine.recompute_balance(account.id, "alice").await.unwrap();
    assert_eq!(recomputed.balance, 50_000);
}

#[tokio::test]
async fn update_foreign_account_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let account = engine
        .new_account(NewAccountCmd::new("alice", "Checking", AccountKind::Current))
        .await
        .unwrap();

    let err = engine
        .update_account(UpdateAccountCmd::new("bob", account.id).name("Mine now"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("account not exists".to_string()));
}

#[tokio::test]
async fn delete_account_removes_its_transactions() {
    let (engine, db) = engine_with_db().await;
    let account = engine
        .new_account(NewAccountCmd::new("alice", "Checking", AccountKind::Current))
        .await
        .unwrap();
    let tx = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice",
            account.id,
            TransactionKind::Income,
            1_000,
            Utc::now(),
            "Salary",
        ))
        .await
        .unwrap();

    assert!(matches!(
        engine.delete_account(account.id, "bob").await,
        Err(EngineError::KeyNotFound(_))
    ));
    engine.delete_account(account.id, "alice").await.unwrap();

    assert!(matches!(
        engine.account(account.id, "alice").await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.transaction(tx.id, "alice").await,
        Err(EngineError::KeyNotFound(_))
    ));

    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT COUNT(*) AS count FROM transactions;".to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    let count: i64 = row.try_get("", "count").unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn list_accounts_counts_transactions() {
    let (engine, _db) = engine_with_db().await;
    let checking = engine
        .new_account(NewAccountCmd::new("alice", "Checking", AccountKind::Current))
        .await
        .unwrap();
    let savings = engine
        .new_account(NewAccountCmd::new("alice", "Savings", AccountKind::Savings))
        .await
        .unwrap();
    engine
        .new_account(NewAccountCmd::new("bob", "Bob's", AccountKind::Current))
        .await
        .unwrap();
    for _ in 0..2 {
        engine
            .create_transaction(CreateTransactionCmd::new(
                "alice",
                checking.id,
                TransactionKind::Expense,
                100,
                Utc::now(),
                "Food",
            ))
            .await
            .unwrap();
    }

    let summaries = engine.list_accounts("alice").await.unwrap();
    assert_eq!(summaries.len(), 2);
    let count_of = |id: uuid::Uuid| {
        summaries
            .iter()
            .find(|s| s.account.id == id)
            .map(|s| s.transaction_count)
            .unwrap()
    };
    assert_eq!(count_of(checking.id), 2);
    assert_eq!(count_of(savings.id), 0);

    let (account, transactions) = engine
        .account_with_transactions(checking.id, "alice")
        .await
        .unwrap();
    assert_eq!(account.balance, -200);
    assert_eq!(transactions.len(), 2);
}

#[tokio::test]
async fn set_budget_upserts_and_validates() {
    let (engine, _db) = engine_with_db().await;
    assert_eq!(engine.budget("alice").await.unwrap(), None);

    let created = engine.set_budget("alice", 50_000).await.unwrap();
    let replaced = engine.set_budget("alice", 60_000).await.unwrap();
    assert_eq!(created.id, replaced.id);
    assert_eq!(replaced.amount_minor, 60_000);
    assert_eq!(engine.budget("alice").await.unwrap(), Some(replaced));

    assert!(matches!(
        engine.set_budget("alice", 0).await,
        Err(EngineError::InvalidAmount(_))
    ));
}

#[tokio::test]
async fn budget_progress_sums_current_month_included_expenses() {
    let (engine, _db) = engine_with_db().await;
    let included = engine
        .new_account(NewAccountCmd::new("alice", "Checking", AccountKind::Current))
        .await
        .unwrap();
    let excluded = engine
        .new_account(NewAccountCmd::new("alice", "Savings", AccountKind::Savings))
        .await
        .unwrap();
    engine.set_budget("alice", 100_000).await.unwrap();

    let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
    let entries = [
        (included.id, TransactionKind::Expense, 20_000, now),
        (included.id, TransactionKind::Income, 90_000, now),
        (
            included.id,
            TransactionKind::Expense,
            5_000,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        ),
        (
            included.id,
            TransactionKind::Expense,
            7_000,
            Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap(),
        ),
        (excluded.id, TransactionKind::Expense, 9_000, now),
    ];
    for (account_id, kind, amount, date) in entries {
        engine
            .create_transaction(CreateTransactionCmd::new(
                "alice", account_id, kind, amount, date, "Misc",
            ))
            .await
            .unwrap();
    }

    let progress = engine.budget_progress("alice", now).await.unwrap();
    assert_eq!(progress.current_expenses_minor, 25_000);
    assert_eq!(progress.percentage_used(), Some(25.0));

    let empty = engine.budget_progress("bob", now).await.unwrap();
    assert_eq!(empty.budget, None);
    assert_eq!(empty.current_expenses_minor, 0);
}

#[tokio::test]
async fn contact_messages_are_trimmed_and_validated() {
    let (engine, db) = engine_with_db().await;

    let stored = engine
        .submit_contact(NewContactCmd::new(
            "  Ann  ",
            " ann@example.com ",
            "  Love the app  ",
        ))
        .await
        .unwrap();
    assert_eq!(stored.name, "Ann");
    assert_eq!(stored.email, "ann@example.com");
    assert_eq!(stored.message, "Love the app");

    for cmd in [
        NewContactCmd::new(" ", "ann@example.com", "hi"),
        NewContactCmd::new("Ann", "not-an-email", "hi"),
        NewContactCmd::new("Ann", "ann@example.com", "   "),
        NewContactCmd::new("Ann", "ann@example.com", "x".repeat(5001)),
    ] {
        let err = engine.submit_contact(cmd).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            "SELECT COUNT(*) AS count FROM contact_messages".to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    let count: i64 = row.try_get("", "count").unwrap();
    assert_eq!(count, 1);
}
