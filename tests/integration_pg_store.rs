//! PostgreSQL store integration tests
//!
//! Run with a scratch database:
//! `DATABASE_URL=postgres://... cargo test --test integration_pg_store -- --ignored`

use sqlx::{Executor, PgPool};
use tokio::sync::OnceCell;
use uuid::Uuid;

use wedding_credits::domain::{
    Admin, AdminRole, Balance, CreditLedgerEntry, CreditTransactionType, Credits, PriceTable,
    PublishMode, PublishPlan, Slug, Wedding,
};
use wedding_credits::store::{
    AdminRepository, CreditChange, LedgerRepository, PgStore, Store, StoreError,
    WeddingRepository,
};

static SCHEMA: OnceCell<()> = OnceCell::const_new();

async fn setup_store() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.expect("Failed to connect to database");

    SCHEMA
        .get_or_init(|| async {
            pool.execute(include_str!("../migrations/0001_wedding_credits.sql"))
                .await
                .expect("Failed to apply schema");
        })
        .await;

    PgStore::new(pool)
}

async fn new_admin(store: &PgStore) -> Admin {
    let admin = Admin::register(
        format!("{}@example.com", Uuid::new_v4()),
        "hash".to_string(),
        "Pg Test".to_string(),
        AdminRole::Admin,
    );
    store.insert_admin(&admin).await.unwrap();
    admin
}

async fn new_wedding(store: &PgStore, owner: &Admin, design: &str) -> Wedding {
    let slug = Slug::parse(&format!("w-{}", Uuid::new_v4().simple())).unwrap();
    let mut wedding = Wedding::create(owner.id, "Ana & Ben".to_string(), slug);
    store.insert_wedding(&wedding).await.unwrap();

    wedding.selected_design_key = Some(design.to_string());
    wedding.selected_features = vec!["rsvp".to_string()];
    store.update_wedding(&wedding).await.unwrap()
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_admin_roundtrip_and_duplicate_email() {
    let store = setup_store().await;
    let admin = new_admin(&store).await;

    let found = store.find_admin(admin.id).await.unwrap().unwrap();
    assert_eq!(found.email, admin.email);
    assert_eq!(found.available_credits(), Balance::new(100).unwrap());

    let by_email = store.find_admin_by_email(&admin.email).await.unwrap();
    assert_eq!(by_email.map(|a| a.id), Some(admin.id));

    let twin = Admin::register(
        admin.email.clone(),
        "hash".to_string(),
        "Twin".to_string(),
        AdminRole::Admin,
    );
    let result = store.insert_admin(&twin).await;
    assert!(matches!(result, Err(StoreError::Duplicate("email"))));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_slug_rejected() {
    let store = setup_store().await;
    let owner = new_admin(&store).await;
    let wedding = new_wedding(&store, &owner, "basic").await;

    let twin = Wedding::create(owner.id, "Twin".to_string(), wedding.slug.clone());
    let result = store.insert_wedding(&twin).await;
    assert!(matches!(result, Err(StoreError::Duplicate("slug"))));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_publish_commits_balance_entry_and_wedding() {
    let store = setup_store().await;
    let mut admin = new_admin(&store).await;
    let mut wedding = new_wedding(&store, &admin, "luxury").await;

    let mode = PublishMode::Publish {
        allow_upgrade: false,
    };
    let plan = PublishPlan::prepare(&wedding, &PriceTable::default(), mode).unwrap();
    let charged = plan.apply(&mut admin, &mut wedding).unwrap().unwrap();
    let entry = CreditLedgerEntry::deduct(
        admin.id,
        charged,
        admin.available_credits(),
        plan.description(&wedding),
        wedding.id,
    );

    let committed = store
        .apply_credit_change(CreditChange {
            admin: admin.clone(),
            entry: Some(entry),
            wedding: Some(wedding.clone()),
        })
        .await
        .unwrap();
    assert_eq!(committed.admin.version, admin.version + 1);

    let stored = store.find_admin(admin.id).await.unwrap().unwrap();
    assert_eq!(stored.available_credits(), Balance::new(65).unwrap());

    let stored_wedding = store.find_wedding(wedding.id).await.unwrap().unwrap();
    assert_eq!(stored_wedding.total_credit_cost(), 35);
    assert!(stored_wedding.published_at().is_some());

    let ledger = store.ledger_for_admin(admin.id).await.unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].transaction_type, CreditTransactionType::Deduct);
    assert_eq!(ledger[0].wedding_id, Some(wedding.id));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_stale_admin_version_is_refused() {
    let store = setup_store().await;
    let admin = new_admin(&store).await;

    let mut first = admin.clone();
    let balance = first.grant(Credits::new(10).unwrap()).unwrap();
    store
        .apply_credit_change(CreditChange {
            entry: Some(CreditLedgerEntry::credit(
                first.id,
                Credits::new(10).unwrap(),
                balance,
                "first".to_string(),
            )),
            admin: first,
            wedding: None,
        })
        .await
        .unwrap();

    // Planned from the same snapshot as the first change
    let mut stale = admin.clone();
    let balance = stale.grant(Credits::new(5).unwrap()).unwrap();
    let result = store
        .apply_credit_change(CreditChange {
            entry: Some(CreditLedgerEntry::credit(
                stale.id,
                Credits::new(5).unwrap(),
                balance,
                "stale".to_string(),
            )),
            admin: stale,
            wedding: None,
        })
        .await;
    assert!(matches!(result, Err(StoreError::Conflict { .. })));

    // Nothing from the refused change landed
    let stored = store.find_admin(admin.id).await.unwrap().unwrap();
    assert_eq!(stored.available_credits(), Balance::new(110).unwrap());
    assert_eq!(store.ledger_for_admin(admin.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_ledger_is_newest_first() {
    let store = setup_store().await;
    let mut admin = new_admin(&store).await;

    for amount in [1, 2, 3] {
        let credits = Credits::new(amount).unwrap();
        let balance = admin.grant(credits).unwrap();
        let committed = store
            .apply_credit_change(CreditChange {
                entry: Some(CreditLedgerEntry::credit(
                    admin.id,
                    credits,
                    balance,
                    format!("grant {}", amount),
                )),
                admin: admin.clone(),
                wedding: None,
            })
            .await
            .unwrap();
        admin = committed.admin;
    }

    let ledger = store.ledger_for_admin(admin.id).await.unwrap();
    let descriptions: Vec<_> = ledger.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(descriptions, ["grant 3", "grant 2", "grant 1"]);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_admin_with_ledger_reads_one_snapshot() {
    let store = setup_store().await;
    let mut admin = new_admin(&store).await;

    let credits = Credits::new(25).unwrap();
    let balance = admin.grant(credits).unwrap();
    store
        .apply_credit_change(CreditChange {
            entry: Some(CreditLedgerEntry::credit(
                admin.id,
                credits,
                balance,
                "top up".to_string(),
            )),
            admin: admin.clone(),
            wedding: None,
        })
        .await
        .unwrap();

    let (stored, entries) = store.admin_with_ledger(admin.id).await.unwrap().unwrap();
    assert_eq!(stored.available_credits(), Balance::new(125).unwrap());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].balance_after, stored.available_credits());

    assert!(store.admin_with_ledger(Uuid::new_v4()).await.unwrap().is_none());
}
