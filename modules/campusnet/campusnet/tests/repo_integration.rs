//! sea-orm repositories against an in-memory `SQLite` database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use campusnet::domain::error::DomainError;
use campusnet::domain::repos::{ConnectionsRepository, StoredUser, UserListQuery, UsersRepository};
use campusnet::infra::storage::entity::user;
use campusnet::infra::storage::migrations::Migrator;
use campusnet::infra::storage::{SeaOrmConnectionsRepository, SeaOrmUsersRepository};
use campusnet_sdk::{ConnectionRequest, RequestStatus, UserFilter, UserType};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DbBackend, EntityTrait, Statement};
use sea_orm_migration::MigratorTrait;
use time::OffsetDateTime;
use uuid::Uuid;

mod support;
use support::{inmem_db, seed_user};

fn pending(sender: Uuid, receiver: Uuid) -> ConnectionRequest {
    ConnectionRequest {
        id: Uuid::new_v4(),
        sender_id: sender,
        receiver_id: receiver,
        status: RequestStatus::Pending,
        message: String::new(),
        sent_at: OffsetDateTime::now_utc(),
        responded_at: None,
    }
}

#[tokio::test]
async fn user_round_trips_through_storage() {
    let db = inmem_db().await;
    let repo = SeaOrmUsersRepository::new(db.clone());
    let user = seed_user(&db, UserType::Professional, "Grace Hopper", Some("Admiral")).await;

    let found = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(found.user_type, UserType::Professional);
    assert_eq!(found.name, user.name);
    assert_eq!(found.profession.as_deref(), Some("Admiral"));
    assert_eq!(found.interests, user.interests);
    assert_eq!(found.preferences, user.preferences);

    let creds = repo.find_credentials(&user.email).await.unwrap().unwrap();
    assert_eq!(creds.password_hash, "unused");
    assert!(repo.email_exists(&user.email).await.unwrap());
    assert!(!repo.email_exists("nobody@campus.test").await.unwrap());
}

#[tokio::test]
async fn accept_is_conditional_and_creates_pair_once() {
    let db = inmem_db().await;
    let repo = SeaOrmConnectionsRepository::new(db.clone());
    let a = seed_user(&db, UserType::Student, "Alice", None).await;
    let b = seed_user(&db, UserType::Student, "Bob", None).await;

    let request = pending(a.id, b.id);
    repo.insert_request(&request).await.unwrap();

    let now = OffsetDateTime::now_utc();
    assert!(repo.accept_request(&request, now).await.unwrap());
    assert!(!repo.accept_request(&request, now).await.unwrap());

    assert_eq!(repo.count_connection_rows().await.unwrap(), 2);
    assert!(repo.connection_exists(a.id, b.id).await.unwrap());
    assert!(repo.connection_exists(b.id, a.id).await.unwrap());

    let stored = repo.find_request(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Accepted);
    assert!(stored.responded_at.is_some());
}

#[tokio::test]
async fn accept_skips_rows_that_already_exist() {
    let db = inmem_db().await;
    let repo = SeaOrmConnectionsRepository::new(db.clone());
    let a = seed_user(&db, UserType::Student, "Alice", None).await;
    let b = seed_user(&db, UserType::Student, "Bob", None).await;

    let first = pending(a.id, b.id);
    let second = pending(b.id, a.id);
    repo.insert_request(&first).await.unwrap();
    repo.insert_request(&second).await.unwrap();

    let now = OffsetDateTime::now_utc();
    assert!(repo.accept_request(&first, now).await.unwrap());
    assert!(repo.accept_request(&second, now).await.unwrap());
    assert_eq!(repo.count_connection_rows().await.unwrap(), 2);
}

#[tokio::test]
async fn close_request_only_moves_pending_requests() {
    let db = inmem_db().await;
    let repo = SeaOrmConnectionsRepository::new(db.clone());
    let a = seed_user(&db, UserType::Student, "Alice", None).await;
    let b = seed_user(&db, UserType::Student, "Bob", None).await;

    let request = pending(a.id, b.id);
    repo.insert_request(&request).await.unwrap();
    assert_eq!(repo.count_pending().await.unwrap(), 1);
    assert_eq!(repo.pending_counterparts(b.id).await.unwrap(), vec![a.id]);

    let now = OffsetDateTime::now_utc();
    assert!(repo
        .close_request(request.id, RequestStatus::Rejected, now)
        .await
        .unwrap());
    assert!(!repo
        .close_request(request.id, RequestStatus::Cancelled, now)
        .await
        .unwrap());

    let stored = repo.find_request(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Rejected);
    assert!(repo.find_pending(a.id, b.id).await.unwrap().is_none());
    assert_eq!(repo.count_connection_rows().await.unwrap(), 0);
}

#[tokio::test]
async fn delete_pair_is_idempotent() {
    let db = inmem_db().await;
    let repo = SeaOrmConnectionsRepository::new(db.clone());
    let a = seed_user(&db, UserType::Student, "Alice", None).await;
    let b = seed_user(&db, UserType::Student, "Bob", None).await;

    let request = pending(a.id, b.id);
    repo.insert_request(&request).await.unwrap();
    repo.accept_request(&request, OffsetDateTime::now_utc())
        .await
        .unwrap();

    assert_eq!(repo.delete_pair(b.id, a.id).await.unwrap(), 2);
    assert_eq!(repo.delete_pair(b.id, a.id).await.unwrap(), 0);
    assert!(repo.connections_of(a.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn discover_filters_case_insensitively_and_hides_admins() {
    let db = inmem_db().await;
    let repo = SeaOrmUsersRepository::new(db.clone());
    let me = seed_user(&db, UserType::Student, "Me", None).await;
    seed_user(&db, UserType::Professional, "Dana", Some("Rust Engineer")).await;
    seed_user(&db, UserType::Professional, "Eve", Some("Designer")).await;
    seed_user(&db, UserType::Student, "Rusty", None).await;
    seed_user(&db, UserType::Admin, "Rust Admin", None).await;

    let all = repo
        .discover(&[me.id], &UserFilter::default(), 20)
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|u| u.user_type != UserType::Admin));
    assert!(all.iter().all(|u| u.id != me.id));

    let rust = repo
        .discover(
            &[me.id],
            &UserFilter {
                search: Some("RUST".to_owned()),
                user_type: None,
            },
            20,
        )
        .await
        .unwrap();
    let mut names: Vec<_> = rust.iter().map(|u| u.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["Dana", "Rusty"]);

    let pros = repo
        .discover(
            &[me.id],
            &UserFilter {
                search: Some("rust".to_owned()),
                user_type: Some(UserType::Professional),
            },
            20,
        )
        .await
        .unwrap();
    assert_eq!(pros.len(), 1);
    assert_eq!(pros[0].name, "Dana");

    let wildcard = repo
        .discover(
            &[me.id],
            &UserFilter {
                search: Some("%".to_owned()),
                user_type: None,
            },
            20,
        )
        .await
        .unwrap();
    assert!(wildcard.is_empty());

    let capped = repo
        .discover(&[me.id], &UserFilter::default(), 2)
        .await
        .unwrap();
    assert_eq!(capped.len(), 2);
}

#[tokio::test]
async fn list_page_counts_before_paging() {
    let db = inmem_db().await;
    let repo = SeaOrmUsersRepository::new(db.clone());
    for name in ["Ann", "Ben", "Cat", "Dan", "Eli"] {
        seed_user(&db, UserType::Student, name, None).await;
    }
    seed_user(&db, UserType::Professional, "Pro", Some("Dev")).await;

    let (page, total) = repo
        .list_page(&UserListQuery {
            user_type: Some(UserType::Student),
            search: None,
            offset: 2,
            limit: 2,
        })
        .await
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(page.len(), 2);

    let (page, total) = repo
        .list_page(&UserListQuery {
            user_type: None,
            search: Some("ben@".to_owned()),
            offset: 0,
            limit: 10,
        })
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(page[0].name, "Ben");

    let counts = repo.count_by_type().await.unwrap();
    assert_eq!(counts.students, 5);
    assert_eq!(counts.professionals, 1);
    assert_eq!(counts.total(), 6);
}

#[tokio::test]
async fn delete_with_relations_removes_every_mention() {
    let db = inmem_db().await;
    let users = SeaOrmUsersRepository::new(db.clone());
    let conns = SeaOrmConnectionsRepository::new(db.clone());
    let a = seed_user(&db, UserType::Student, "Alice", None).await;
    let b = seed_user(&db, UserType::Student, "Bob", None).await;
    let c = seed_user(&db, UserType::Student, "Carol", None).await;

    let ab = pending(a.id, b.id);
    conns.insert_request(&ab).await.unwrap();
    conns
        .accept_request(&ab, OffsetDateTime::now_utc())
        .await
        .unwrap();
    conns.insert_request(&pending(c.id, b.id)).await.unwrap();
    conns.insert_request(&pending(a.id, c.id)).await.unwrap();

    assert!(users.delete_with_relations(b.id).await.unwrap());
    assert!(!users.delete_with_relations(b.id).await.unwrap());

    assert!(users.find_by_id(b.id).await.unwrap().is_none());
    assert_eq!(conns.count_connection_rows().await.unwrap(), 0);
    assert!(conns.find_request(ab.id).await.unwrap().is_none());
    assert_eq!(conns.count_pending().await.unwrap(), 1);
}

#[tokio::test]
async fn second_pending_request_for_a_pair_is_a_duplicate() {
    let db = inmem_db().await;
    let repo = SeaOrmConnectionsRepository::new(db.clone());
    let a = seed_user(&db, UserType::Student, "Alice", None).await;
    let b = seed_user(&db, UserType::Student, "Bob", None).await;

    let first = pending(a.id, b.id);
    repo.insert_request(&first).await.unwrap();
    assert!(matches!(
        repo.insert_request(&pending(a.id, b.id)).await.unwrap_err(),
        DomainError::DuplicateRequest
    ));
    assert_eq!(repo.count_pending().await.unwrap(), 1);

    // Only pending rows are constrained: a closed request frees the pair.
    assert!(repo
        .close_request(first.id, RequestStatus::Rejected, OffsetDateTime::now_utc())
        .await
        .unwrap());
    repo.insert_request(&pending(a.id, b.id)).await.unwrap();
}

#[tokio::test]
async fn duplicate_email_insert_is_email_taken() {
    let db = inmem_db().await;
    let repo = SeaOrmUsersRepository::new(db.clone());
    let grace = seed_user(&db, UserType::Professional, "Grace", Some("Admiral")).await;

    let mut clone = grace.clone();
    clone.id = Uuid::new_v4();
    let err = repo
        .insert(&StoredUser {
            user: clone,
            password_hash: "unused".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::EmailTaken), "{err:?}");
}

#[tokio::test]
async fn search_folds_non_ascii_letters() {
    let db = inmem_db().await;
    let repo = SeaOrmUsersRepository::new(db.clone());
    let me = seed_user(&db, UserType::Student, "Me", None).await;
    seed_user(&db, UserType::Professional, "Émile Zola", Some("Écrivain")).await;
    seed_user(&db, UserType::Student, "Emil", None).await;

    for term in ["émile", "ÉMILE", "ÉCRIVAIN"] {
        let found = repo
            .discover(
                &[me.id],
                &UserFilter {
                    search: Some(term.to_owned()),
                    user_type: None,
                },
                20,
            )
            .await
            .unwrap();
        let names: Vec<_> = found.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Émile Zola"], "term {term}");
    }

    let (page, total) = repo
        .list_page(&UserListQuery {
            user_type: None,
            search: Some("ÉMILE".to_owned()),
            offset: 0,
            limit: 10,
        })
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(page[0].name, "Émile Zola");
}

#[tokio::test]
async fn renamed_user_is_found_by_new_name() {
    let db = inmem_db().await;
    let repo = SeaOrmUsersRepository::new(db.clone());
    let me = seed_user(&db, UserType::Student, "Me", None).await;
    let mut other = seed_user(&db, UserType::Student, "Old Name", None).await;

    "Ørjan".clone_into(&mut other.name);
    repo.update_profile(&other).await.unwrap();

    let found = repo
        .discover(
            &[me.id],
            &UserFilter {
                search: Some("ØRJAN".to_owned()),
                user_type: None,
            },
            20,
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, other.id);
}

#[tokio::test]
async fn search_column_migration_backfills_existing_rows() {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, Some(1)).await.unwrap();

    let now = OffsetDateTime::now_utc();
    db.execute(Statement::from_sql_and_values(
        DbBackend::Sqlite,
        "INSERT INTO users (id, user_type, name, email, password_hash, profession, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        [
            Uuid::new_v4().into(),
            "professional".into(),
            "Émile Zola".into(),
            "emile@campus.test".into(),
            "unused".into(),
            "Écrivain".into(),
            now.into(),
            now.into(),
        ],
    ))
    .await
    .unwrap();

    Migrator::up(&db, None).await.unwrap();

    let row = user::Entity::find().one(&db).await.unwrap().unwrap();
    assert_eq!(row.name_search, "émile zola");
    assert_eq!(row.profession_search, "écrivain");
}
