use std::sync::Arc;

use api::schema::{build_schema, AppSchema};
use chrono::{NaiveDate, Utc};
use entity::opportunity;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, Database, DatabaseBackend,
    DatabaseConnection, Statement,
};
use uuid::Uuid;

pub type TestSchema = async_graphql::Schema<
    api::schema::QueryRoot,
    api::schema::MutationRoot,
    async_graphql::EmptySubscription,
>;

pub async fn setup() -> (Arc<DatabaseConnection>, TestSchema) {
    let conn = Database::connect("sqlite::memory:").await.unwrap();
    let db = Arc::new(conn);
    bootstrap_sqlite(db.as_ref()).await;
    let AppSchema(schema) = build_schema(db.clone());
    (db, schema)
}

async fn bootstrap_sqlite(db: &DatabaseConnection) {
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "PRAGMA foreign_keys = ON;",
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE opportunity (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            client_name TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            amount_cents INTEGER,
            probability INTEGER,
            stage TEXT NOT NULL DEFAULT 'PROSPECTING',
            expected_close_date TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE client (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            company TEXT,
            email TEXT,
            phone TEXT,
            industry TEXT,
            contact_person TEXT,
            monthly_value_cents INTEGER,
            status TEXT NOT NULL DEFAULT 'PROSPECT',
            start_date TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE opportunity_stage_history (
            id TEXT PRIMARY KEY,
            opportunity_id TEXT NOT NULL,
            from_stage TEXT NOT NULL,
            to_stage TEXT NOT NULL,
            note TEXT,
            changed_at TEXT NOT NULL,
            FOREIGN KEY(opportunity_id) REFERENCES opportunity(id) ON DELETE CASCADE
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE strategy (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'CREATED',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    ))
    .await
    .unwrap();
}

#[allow(dead_code)]
pub async fn insert_opportunity(
    db: &DatabaseConnection,
    title: &str,
    stage: opportunity::Stage,
    amount_cents: Option<i64>,
    expected_close_date: Option<NaiveDate>,
) -> opportunity::Model {
    let now: DateTimeWithTimeZone = Utc::now().into();
    opportunity::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title.into()),
        client_name: Set("Acme Corp".into()),
        email: Set(Some("contact@acme.test".into())),
        phone: Set(None),
        amount_cents: Set(amount_cents),
        probability: Set(None),
        stage: Set(stage),
        expected_close_date: Set(expected_close_date),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
}
