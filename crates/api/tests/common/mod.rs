use std::sync::Arc;

use api::auth::{AuthConfig, CurrentUser, UserRole};
use api::credentials::hash_password;
use api::schema::{build_schema, AppSchema, MutationRoot, QueryRoot};
use async_graphql::{EmptySubscription, Schema};
use chrono::Utc;
use entity::{user, Status};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectOptions, ConnectionTrait, Database, DatabaseBackend,
    DatabaseConnection, Statement,
};
use uuid::Uuid;

pub type SchemaType = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub struct TestContext {
    pub db: Arc<DatabaseConnection>,
    pub schema: SchemaType,
    pub admin: user::Model,
}

impl TestContext {
    pub fn as_admin(&self) -> CurrentUser {
        CurrentUser {
            user_id: self.admin.id,
            role: UserRole::Admin,
        }
    }

    pub fn as_user(&self, model: &user::Model) -> CurrentUser {
        CurrentUser {
            user_id: model.id,
            role: UserRole::from(model.role),
        }
    }
}

pub async fn setup() -> TestContext {
    // One pooled connection only, so every handle sees the same in-memory
    // database.
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    opts.max_connections(1);
    let conn = Database::connect(opts).await.unwrap();
    let db = Arc::new(conn);
    bootstrap_sqlite(db.as_ref()).await;
    let admin = insert_user(
        db.as_ref(),
        "admin@example.com",
        "Admin One",
        user::Role::Admin,
        "admin-secret",
    )
    .await;
    let auth = Arc::new(AuthConfig {
        jwt_secret: "test-secret".into(),
        session_ttl_minutes: 60,
    });
    let AppSchema(schema) = build_schema(db.clone(), auth);
    TestContext { db, schema, admin }
}

pub async fn insert_user(
    db: &DatabaseConnection,
    email: &str,
    name: &str,
    role: user::Role,
    password: &str,
) -> user::Model {
    let now: DateTimeWithTimeZone = Utc::now().into();
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password).unwrap()),
        role: Set(role),
        status: Set(Status::Active),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .unwrap()
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
        CREATE TABLE "user" (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'USER',
            status TEXT NOT NULL DEFAULT 'active',
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
        CREATE TABLE counter (
            name TEXT PRIMARY KEY,
            seq INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE team (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            created_at TEXT NOT NULL
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE employee (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            employee_id TEXT NOT NULL UNIQUE,
            position TEXT NOT NULL,
            department TEXT NOT NULL,
            skills TEXT NOT NULL DEFAULT '[]',
            contact_info TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            hire_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES "user"(id) ON DELETE CASCADE
        );
        "#,
    ))
    .await
    .unwrap();

    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE employee_team (
            employee_id TEXT NOT NULL,
            team_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (employee_id, team_id),
            FOREIGN KEY(employee_id) REFERENCES employee(id) ON DELETE CASCADE,
            FOREIGN KEY(team_id) REFERENCES team(id) ON DELETE CASCADE
        );
        "#,
    ))
    .await
    .unwrap();
}
