use crate::{models::User, permission::PermissionSet};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

/// UserDirectory Trait
///
/// Resolves a user id into the identity the gate evaluates: email plus held permissions.
/// The session extractor depends only on this contract, so tests and local runs can swap
/// in `MemoryUserDirectory` for the Postgres-backed implementation.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, id: Uuid) -> Option<User>;
}

/// DirectoryState
///
/// Shared, thread-safe handle to the active directory, held in `AppState`.
pub type DirectoryState = Arc<dyn UserDirectory>;

// --- Postgres Implementation ---

/// PostgresUserDirectory
///
/// Reads profiles from `public.profiles`. The `permissions` column is JSONB and may hold
/// either a list of keys or a key-to-flag object, depending on how the tenant was provisioned.
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    permissions: Option<serde_json::Value>,
}

impl From<ProfileRow> for User {
    fn from(row: ProfileRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            permissions: row.permissions.as_ref().and_then(PermissionSet::from_json),
        }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, email, permissions FROM public.profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        match row {
            Ok(row) => row.map(User::from),
            Err(e) => {
                // A lookup failure reads as "no such user": the session stays unauthenticated.
                tracing::error!(user_id = %id, error = %e, "Profile lookup failed");
                None
            }
        }
    }
}

// --- In-Memory Implementation ---

/// MemoryUserDirectory
///
/// Fixed set of users, used by tests and by local runs without `DATABASE_URL`.
#[derive(Default, Clone)]
pub struct MemoryUserDirectory {
    users: HashMap<Uuid, User>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.insert(user.id, user);
        self
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn get_user(&self, id: Uuid) -> Option<User> {
        self.users.get(&id).cloned()
    }
}
