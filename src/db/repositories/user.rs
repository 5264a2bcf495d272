use sqlx::{PgPool, Result as SqlxResult};
use tracing::instrument;
use uuid::Uuid;

use crate::db::prelude::{User, UserId};
use crate::util::identity::Identity;

pub struct UserRepository {
    pool: &'static PgPool,
}

const USER_FIELDS: &str = "id, username, display_name, email, created_at, updated_at";

impl UserRepository {
    pub fn new(pool: &'static PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: &UserId) -> SqlxResult<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_FIELDS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_by_ids(&self, ids: &[UserId]) -> SqlxResult<Vec<User>> {
        let raw: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_FIELDS} FROM users WHERE id = ANY($1)"
        ))
        .bind(raw)
        .fetch_all(self.pool)
        .await
    }

    /// Lazily creates a profile row for an identity seen for the first
    /// time. Upsert keyed on the provider's stable subject id, so a
    /// concurrent first sight is harmless.
    #[instrument(skip(self, identity), fields(subject = %identity.id))]
    pub async fn create_from_identity(&self, identity: &Identity) -> SqlxResult<User> {
        let username = identity
            .email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .map(str::to_owned)
            .unwrap_or_else(|| format!("user_{}", &identity.id.simple().to_string()[..8]));

        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, display_name, email)
            VALUES ($1, $2, NULL, $3)
            ON CONFLICT (id)
            DO UPDATE SET
                email = EXCLUDED.email,
                updated_at = NOW()
            RETURNING {USER_FIELDS}
            "#
        ))
        .bind(identity.id)
        .bind(username)
        .bind(identity.email.as_deref())
        .fetch_one(self.pool)
        .await
    }
}
