use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::models::Role;
use crate::account::models::RoleId;
use crate::account::ports::RoleRepository;
use crate::errors::IdentityError;

pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, IdentityError> {
        let row = sqlx::query_as::<_, (Uuid, String, DateTime<Utc>)>(
            r#"
            SELECT id, name, created_at
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IdentityError::DatabaseError(e.to_string()))?;

        Ok(row.map(|(id, name, created_at)| Role {
            id: RoleId(id),
            name,
            created_at,
        }))
    }

    async fn save(&self, role: Role) -> Result<Role, IdentityError> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(role.id.0)
        .bind(&role.name)
        .bind(role.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| IdentityError::DatabaseError(e.to_string()))?;

        Ok(role)
    }
}
