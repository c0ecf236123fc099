use async_trait::async_trait;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::EmailAddress;
use crate::account::models::PersonName;
use crate::account::models::PhoneNumber;
use crate::account::models::Role;
use crate::account::models::RoleId;
use crate::account::ports::AccountRepository;
use crate::errors::IdentityError;

const ACCOUNT_COLUMNS: &str = r#"
    id, first_name, last_name, email, phone_number, secret_hash, date_of_birth,
    profile_picture_url, enabled, account_locked, credentials_expired,
    email_verified, phone_verified, deletion_requested_at, created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
    secret_hash: String,
    date_of_birth: Option<NaiveDate>,
    profile_picture_url: Option<String>,
    enabled: bool,
    account_locked: bool,
    credentials_expired: bool,
    email_verified: bool,
    phone_verified: bool,
    deletion_requested_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl AccountRow {
    fn into_account(self, roles: Vec<Role>) -> Result<Account, IdentityError> {
        Ok(Account {
            id: AccountId(self.id),
            first_name: PersonName::new(self.first_name)?,
            last_name: PersonName::new(self.last_name)?,
            email: EmailAddress::new(self.email)?,
            phone_number: PhoneNumber::new(self.phone_number)?,
            secret_hash: self.secret_hash,
            date_of_birth: self.date_of_birth,
            profile_picture_url: self.profile_picture_url,
            enabled: self.enabled,
            account_locked: self.account_locked,
            credentials_expired: self.credentials_expired,
            email_verified: self.email_verified,
            phone_verified: self.phone_verified,
            roles,
            deletion_requested_at: self.deletion_requested_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Role {
            id: RoleId(row.id),
            name: row.name,
            created_at: row.created_at,
        }
    }
}

fn database_error(e: sqlx::Error) -> IdentityError {
    IdentityError::DatabaseError(e.to_string())
}

/// Map unique violations on the account identity columns to domain conflicts.
fn write_error(e: sqlx::Error) -> IdentityError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some("accounts_email_key") {
                return IdentityError::EmailExists;
            }
            if db_err.constraint() == Some("accounts_phone_number_key") {
                return IdentityError::PhoneExists;
            }
        }
    }
    database_error(e)
}

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn roles_of(&self, account_id: Uuid) -> Result<Vec<Role>, IdentityError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT r.id, r.name, r.created_at
            FROM roles r
            JOIN account_roles ar ON ar.role_id = r.id
            WHERE ar.account_id = $1
            ORDER BY ar.granted_at, r.name
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(rows.into_iter().map(Role::from).collect())
    }

    /// Tell a guard that did not match apart from a missing account.
    async fn applied(&self, id: &AccountId, rows_affected: u64) -> Result<bool, IdentityError> {
        if rows_affected > 0 {
            return Ok(true);
        }

        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
                .bind(id.0)
                .fetch_one(&self.pool)
                .await
                .map_err(database_error)?;

        if exists {
            Ok(false)
        } else {
            Err(IdentityError::NotFound(id.to_string()))
        }
    }

    async fn hydrate(&self, row: Option<AccountRow>) -> Result<Option<Account>, IdentityError> {
        match row {
            Some(row) => {
                let roles = self.roles_of(row.id).await?;
                Ok(Some(row.into_account(roles)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, IdentityError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, first_name, last_name, email, phone_number, secret_hash, date_of_birth,
                profile_picture_url, enabled, account_locked, credentials_expired,
                email_verified, phone_verified, deletion_requested_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(account.id.0)
        .bind(account.first_name.as_str())
        .bind(account.last_name.as_str())
        .bind(account.email.as_str())
        .bind(account.phone_number.as_str())
        .bind(&account.secret_hash)
        .bind(account.date_of_birth)
        .bind(account.profile_picture_url.as_deref())
        .bind(account.enabled)
        .bind(account.account_locked)
        .bind(account.credentials_expired)
        .bind(account.email_verified)
        .bind(account.phone_verified)
        .bind(account.deletion_requested_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(write_error)?;

        for role in &account.roles {
            sqlx::query(
                r#"
                INSERT INTO account_roles (account_id, role_id, granted_at)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(account.id.0)
            .bind(role.id.0)
            .bind(account.created_at)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;
        }

        tx.commit().await.map_err(database_error)?;

        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, IdentityError> {
        let query = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);
        let row = sqlx::query_as::<_, AccountRow>(&query)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        self.hydrate(row).await
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, IdentityError> {
        let query = format!("SELECT {} FROM accounts WHERE email = $1", ACCOUNT_COLUMNS);
        let row = sqlx::query_as::<_, AccountRow>(&query)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        self.hydrate(row).await
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, IdentityError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)
    }

    async fn exists_by_phone(&self, phone_number: &PhoneNumber) -> Result<bool, IdentityError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE phone_number = $1)",
        )
        .bind(phone_number.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(database_error)
    }

    async fn set_enabled(
        &self,
        id: &AccountId,
        enabled: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, IdentityError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET enabled = $2, updated_at = $3
            WHERE id = $1 AND enabled <> $2
            "#,
        )
        .bind(id.0)
        .bind(enabled)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        self.applied(id, result.rows_affected()).await
    }

    async fn replace_secret_hash(
        &self,
        id: &AccountId,
        expected_hash: &str,
        new_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, IdentityError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET secret_hash = $3, credentials_expired = FALSE, updated_at = $4
            WHERE id = $1 AND secret_hash = $2
            "#,
        )
        .bind(id.0)
        .bind(expected_hash)
        .bind(new_hash)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        self.applied(id, result.rows_affected()).await
    }

    async fn mark_deletion_requested(
        &self,
        id: &AccountId,
        at: DateTime<Utc>,
    ) -> Result<bool, IdentityError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET deletion_requested_at = $2, updated_at = $2
            WHERE id = $1 AND deletion_requested_at IS NULL
            "#,
        )
        .bind(id.0)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        self.applied(id, result.rows_affected()).await
    }
}
