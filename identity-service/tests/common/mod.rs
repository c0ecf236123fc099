#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use identity_service::account::models::Account;
use identity_service::account::models::AccountId;
use identity_service::account::models::EmailAddress;
use identity_service::account::models::PhoneNumber;
use identity_service::account::models::Role;
use identity_service::account::ports::AccountRepository;
use identity_service::account::ports::RoleRepository;
use identity_service::bootstrap::ensure_default_role;
use identity_service::domain::account::service::AccountService;
use identity_service::domain::session::service::SessionService;
use identity_service::errors::IdentityError;
use identity_service::inbound::http::router::create_router;
use serde_json::json;
use serde_json::Value;
use sqlx::postgres::PgConnectOptions;
use sqlx::postgres::PgPoolOptions;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;
use tokio::sync::Notify;

pub const SIGNING_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const DEFAULT_ROLE: &str = "ROLE_USER";

/// Account store backed by a map, enforcing the same uniqueness rules as Postgres
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: Mutex<HashMap<AccountId, Account>>,
}

impl InMemoryAccountRepository {
    pub fn len(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    pub fn get(&self, id: &AccountId) -> Option<Account> {
        self.accounts.lock().unwrap().get(id).cloned()
    }

    pub fn by_email(&self, email: &str) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap()
            .values()
            .find(|account| account.email.as_str() == email)
            .cloned()
    }

    /// Overwrite stored state directly, bypassing the service
    pub fn modify(&self, email: &str, change: impl FnOnce(&mut Account)) {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .values_mut()
            .find(|account| account.email.as_str() == email)
            .expect("account to modify");
        change(account);
    }

    /// Apply a conditional change under the lock, like a single guarded UPDATE
    fn write(
        &self,
        id: &AccountId,
        change: impl FnOnce(&mut Account) -> bool,
    ) -> Result<bool, IdentityError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(id)
            .ok_or(IdentityError::NotFound(id.to_string()))?;
        Ok(change(account))
    }

    fn conflict(
        accounts: &HashMap<AccountId, Account>,
        candidate: &Account,
    ) -> Option<IdentityError> {
        for other in accounts.values() {
            if other.email == candidate.email {
                return Some(IdentityError::EmailExists);
            }
            if other.phone_number == candidate.phone_number {
                return Some(IdentityError::PhoneExists);
            }
        }
        None
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, IdentityError> {
        let mut accounts = self.accounts.lock().unwrap();
        if let Some(err) = Self::conflict(&accounts, &account) {
            return Err(err);
        }
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, IdentityError> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, IdentityError> {
        Ok(self.by_email(email.as_str()))
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, IdentityError> {
        Ok(self.by_email(email.as_str()).is_some())
    }

    async fn exists_by_phone(&self, phone_number: &PhoneNumber) -> Result<bool, IdentityError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .any(|account| &account.phone_number == phone_number))
    }

    async fn set_enabled(
        &self,
        id: &AccountId,
        enabled: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, IdentityError> {
        self.write(id, |account| {
            if account.enabled == enabled {
                return false;
            }
            account.enabled = enabled;
            account.updated_at = Some(at);
            true
        })
    }

    async fn replace_secret_hash(
        &self,
        id: &AccountId,
        expected_hash: &str,
        new_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, IdentityError> {
        self.write(id, |account| {
            if account.secret_hash != expected_hash {
                return false;
            }
            account.secret_hash = new_hash.to_string();
            account.credentials_expired = false;
            account.updated_at = Some(at);
            true
        })
    }

    async fn mark_deletion_requested(
        &self,
        id: &AccountId,
        at: DateTime<Utc>,
    ) -> Result<bool, IdentityError> {
        self.write(id, |account| {
            if account.deletion_requested_at.is_some() {
                return false;
            }
            account.deletion_requested_at = Some(at);
            account.updated_at = Some(at);
            true
        })
    }
}

/// Account store that parks the next `find_by_id` right after it has read,
/// so a test can interleave other writes before the reader continues
pub struct PausingAccountRepository {
    pub inner: InMemoryAccountRepository,
    armed: AtomicBool,
    paused: Notify,
    resume: Notify,
}

impl PausingAccountRepository {
    pub fn new(inner: InMemoryAccountRepository) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(false),
            paused: Notify::new(),
            resume: Notify::new(),
        }
    }

    /// Park the next read
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    pub async fn wait_until_paused(&self) {
        self.paused.notified().await;
    }

    pub fn resume(&self) {
        self.resume.notify_one();
    }
}

#[async_trait]
impl AccountRepository for PausingAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, IdentityError> {
        self.inner.create(account).await
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, IdentityError> {
        let account = self.inner.find_by_id(id).await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.paused.notify_one();
            self.resume.notified().await;
        }
        Ok(account)
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Account>, IdentityError> {
        self.inner.find_by_email(email).await
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, IdentityError> {
        self.inner.exists_by_email(email).await
    }

    async fn exists_by_phone(&self, phone_number: &PhoneNumber) -> Result<bool, IdentityError> {
        self.inner.exists_by_phone(phone_number).await
    }

    async fn set_enabled(
        &self,
        id: &AccountId,
        enabled: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, IdentityError> {
        self.inner.set_enabled(id, enabled, at).await
    }

    async fn replace_secret_hash(
        &self,
        id: &AccountId,
        expected_hash: &str,
        new_hash: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, IdentityError> {
        self.inner
            .replace_secret_hash(id, expected_hash, new_hash, at)
            .await
    }

    async fn mark_deletion_requested(
        &self,
        id: &AccountId,
        at: DateTime<Utc>,
    ) -> Result<bool, IdentityError> {
        self.inner.mark_deletion_requested(id, at).await
    }
}

#[derive(Default)]
pub struct InMemoryRoleRepository {
    roles: Mutex<HashMap<String, Role>>,
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, IdentityError> {
        Ok(self.roles.lock().unwrap().get(name).cloned())
    }

    async fn save(&self, role: Role) -> Result<Role, IdentityError> {
        let mut roles = self.roles.lock().unwrap();
        if roles.contains_key(&role.name) {
            return Err(IdentityError::DatabaseError(format!(
                "duplicate role name: {}",
                role.name
            )));
        }
        roles.insert(role.name.clone(), role.clone());
        Ok(role)
    }
}

/// Throwaway Postgres database with migrations applied.
///
/// Only available when `DATABASE_URL` points at a server that allows
/// creating databases.
pub struct TestDb {
    pub pool: PgPool,
    server_url: String,
    db_name: String,
}

impl TestDb {
    /// Create a uniquely named database, or `None` when no server is configured
    pub async fn connect() -> Option<Self> {
        let Ok(server_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping Postgres test");
            return None;
        };

        let db_name = format!(
            "test_identity_service_{}",
            uuid::Uuid::new_v4().to_string().replace('-', "_")
        );

        let mut conn = PgConnection::connect(&server_url)
            .await
            .expect("Failed to connect to Postgres");
        conn.execute(format!(r#"CREATE DATABASE "{}";"#, db_name).as_str())
            .await
            .expect("Failed to create test database");

        let options = server_url
            .parse::<PgConnectOptions>()
            .expect("Failed to parse DATABASE_URL")
            .database(&db_name);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        Some(Self {
            pool,
            server_url,
            db_name,
        })
    }

    /// Close the pool and drop the database
    pub async fn close(self) {
        self.pool.close().await;

        if let Ok(mut conn) = PgConnection::connect(&self.server_url).await {
            let _ = conn
                .execute(format!(r#"DROP DATABASE IF EXISTS "{}" WITH (FORCE);"#, self.db_name).as_str())
                .await;
        }
    }
}

/// Test application that spawns a real server over in-memory stores
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub accounts: Arc<InMemoryAccountRepository>,
    pub roles: Arc<InMemoryRoleRepository>,
    pub clock: Arc<auth::ManualClock>,
    pub tokens: Arc<auth::TokenService>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let roles = Arc::new(InMemoryRoleRepository::default());
        ensure_default_role(roles.as_ref(), DEFAULT_ROLE)
            .await
            .expect("Failed to provision default role");

        Self::spawn_with_roles(roles).await
    }

    /// Spawn with a caller-provided role store (possibly missing the default role)
    pub async fn spawn_with_roles(roles: Arc<InMemoryRoleRepository>) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let accounts = Arc::new(InMemoryAccountRepository::default());
        let hasher = Arc::new(
            auth::PasswordHasher::with_params(8192, 1, 1).expect("Failed to build hasher"),
        );
        let clock = Arc::new(auth::ManualClock::new(Utc::now()));
        let tokens = Arc::new(auth::TokenService::with_clock(
            SIGNING_SECRET,
            auth::TokenPolicy::default(),
            clock.clone(),
        ));

        let account_service = Arc::new(AccountService::new(
            Arc::clone(&accounts),
            Arc::clone(&roles),
            Arc::clone(&hasher),
            DEFAULT_ROLE,
        ));
        let session_service = Arc::new(SessionService::new(
            Arc::clone(&accounts),
            hasher,
            Arc::clone(&tokens),
        ));

        let router = create_router(session_service, account_service, Duration::from_secs(30));

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            accounts,
            roles,
            clock,
            tokens,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    pub async fn register(&self, email: &str, phone_number: &str, password: &str) -> reqwest::Response {
        self.post("/api/v1/auth/register")
            .json(&registration_body(email, phone_number, password))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/v1/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register an account and log in, returning the token payload
    pub async fn register_and_login(&self, email: &str, phone_number: &str, password: &str) -> Value {
        let response = self.register(email, phone_number, password).await;
        assert_eq!(response.status(), 201);

        let response = self.login(email, password).await;
        assert_eq!(response.status(), 200);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"].clone()
    }
}

pub fn registration_body(email: &str, phone_number: &str, password: &str) -> Value {
    json!({
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": email,
        "phone_number": phone_number,
        "password": password,
        "confirm_password": password,
        "date_of_birth": "1990-12-10"
    })
}

pub fn access_token(tokens: &Value) -> String {
    tokens["access_token"]
        .as_str()
        .expect("access_token in response")
        .to_string()
}

pub fn refresh_token(tokens: &Value) -> String {
    tokens["refresh_token"]
        .as_str()
        .expect("refresh_token in response")
        .to_string()
}
