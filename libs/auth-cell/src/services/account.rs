// libs/auth-cell/src/services/account.rs
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::supabase::{DbError, SupabaseClient};
use shared_utils::jwt::issue_token;

use crate::models::{AuthError, AuthResponse, LoginRequest, RegisterRequest, UserRecord};

pub struct AccountService {
    supabase: SupabaseClient,
    jwt_secret: String,
}

impl AccountService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            jwt_secret: config.jwt_secret.clone(),
        }
    }

    /// Create an account and hand back a signed session token.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let email = request.email.trim().to_lowercase();
        debug!("Registering account for {}", email);

        // Friendly duplicate check; the unique index on email still backstops
        // a racing insert with a 409.
        let existing = self.find_by_email(&email).await?;
        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&request.password)?;

        let now = Utc::now();
        let user_data = json!({
            "full_name": request.full_name.trim(),
            "email": email,
            "password_hash": password_hash,
            "role": request.role,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::POST, "/rest/v1/users", Some(user_data), Some(headers))
            .await
            .map_err(|e| match e {
                DbError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Database(other.to_string()),
            })?;

        if result.is_empty() {
            return Err(AuthError::Database("Failed to create user".to_string()));
        }

        let user: UserRecord = serde_json::from_value(result[0].clone())
            .map_err(|e| AuthError::Database(format!("Failed to parse user: {}", e)))?;

        info!("Account {} registered as {}", user.id, user.role);
        self.session_for(user)
    }

    /// Verify credentials and hand back a signed session token. Unknown email
    /// and wrong password are indistinguishable to the caller.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = request.email.trim().to_lowercase();
        debug!("Login attempt for {}", email);

        let user = self
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        debug!("Login succeeded for account {}", user.id);
        self.session_for(user)
    }

    // Private helper methods

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        let path = format!("/rest/v1/users?email=eq.{}", urlencoding::encode(email));

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        match result.into_iter().next() {
            Some(row) => {
                let user: UserRecord = serde_json::from_value(row)
                    .map_err(|e| AuthError::Database(format!("Failed to parse user: {}", e)))?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    fn session_for(&self, user: UserRecord) -> Result<AuthResponse, AuthError> {
        let token = issue_token(
            &user.id.to_string(),
            &user.email,
            user.role.as_str(),
            &self.jwt_secret,
        )
        .map_err(AuthError::Token)?;

        Ok(AuthResponse {
            token,
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            role: user.role,
        })
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(password_hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hash(e.to_string())),
    }
}
