use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;

use jobhub_db::{Database, NewUser};
use jobhub_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};
use jobhub_types::models::{Role, User};
use jobhub_types::validation::Validate;

use crate::error::ApiError;
use crate::extract::Json;
use crate::middleware::AuthUser;
use crate::state::{AppState, db_call};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    if !req.role.can_self_register() {
        return Err(ApiError::Forbidden("this role cannot be self-registered"));
    }

    let email = req.email.trim().to_lowercase();
    let taken = {
        let email = email.clone();
        db_call(&state, move |db| db.email_exists(&email)).await?
    };
    if taken {
        return Err(ApiError::Conflict("email is already registered".into()));
    }

    let password_hash = hash_password(&req.password)?;
    let user = db_call(&state, move |db| {
        db.create_user(&NewUser {
            email: &email,
            password_hash: &password_hash,
            first_name: req.first_name.trim(),
            last_name: req.last_name.trim(),
            role: req.role,
        })
    })
    .await
    .map_err(|e| e.on_conflict("email is already registered"))?;

    info!("Registered {} as {}", user.email, user.role);
    let token = create_token(&state.jwt_secret, state.token_ttl_hours, &user)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    req.validate()?;
    let email = req.email.trim().to_lowercase();
    let creds = db_call(&state, move |db| db.get_credentials_by_email(&email))
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&req.password, &creds.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }
    if !creds.user.is_active {
        return Err(ApiError::Forbidden("account is deactivated"));
    }

    let token = create_token(&state.jwt_secret, state.token_ttl_hours, &creds.user)?;
    Ok(Json(AuthResponse {
        token,
        user: creds.user,
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<User>, ApiError> {
    let user = db_call(&state, move |db| db.get_user(auth.id))
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(user))
}

/// Creates the configured admin account unless the email is already taken.
pub fn bootstrap_admin(db: &Database, email: &str, password: &str) -> anyhow::Result<bool> {
    let email = email.trim().to_lowercase();
    if db.email_exists(&email)? {
        return Ok(false);
    }
    let password_hash = hash_password(password).map_err(|_| anyhow::anyhow!("Failed to hash admin password"))?;
    db.create_user(&NewUser {
        email: &email,
        password_hash: &password_hash,
        first_name: "System",
        last_name: "Administrator",
        role: Role::Admin,
    })?;
    info!("Bootstrap admin {} created", email);
    Ok(true)
}

// Argon2id with a random salt
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash is malformed: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub fn create_token(secret: &str, ttl_hours: i64, user: &User) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp: (chrono::Utc::now() + chrono::Duration::hours(ttl_hours)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.into()))
}
