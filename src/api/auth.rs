//! Authentication, sessions, and role checks.
//!
//! Login establishes a server-side session row and hands the raw token to the
//! browser in an `HttpOnly`, `SameSite=Lax` cookie; only the SHA-256 hash of
//! the token is stored. `require_auth` resolves the cookie once per request
//! and caches the principal in the request extensions, where handlers read it
//! back through the [`CurrentUser`] extractor.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use super::error::ApiError;
use super::validation::{validate_password, validate_role, validate_username};
use crate::db::{DbPool, LoginRequest, MessageResponse, RegisterRequest, User, UserResponse};
use crate::AppState;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// The identity bound to an authenticated request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub username: String,
    pub role: String,
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Generate a random session token
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create a session row for the user and return the raw token.
///
/// Expired sessions are swept on the way in, keeping the table bounded.
pub async fn establish_session(
    pool: &DbPool,
    user_id: i64,
    ttl_hours: i64,
) -> sqlx::Result<String> {
    let now = Utc::now();

    sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now.to_rfc3339())
        .execute(pool)
        .await?;

    let token = generate_token();
    let expires_at = (now + Duration::hours(ttl_hours)).to_rfc3339();

    sqlx::query("INSERT INTO sessions (id, user_id, token_hash, expires_at) VALUES (?, ?, ?, ?)")
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(hash_token(&token))
        .bind(&expires_at)
        .execute(pool)
        .await?;

    Ok(token)
}

/// Resolve a session token to the principal it is bound to.
///
/// Returns `None` for unknown or expired tokens. This is the only place a
/// request's identity is looked up; callers cache the result for the rest of
/// the request.
pub async fn resolve_session(pool: &DbPool, token: &str) -> sqlx::Result<Option<Principal>> {
    let row: Option<(i64, String, String)> = sqlx::query_as(
        "SELECT u.id, u.username, u.role
         FROM sessions s
         JOIN users u ON u.id = s.user_id
         WHERE s.token_hash = ? AND s.expires_at > ?",
    )
    .bind(hash_token(token))
    .bind(Utc::now().to_rfc3339())
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(user_id, username, role)| Principal {
        user_id,
        username,
        role,
    }))
}

/// Destroy the session bound to the token, if any.
pub async fn destroy_session(pool: &DbPool, token: &str) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
        .bind(hash_token(token))
        .execute(pool)
        .await?;
    Ok(())
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Register a new account
///
/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    validate_username(&req.username).map_err(ApiError::validation)?;
    validate_password(&req.password).map_err(ApiError::validation)?;
    validate_role(&req.role).map_err(ApiError::validation)?;

    // Lookup-before-insert; the UNIQUE constraint on username backstops the
    // race where two registrations for the same name interleave.
    if User::find_by_username(&state.db, &req.username)
        .await?
        .is_some()
    {
        return Err(ApiError::bad_request("Username already exists"));
    }

    let password_hash = hash_password(&req.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

    User::create(&state.db, &req.username, &password_hash, &req.role).await?;

    tracing::info!(username = %req.username, role = %req.role, "Registered user");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Log in and establish a session
///
/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    // Unknown user and wrong password are indistinguishable to the caller.
    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = establish_session(&state.db, user.id, state.config.auth.session_ttl_hours).await?;

    tracing::info!(username = %user.username, "Logged in");

    Ok((
        jar.add(session_cookie(token)),
        Json(LoginResponse {
            message: "Logged in".to_string(),
            role: user.role,
        }),
    ))
}

/// Destroy the current session
///
/// POST /logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        destroy_session(&state.db, cookie.value()).await?;
    }

    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");

    Ok((jar.remove(removal), Json(MessageResponse::new("Logged out"))))
}

/// Identity of the logged-in user
///
/// GET /profile
pub async fn profile(CurrentUser(principal): CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        username: principal.username,
        role: principal.role,
    })
}

/// Exemplar admin-gated endpoint
///
/// GET /admin-only
pub async fn admin_only(CurrentUser(principal): CurrentUser) -> Json<MessageResponse> {
    Json(MessageResponse::new(format!(
        "Welcome, {}",
        principal.username
    )))
}

/// List all registered accounts (administrators only)
///
/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users: Vec<User> = sqlx::query_as("SELECT * FROM users ORDER BY id")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Middleware requiring a valid session.
///
/// Resolves the session cookie to a [`Principal`] and stores it in the
/// request extensions for downstream handlers and role checks.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let principal = resolve_session(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Middleware requiring the authenticated principal's role to be in `allowed`.
///
/// Must run after [`require_auth`]: identity is checked before role.
pub async fn require_role(
    allowed: &'static [&'static str],
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !allowed.contains(&principal.role.as_str()) {
        return Err(ApiError::forbidden("Access denied"));
    }

    Ok(next.run(request).await)
}

/// Extractor for the current authenticated principal.
///
/// Reads the principal cached by [`require_auth`]; on routes without that
/// middleware it falls back to resolving the session cookie itself.
pub struct CurrentUser(pub Principal);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(CurrentUser(principal.clone()));
        }

        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        resolve_session(&state.db, &token)
            .await?
            .map(CurrentUser)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
