//! JWT authentication middleware
//!
//! Verifies bearer tokens and turns their claims into a [`booking::Actor`]
//! plus an [`booking::ActorProfile`] for handlers downstream. Token
//! verification decides only *who* the caller is; whether they may perform
//! an operation is decided by the grants evaluator in the booking layer.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use booking::{Actor, ActorProfile};

use crate::AppState;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the actor id as a decimal string
    pub sub: String,
    /// Expiration time (as UTC timestamp)
    pub exp: usize,
    /// Issued at (as UTC timestamp)
    pub iat: Option<usize>,
    /// Role names fed to the grants evaluator
    #[serde(default)]
    pub roles: Vec<String>,
    /// Login handle, used to keep the stored profile current
    pub handle: Option<String>,
    /// Human-facing display name
    pub name: Option<String>,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
}

impl JwtConfig {
    /// Create JWT config from environment variables
    pub fn from_env() -> Self {
        let secret = std::env::var("ROOST_JWT_SECRET")
            .expect("ROOST_JWT_SECRET environment variable must be set");

        let algorithm = std::env::var("ROOST_JWT_ALGORITHM")
            .unwrap_or_else(|_| "HS256".to_string())
            .parse::<Algorithm>()
            .unwrap_or(Algorithm::HS256);

        Self { secret, algorithm }
    }

    /// Create JWT config with explicit values (for testing)
    pub fn new(secret: String, algorithm: Algorithm) -> Self {
        Self { secret, algorithm }
    }
}

/// Extension type for the authenticated caller
#[derive(Debug, Clone)]
pub struct AuthActor {
    pub actor: Actor,
    pub profile: ActorProfile,
}

impl AuthActor {
    fn from_claims(claims: Claims) -> Option<Self> {
        let id: i64 = claims.sub.parse().ok()?;
        let handle = claims
            .handle
            .unwrap_or_else(|| format!("actor-{id}"));
        let display_name = claims.name.unwrap_or_else(|| handle.clone());
        Some(Self {
            actor: Actor::new(id, claims.roles),
            profile: ActorProfile {
                id,
                handle,
                display_name,
            },
        })
    }
}

/// JWT authentication middleware
pub async fn jwt_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok());

    let token = match extract_bearer_token(auth_header) {
        Some(token) => token,
        None => {
            warn!("Missing or malformed Authorization header");
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    match verify_jwt(token, &state.jwt) {
        Ok(claims) => match AuthActor::from_claims(claims) {
            Some(auth) => {
                debug!("JWT verified for actor {}", auth.actor.id);
                request.extensions_mut().insert(auth);
                next.run(request).await
            }
            None => {
                warn!("JWT subject is not a valid actor id");
                unauthorized_response("Invalid token subject")
            }
        },
        Err(e) => {
            warn!("JWT verification failed: {}", e);
            unauthorized_response("Invalid or expired token")
        }
    }
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(auth_header: Option<&str>) -> Option<&str> {
    auth_header?.strip_prefix("Bearer ")
}

/// Verify JWT token and extract claims
fn verify_jwt(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(config.algorithm);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": message
        })),
    )
        .into_response()
}
