//! Role-based access control for the `/v1` API.
//!
//! Callers present `Authorization: Bearer <jwt>` (HS256). The token's `role`
//! claim selects a fixed set of rights; the right a request needs is derived
//! from its method and the entity collection it addresses.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::{config::AuthConfig, state::AppState, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    GetClinics,
    ManageClinics,
    GetDoctors,
    ManageDoctors,
    GetHealthServices,
    ManageHealthServices,
}

const USER_RIGHTS: &[Permission] = &[
    Permission::GetClinics,
    Permission::GetDoctors,
    Permission::GetHealthServices,
];

const ADMIN_RIGHTS: &[Permission] = &[
    Permission::GetClinics,
    Permission::GetDoctors,
    Permission::GetHealthServices,
    Permission::ManageClinics,
    Permission::ManageDoctors,
    Permission::ManageHealthServices,
];

pub fn role_rights(role: Role) -> &'static [Permission] {
    match role {
        Role::User => USER_RIGHTS,
        Role::Admin => ADMIN_RIGHTS,
    }
}

impl Role {
    pub fn allows(&self, permission: Permission) -> bool {
        role_rights(*self).contains(&permission)
    }
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetClinics => "getClinics",
            Self::ManageClinics => "manageClinics",
            Self::GetDoctors => "getDoctors",
            Self::ManageDoctors => "manageDoctors",
            Self::GetHealthServices => "getHealthServices",
            Self::ManageHealthServices => "manageHealthServices",
        }
    }

    /// Permission required for a request, or `None` if the path is not an
    /// entity collection. Accepts paths with or without the `/v1` prefix.
    pub fn for_request(method: &Method, path: &str) -> Option<Self> {
        let path = path.strip_prefix("/v1").unwrap_or(path);
        let segment = path.trim_start_matches('/').split('/').next()?;
        let read = *method == Method::GET || *method == Method::HEAD;

        match (segment, read) {
            ("clinics", true) => Some(Self::GetClinics),
            ("clinics", false) => Some(Self::ManageClinics),
            ("doctors", true) => Some(Self::GetDoctors),
            ("doctors", false) => Some(Self::ManageDoctors),
            ("healthServices", true) => Some(Self::GetHealthServices),
            ("healthServices", false) => Some(Self::ManageHealthServices),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    iat: usize,
    exp: usize,
}

/// The authenticated caller, attached to request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub role: Role,
}

pub struct AuthManager {
    enabled: bool,
    secret: Vec<u8>,
    token_ttl_seconds: u64,
    public_paths: Vec<String>,
}

impl AuthManager {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = match &config.jwt_secret {
            Some(s) if !s.is_empty() => s.as_bytes().to_vec(),
            _ => {
                if config.enabled {
                    tracing::warn!(
                        "Auth enabled but `auth.jwt_secret` is not set; using ephemeral secret (tokens reset on restart)"
                    );
                }
                format!("{}{}", Uuid::new_v4(), Uuid::new_v4()).into_bytes()
            }
        };

        Self {
            enabled: config.enabled,
            secret,
            token_ttl_seconds: config.token_ttl_seconds,
            public_paths: config.public_paths.clone(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| p == path)
    }

    /// Sign an access token for `subject` with the configured lifetime.
    pub fn issue_token(&self, subject: &str, role: Role) -> Result<String> {
        let now = now_epoch_seconds();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now,
            exp: now.saturating_add(self.token_ttl_seconds as usize),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| Error::Internal(format!("Failed to sign token: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<Principal> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                Error::Unauthorized("Please authenticate".to_string())
            })?;

        Ok(Principal {
            subject: data.claims.sub,
            role: data.claims.role,
        })
    }

    /// Resolve the caller from request headers. With auth disabled every caller
    /// is an anonymous admin.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Principal> {
        if !self.enabled {
            return Ok(Principal {
                subject: "anonymous".to_string(),
                role: Role::Admin,
            });
        }

        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|authz| {
                authz
                    .strip_prefix("Bearer ")
                    .or_else(|| authz.strip_prefix("bearer "))
            })
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Unauthorized("Please authenticate".to_string()))?;

        self.verify(token)
    }
}

/// Authentication and permission check for `/v1/*`.
pub async fn authorize(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if req.method() == Method::OPTIONS || state.auth.is_public(&path) {
        return next.run(req).await;
    }

    let principal = match state.auth.authenticate(req.headers()) {
        Ok(principal) => principal,
        Err(e) => return e.into_response(),
    };

    if let Some(permission) = Permission::for_request(req.method(), &path) {
        if !principal.role.allows(permission) {
            tracing::debug!(
                subject = %principal.subject,
                permission = permission.as_str(),
                "Permission denied"
            );
            return Error::Forbidden("Forbidden".to_string()).into_response();
        }
    }

    req.extensions_mut().insert(principal);
    next.run(req).await
}

fn now_epoch_seconds() -> usize {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as usize
}
