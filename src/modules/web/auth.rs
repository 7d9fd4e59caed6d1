use crate::config::{AdminConfig, Config};
use crate::error::AppError;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an admin token. There is no expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: i64,
}

/// Compare a login against the configured admin credentials.
pub fn credentials_match(admin: &AdminConfig, email: &str, password: &str) -> bool {
    !admin.email.is_empty()
        && !admin.password.is_empty()
        && email == admin.email
        && password == admin.password
}

/// Sign an admin token for `email`.
pub fn issue_token(admin: &AdminConfig, email: &str) -> Result<String, AppError> {
    let claims = Claims {
        email: email.to_string(),
        iat: chrono::Utc::now().timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(admin.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))
}

/// Check a token's signature and that it names the configured admin.
pub fn verify_token(admin: &AdminConfig, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    validation.validate_exp = false;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(admin.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        log::debug!("Rejected admin token: {}", e);
        AppError::Unauthorized("Invalid token".to_string())
    })?;

    if data.claims.email != admin.email {
        return Err(AppError::Unauthorized("Invalid token".to_string()));
    }
    Ok(data.claims)
}

/// Token from `Authorization`, with or without a `Bearer` scheme. The scheme
/// name is case-insensitive.
fn get_admin_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// An authenticated admin. Taking this as a handler argument guards the route.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub email: String,
}

impl FromRequest for AdminSession {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<Config>>() {
            Some(config) => match get_admin_token(req) {
                Some(token) => verify_token(&config.admin, &token).map(|claims| AdminSession {
                    email: claims.email,
                }),
                None => Err(AppError::Unauthorized(
                    "Not authorized, login again".to_string(),
                )),
            },
            None => Err(AppError::Internal("configuration missing".to_string())),
        };
        ready(result)
    }
}
