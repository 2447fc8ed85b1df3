pub mod claims;
pub mod jwt;
pub mod middleware;

use actix_web::http::{StatusCode, header::HeaderMap};
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError, dev::Payload, web::Data,
};
use derive_more::Display;
use futures::future::{Ready, ready};
use serde_json::json;

use crate::config::Config;
pub use claims::{Claims, Role, TokenType};

/// HR or Admin user behind an admin request.
#[derive(Debug, Clone)]
pub struct StaffUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

/// Why a request was refused at the admin gate.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[display(fmt = "Missing Authorization header")]
    MissingHeader,
    #[display(fmt = "Authorization header must start with Bearer")]
    NotBearer,
    #[display(fmt = "Invalid or expired token")]
    InvalidToken,
    #[display(fmt = "Access token required")]
    NotAccessToken,
    #[display(fmt = "Invalid role")]
    UnknownRole,
    #[display(fmt = "HR/Admin only")]
    NotStaff,
}

impl std::error::Error for Rejection {}

impl ResponseError for Rejection {
    fn status_code(&self) -> StatusCode {
        match self {
            Rejection::NotStaff => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}

/// Checks the bearer token in `headers`: HS256-valid, an access token, and a staff role.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<StaffUser, Rejection> {
    let header = headers
        .get("Authorization")
        .ok_or(Rejection::MissingHeader)?
        .to_str()
        .map_err(|_| Rejection::NotBearer)?;
    let token = header.strip_prefix("Bearer ").ok_or(Rejection::NotBearer)?;

    let claims = jwt::verify_token(token, secret).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        Rejection::InvalidToken
    })?;
    if claims.token_type != TokenType::Access {
        return Err(Rejection::NotAccessToken);
    }

    let role = Role::try_from(claims.role).map_err(|_| Rejection::UnknownRole)?;
    if !role.is_staff() {
        return Err(Rejection::NotStaff);
    }

    Ok(StaffUser { user_id: claims.user_id, username: claims.sub, role })
}

impl FromRequest for StaffUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    /// Uses the user the middleware stored; re-checks the header otherwise.
    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if let Some(user) = req.extensions().get::<StaffUser>() {
            return ready(Ok(user.clone()));
        }

        let Some(config) = req.app_data::<Data<Config>>() else {
            return ready(Err(actix_web::error::ErrorInternalServerError("Config missing")));
        };
        ready(authenticate(req.headers(), &config.jwt_secret).map_err(Into::into))
    }
}
