use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::error;

use super::gateway::{AuthError, AuthGateway, UserId};

/// Caller identity resolved from the request's bearer credential
///
/// The credential is taken from the `Authorization` header of each request and
/// resolved through the [`AuthGateway`] registered as app data.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserId);

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(AuthenticatedUser))
    }
}

fn authenticate(req: &HttpRequest) -> Result<UserId, actix_web::Error> {
    let gateway = req.app_data::<web::Data<dyn AuthGateway>>().ok_or_else(|| {
        error!("No AuthGateway registered in app data");
        actix_web::error::ErrorInternalServerError("Authentication is not configured")
    })?;

    let token = bearer_token(req)?;
    Ok(gateway.resolve_token(token)?)
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredentials)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedCredentials)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MalformedCredentials);
    }

    Ok(token)
}
