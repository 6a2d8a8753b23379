use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// The caller's verified identity for the current request.
///
/// `Authenticator` inserts it into the request extensions after a successful check;
/// handlers receive it by taking `AuthContext` as an argument. It lives only as long
/// as the request and is never persisted.
///
/// On a route not wrapped by the authenticator the extractor rejects with 401
/// rather than letting the handler run without an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
}

impl FromRequest for AuthContext {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthContext>().copied() {
            Some(context) => ready(Ok(context)),
            None => {
                log::error!("no authenticated context on {}", req.path());
                ready(Err(AppError::Unauthorized(AuthError::MissingToken).into()))
            }
        }
    }
}
