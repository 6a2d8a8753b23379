use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthContext;
use crate::auth::token::TokenCodec;
use crate::error::{AppError, AuthError};
use crate::store::UserStore;

/// Gate for protected scopes.
///
/// For every request it:
/// 1. takes the bearer token from the `Authorization` header (`MissingToken` if absent),
/// 2. verifies it with the [`TokenCodec`] (`InvalidToken`),
/// 3. looks the subject up in the user store (`UnknownIdentity` if the account is gone),
/// 4. stores an [`AuthContext`] in the request extensions and calls the inner service.
///
/// Rejections are answered directly with a 401 and the inner service is never
/// called. A store failure during the lookup answers 500.
#[derive(Clone)]
pub struct Authenticator {
    tokens: Arc<TokenCodec>,
    users: Arc<dyn UserStore>,
}

impl Authenticator {
    pub fn new(tokens: Arc<TokenCodec>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    /// Resolves the value of an `Authorization` header into an authenticated context.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<AuthContext, AppError> {
        let token = bearer_token(authorization)?;
        let user_id = self.tokens.verify(token)?;

        match self.users.find_user(user_id).await? {
            Some(user) => Ok(AuthContext { user_id: user.id }),
            None => {
                log::debug!("token subject {} no longer exists", user_id);
                Err(AuthError::UnknownIdentity.into())
            }
        }
    }
}

/// Extracts the token from a `Bearer <token>` header value.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    authorization
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

impl<S, B> Transform<S, ServiceRequest> for Authenticator
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthenticatorMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthenticatorMiddleware {
            service: Rc::new(service),
            gate: self.clone(),
        }))
    }
}

pub struct AuthenticatorMiddleware<S> {
    service: Rc<S>,
    gate: Authenticator,
}

impl<S, B> Service<ServiceRequest> for AuthenticatorMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let gate = self.gate.clone();

        Box::pin(async move {
            let started = Instant::now();
            let authorization = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            match gate.authenticate(authorization.as_deref()).await {
                Ok(context) => {
                    log::info!(
                        "user {} authenticated for {} {} in {:.2}ms",
                        context.user_id,
                        req.method(),
                        req.path(),
                        started.elapsed().as_secs_f64() * 1000.0
                    );
                    req.extensions_mut().insert(context);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    log::debug!(
                        "rejected {} {}: {}",
                        req.method(),
                        req.path(),
                        err
                    );
                    Ok(req.error_response(err).map_into_right_body())
                }
            }
        })
    }
}
