/// HTTP middleware utilities for conference-service
///
/// Bearer-token auth: `JwtAuthMiddleware` guards owner-only scopes and
/// inserts [`UserId`]; [`MaybeUser`] is for routes that work with or without
/// a session (recording actions fall back to the room owner, join tokens
/// can be issued to guests).
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{error::ErrorUnauthorized, web, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use std::rc::Rc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserId(pub Uuid);

/// Authenticated user when present; `None` for anonymous callers.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Uuid>);

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
    #[allow(dead_code)]
    exp: i64,
}

/// Session-token verification state, shared via app data.
#[derive(Clone)]
pub struct AuthContext {
    decoding: DecodingKey,
    validation: Validation,
}

impl AuthContext {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    fn verify(&self, token: &str) -> Option<Uuid> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation).ok()?;
        Uuid::parse_str(&data.claims.sub).ok()
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn user_from_request(req: &HttpRequest) -> Option<Uuid> {
    let auth = req.app_data::<web::Data<AuthContext>>()?;
    auth.verify(bearer_token(req)?)
}

pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let user_id = user_from_request(req.request())
                .ok_or_else(|| ErrorUnauthorized("Invalid or missing session token"))?;

            req.extensions_mut().insert(UserId(user_id));

            service.call(req).await
        })
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<UserId>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("User ID missing")),
        )
    }
}

impl FromRequest for MaybeUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let from_scope = req.extensions().get::<UserId>().map(|u| u.0);
        ready(Ok(MaybeUser(from_scope.or_else(|| user_from_request(req)))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        exp: i64,
    }

    fn sign(secret: &str, sub: &str, exp_offset: i64) -> String {
        let claims = TestClaims {
            sub: sub.to_string(),
            exp: Utc::now().timestamp() + exp_offset,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_accepts_valid_token() {
        let user = Uuid::new_v4();
        let auth = AuthContext::new("secret");
        let token = sign("secret", &user.to_string(), 3600);
        assert_eq!(auth.verify(&token), Some(user));
    }

    #[test]
    fn test_verify_rejects_bad_signature_and_expiry() {
        let user = Uuid::new_v4();
        let auth = AuthContext::new("secret");

        let wrong_key = sign("other-secret", &user.to_string(), 3600);
        assert_eq!(auth.verify(&wrong_key), None);

        let expired = sign("secret", &user.to_string(), -3600);
        assert_eq!(auth.verify(&expired), None);

        let bad_sub = sign("secret", "not-a-uuid", 3600);
        assert_eq!(auth.verify(&bad_sub), None);
    }
}
