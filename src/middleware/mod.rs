/// Authentication and role-authorization middleware
///
/// `RequireAuth` validates the Bearer token on every request it wraps and,
/// when constructed with an allowed-role set, additionally requires the
/// caller's role to be a member of that set. Authentication always runs
/// before the role test; the role test is plain set membership - an admin
/// token does not pass an organizer-only route.
use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderMap};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::user::Role;
use crate::security::jwt;

/// The resolved identity attached to an authenticated request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

/// Resolve a principal from the Authorization header
pub fn principal_from_headers(headers: &HeaderMap) -> Result<Principal, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::Unauthenticated("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthenticated("Invalid Authorization scheme".to_string()))?;

    let claims = jwt::verify_token(token)?;
    let id = Uuid::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthenticated("Invalid token subject".to_string()))?;

    Ok(Principal {
        id,
        role: claims.role,
    })
}

pub struct RequireAuth {
    allowed: Rc<Vec<Role>>,
}

impl RequireAuth {
    /// Any authenticated role passes
    pub fn any() -> Self {
        Self {
            allowed: Rc::new(Vec::new()),
        }
    }

    /// Only the listed roles pass
    pub fn roles(allowed: &[Role]) -> Self {
        Self {
            allowed: Rc::new(allowed.to_vec()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthService {
            service: Rc::new(service),
            allowed: self.allowed.clone(),
        }))
    }
}

pub struct RequireAuthService<S> {
    service: Rc<S>,
    allowed: Rc<Vec<Role>>,
}

impl<S, B> Service<ServiceRequest> for RequireAuthService<S>
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
        let allowed = self.allowed.clone();

        Box::pin(async move {
            let principal = principal_from_headers(req.headers())?;

            if !allowed.is_empty() && !allowed.contains(&principal.role) {
                return Err(ApiError::Forbidden(
                    "You do not have permission to perform this action".to_string(),
                )
                .into());
            }

            req.extensions_mut().insert(principal);

            service.call(req).await
        })
    }
}

impl FromRequest for Principal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Principal>()
                .copied()
                .ok_or_else(|| {
                    ApiError::Unauthenticated("Authentication required".to_string()).into()
                }),
        )
    }
}

/// Extractor for public routes whose response differs when a valid token
/// happens to be present (e.g. the event detail page). Never fails: a
/// missing or invalid token yields `None`.
#[derive(Debug, Clone, Copy)]
pub struct MaybePrincipal(pub Option<Principal>);

impl FromRequest for MaybePrincipal {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let principal = req
            .extensions()
            .get::<Principal>()
            .copied()
            .or_else(|| principal_from_headers(req.headers()).ok());

        ready(Ok(MaybePrincipal(principal)))
    }
}
