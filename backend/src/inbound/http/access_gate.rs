//! Access gate: credential verification and role checks in front of handlers.
//!
//! [`AccessGate`] wraps individual routes with the [`AccessRequirement`] the
//! route policy assigns to them. A request that does not meet the requirement
//! is answered here (401 or 403) and never reaches the handler. Admitted
//! requests carry their [`Identity`] (and, after a role check, their
//! [`Actor`]) in the request extensions, where the extractors below pick it
//! up.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{FromRequest, HttpMessage, HttpRequest, ResponseError, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, warn};

use crate::domain::{AccessRequirement, Actor, Error, Identity, Operation, RoutePolicy};

use super::session::presented_token;
use super::state::HttpState;

/// Message returned with every 401 issued by the gate.
pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized access";
/// Message returned when an authenticated caller lacks the required role.
pub const FORBIDDEN_MESSAGE: &str = "forbidden access";

/// Route middleware enforcing one access requirement.
///
/// # Examples
/// ```
/// use actix_web::{HttpResponse, web};
/// use realscape::domain::{Operation, RoutePolicy};
/// use realscape::inbound::http::access_gate::AccessGate;
///
/// let policy = RoutePolicy::default();
/// let _route = web::get()
///     .to(|| async { HttpResponse::Ok().finish() })
///     .wrap(AccessGate::for_operation(&policy, Operation::ListUsers));
/// ```
#[derive(Clone, Debug)]
pub struct AccessGate {
    requirement: Rc<AccessRequirement>,
}

impl AccessGate {
    pub fn new(requirement: AccessRequirement) -> Self {
        Self {
            requirement: Rc::new(requirement),
        }
    }

    pub fn for_operation(policy: &RoutePolicy, operation: Operation) -> Self {
        Self::new(policy.requirement(operation).clone())
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = AccessGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGateMiddleware {
            service: Rc::new(service),
            requirement: Rc::clone(&self.requirement),
        }))
    }
}

/// Service wrapper produced by [`AccessGate`].
pub struct AccessGateMiddleware<S> {
    service: Rc<S>,
    requirement: Rc<AccessRequirement>,
}

impl<S, B> Service<ServiceRequest> for AccessGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let requirement = Rc::clone(&self.requirement);
        Box::pin(async move {
            match admit(&req, &requirement).await {
                Ok(()) => service
                    .call(req)
                    .await
                    .map(ServiceResponse::map_into_left_body),
                Err(error) => {
                    let response = error.error_response().map_into_right_body();
                    let (request, _payload) = req.into_parts();
                    Ok(ServiceResponse::new(request, response))
                }
            }
        })
    }
}

async fn admit(req: &ServiceRequest, requirement: &AccessRequirement) -> Result<(), Error> {
    let state = req.app_data::<web::Data<HttpState>>().ok_or_else(|| {
        warn!("access gate mounted without HttpState");
        Error::internal("http state is not configured")
    })?;

    let token = presented_token(req.request());
    let identity = match state.credentials.verify(token.as_deref()) {
        Ok(identity) => identity,
        Err(reason) if requirement.requires_credential() => {
            debug!(%reason, path = req.path(), "credential refused");
            return Err(Error::unauthorized(UNAUTHORIZED_MESSAGE));
        }
        // Public routes proceed anonymously; a bad credential is ignored.
        Err(_) => return Ok(()),
    };

    if requirement.requires_role() {
        let actor = resolve_actor(state, &identity).await?;
        if !requirement.permits(&actor) {
            debug!(
                email = %actor.email(),
                role = %actor.role(),
                %requirement,
                "role check failed"
            );
            return Err(Error::forbidden(FORBIDDEN_MESSAGE));
        }
        req.extensions_mut().insert(actor);
    }
    req.extensions_mut().insert(identity);
    Ok(())
}

/// Look up the caller's current role and status.
///
/// A valid credential for an email that was never registered (or has since
/// been removed) yields an actor with no privileges.
async fn resolve_actor(state: &HttpState, identity: &Identity) -> Result<Actor, Error> {
    let user = state.users.find_user(identity.email()).await?;
    Ok(user.as_ref().map_or_else(
        || Actor::unregistered(identity.email().clone()),
        Actor::from_user,
    ))
}

/// Identity of a caller admitted by the gate.
///
/// Extraction fails with 401 when the route was reached without a verified
/// credential.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Identity>()
                .cloned()
                .map(Authenticated)
                .ok_or_else(|| Error::unauthorized(UNAUTHORIZED_MESSAGE)),
        )
    }
}

/// Identity if the caller presented a valid credential on a public route.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticated(pub Option<Identity>);

impl FromRequest for MaybeAuthenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self(req.extensions().get::<Identity>().cloned())))
    }
}

/// Authenticated caller with their current role and status.
///
/// Reuses the actor resolved by the gate's role check when there was one.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl FromRequest for CurrentActor {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if let Some(actor) = req.extensions().get::<Actor>().cloned() {
            return Box::pin(ready(Ok(Self(actor))));
        }
        let identity = req.extensions().get::<Identity>().cloned();
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let identity = identity.ok_or_else(|| Error::unauthorized(UNAUTHORIZED_MESSAGE))?;
            let state = state.ok_or_else(|| Error::internal("http state is not configured"))?;
            resolve_actor(&state, &identity).await.map(Self)
        })
    }
}

#[cfg(test)]
#[path = "access_gate_tests.rs"]
mod tests;
