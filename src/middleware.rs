//! Redirects already-authenticated users away from the login and
//! registration pages, straight back to the home page. Everything else
//! passes through untouched.

use std::future::{ready, Future, Ready};
use std::pin::Pin;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpResponse};

use crate::auth;
use crate::routes::paths;

pub struct RedirectAuthenticatedUsers;

impl<S, B> Transform<S, ServiceRequest> for RedirectAuthenticatedUsers
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RedirectAuthenticatedUsersService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RedirectAuthenticatedUsersService { service }))
    }
}

pub struct RedirectAuthenticatedUsersService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RedirectAuthenticatedUsersService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let anonymous_page = req.path() == paths::LOGIN || req.path() == paths::COOK_REGISTER;
        if anonymous_page && auth::session_from_request(req.request()).is_some() {
            let (req, _payload) = req.into_parts();
            let response = HttpResponse::Found()
                .insert_header((header::LOCATION, paths::HOME))
                .finish()
                .map_into_right_body();
            return Box::pin(async move { Ok(ServiceResponse::new(req, response)) });
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}
