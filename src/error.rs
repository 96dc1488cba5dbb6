use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::routes::paths;

#[derive(Debug, Error)]
pub enum KitchenError {
    #[error("could not check out a database connection: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),
    #[error("blocking task was cancelled")]
    Canceled,
    #[error("authentication required")]
    AuthRequired,
    #[error("no such record")]
    NotFound,
}

impl From<actix_web::error::BlockingError> for KitchenError {
    fn from(_: actix_web::error::BlockingError) -> Self {
        KitchenError::Canceled
    }
}

impl KitchenError {
    fn is_not_found(&self) -> bool {
        matches!(
            self,
            KitchenError::NotFound | KitchenError::Database(diesel::result::Error::NotFound)
        )
    }
}

impl ResponseError for KitchenError {
    fn status_code(&self) -> StatusCode {
        if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else if matches!(self, KitchenError::AuthRequired) {
            StatusCode::FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            KitchenError::AuthRequired => HttpResponse::Found()
                .insert_header((header::LOCATION, paths::LOGIN))
                .finish(),
            _ if self.is_not_found() => HttpResponse::NotFound().body("Not Found"),
            _ => {
                log::error!("request failed: {self}");
                HttpResponse::InternalServerError().body("Internal Server Error")
            }
        }
    }
}
