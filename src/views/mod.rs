use actix_web::http::header;
use actix_web::HttpResponse;
use serde::Deserialize;

pub mod accounts;
pub mod cooks;
pub mod dishes;
pub mod home;
pub mod ingredients;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<String>,
}

/// Unparseable page numbers fall back to the first page.
pub(crate) fn requested_page(raw: &Option<String>) -> i64 {
    raw.as_deref()
        .and_then(|value| value.parse().ok())
        .unwrap_or(1)
}

pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
