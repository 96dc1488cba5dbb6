use actix_web::HttpResponse;
use tera::Tera;

use crate::auth::SessionSigner;
use crate::db::DbPool;
use crate::error::KitchenError;

/// Shared application state, cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub templates: Tera,
    pub sessions: SessionSigner,
}

impl AppState {
    pub fn render(
        &self,
        template: &str,
        ctx: &tera::Context,
    ) -> Result<HttpResponse, KitchenError> {
        let body = self.templates.render(template, ctx)?;
        Ok(HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body))
    }
}
