use actix_web::{web, HttpResponse};

use crate::auth::AuthSession;
use crate::error::KitchenError;
use crate::query;
use crate::state::AppState;

/// The home page: live record counts, recomputed on every request.
pub async fn index(
    state: web::Data<AppState>,
    _session: AuthSession,
) -> Result<HttpResponse, KitchenError> {
    let pool = state.pool.clone();
    let counts = web::block(move || -> Result<query::HomeCounts, KitchenError> {
        let mut conn = pool.get()?;
        Ok(query::home_counts(&mut conn)?)
    })
    .await??;

    let mut ctx = tera::Context::new();
    ctx.insert("num_dishes", &counts.dishes);
    ctx.insert("num_cooks", &counts.cooks);
    ctx.insert("num_ingredients", &counts.ingredients);
    state.render("index.html.tera", &ctx)
}
