use actix_web::http::header;
use actix_web::{web, HttpResponse};

use crate::auth;
use crate::error::KitchenError;
use crate::forms::LoginForm;
use crate::models::Cook;
use crate::query;
use crate::routes::paths;
use crate::state::AppState;

fn login_ctx(form: &LoginForm, error: Option<&str>) -> tera::Context {
    let mut ctx = tera::Context::new();
    ctx.insert("form", form);
    ctx.insert("login_error", &error);
    ctx
}

pub async fn login_form(state: web::Data<AppState>) -> Result<HttpResponse, KitchenError> {
    state.render("login.html.tera", &login_ctx(&LoginForm::default(), None))
}

pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, KitchenError> {
    let form = form.into_inner();
    let username = form.username.trim().to_owned();
    let pool = state.pool.clone();
    let cook = web::block(move || -> Result<Option<Cook>, KitchenError> {
        let mut conn = pool.get()?;
        Ok(query::find_cook_by_username(&mut conn, &username)?)
    })
    .await??;

    // One shared failure path for unknown usernames and wrong passwords.
    let authenticated =
        cook.filter(|cook| auth::verify_password(&form.password, &cook.password_hash));
    match authenticated {
        Some(cook) => Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, paths::HOME))
            .cookie(auth::session_cookie(state.sessions.issue(cook.id)))
            .finish()),
        None => state.render(
            "login.html.tera",
            &login_ctx(
                &form,
                Some("Please enter a correct username and password."),
            ),
        ),
    }
}

pub async fn logout() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, paths::LOGIN))
        .cookie(auth::removal_cookie())
        .finish()
}
