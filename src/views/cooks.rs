use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::auth::{self, AuthSession};
use crate::error::KitchenError;
use crate::forms::{CookRegistrationForm, CookUpdateForm, FormErrors};
use crate::models::{Cook, CookChangeset, Dish, DishType, NewCook};
use crate::pagination;
use crate::query;
use crate::routes::paths;
use crate::state::AppState;
use crate::views::dishes::DishRow;

#[derive(Serialize)]
struct CookRow {
    id: i64,
    username: String,
    full_name: String,
    years_of_experience: Option<i32>,
}

impl From<Cook> for CookRow {
    fn from(cook: Cook) -> Self {
        CookRow {
            id: cook.id,
            full_name: format!("{} {}", cook.first_name, cook.last_name)
                .trim()
                .to_owned(),
            username: cook.username,
            years_of_experience: cook.years_of_experience,
        }
    }
}

fn registration_ctx(form: &CookRegistrationForm, errors: &FormErrors) -> tera::Context {
    let mut ctx = tera::Context::new();
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    ctx
}

pub async fn register_form(state: web::Data<AppState>) -> Result<HttpResponse, KitchenError> {
    state.render(
        "register.html.tera",
        &registration_ctx(&CookRegistrationForm::default(), &FormErrors::default()),
    )
}

/// Creates the cook and logs the new account straight in.
pub async fn register(
    state: web::Data<AppState>,
    form: web::Form<CookRegistrationForm>,
) -> Result<HttpResponse, KitchenError> {
    let form = form.into_inner();
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            return state.render("register.html.tera", &registration_ctx(&form, &errors))
        }
    };

    let password_hash = auth::hash_password(&input.password);
    let pool = state.pool.clone();
    let created = web::block(move || -> Result<Cook, KitchenError> {
        let mut conn = pool.get()?;
        Ok(query::insert_cook(
            &mut conn,
            &NewCook {
                username: &input.username,
                first_name: &input.first_name,
                last_name: &input.last_name,
                email: &input.email,
                password_hash: &password_hash,
                years_of_experience: input.years_of_experience,
            },
        )?)
    })
    .await?;

    match created {
        Ok(cook) => Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, paths::HOME))
            .cookie(auth::session_cookie(state.sessions.issue(cook.id)))
            .finish()),
        Err(KitchenError::Database(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        ))) => {
            let mut errors = FormErrors::default();
            errors.add("username", "A cook with that username already exists.");
            state.render("register.html.tera", &registration_ctx(&form, &errors))
        }
        Err(err) => Err(err),
    }
}

pub async fn list(
    state: web::Data<AppState>,
    _session: AuthSession,
    params: web::Query<super::PageParams>,
) -> Result<HttpResponse, KitchenError> {
    let page = super::requested_page(&params.page);
    let pool = state.pool.clone();
    let page_data = web::block(move || -> Result<query::Paginated<Cook>, KitchenError> {
        let mut conn = pool.get()?;
        Ok(query::cooks_page(&mut conn, page)?)
    })
    .await??;

    let rows: Vec<CookRow> = page_data.rows.into_iter().map(CookRow::from).collect();
    let mut ctx = tera::Context::new();
    ctx.insert("cook_list", &rows);
    pagination::insert_page_context(
        &mut ctx,
        paths::COOK_LIST,
        page_data.page,
        page_data.num_pages,
        &[],
    );
    state.render("cook-list.html.tera", &ctx)
}

pub async fn detail(
    state: web::Data<AppState>,
    _session: AuthSession,
    path: web::Path<i64>,
) -> Result<HttpResponse, KitchenError> {
    let id = path.into_inner();
    let pool = state.pool.clone();
    let (cook, dishes) =
        web::block(move || -> Result<(Cook, Vec<(Dish, DishType)>), KitchenError> {
            let mut conn = pool.get()?;
            let cook = query::find_cook(&mut conn, id)?;
            let dishes = query::dishes_for_cook(&mut conn, id)?;
            Ok((cook, dishes))
        })
        .await??;

    let dish_rows: Vec<DishRow> = dishes
        .into_iter()
        .map(|(dish, dish_type)| DishRow::new(dish, dish_type))
        .collect();
    let mut ctx = tera::Context::new();
    ctx.insert("cook_detail", &cook);
    ctx.insert("dish_list", &dish_rows);
    state.render("cook-detail.html.tera", &ctx)
}

fn update_ctx(id: i64, form: &CookUpdateForm, errors: &FormErrors) -> tera::Context {
    let mut ctx = tera::Context::new();
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    ctx.insert("action", &paths::cook_update(id));
    ctx
}

pub async fn update_form(
    state: web::Data<AppState>,
    _session: AuthSession,
    path: web::Path<i64>,
) -> Result<HttpResponse, KitchenError> {
    let id = path.into_inner();
    let pool = state.pool.clone();
    let cook = web::block(move || -> Result<Cook, KitchenError> {
        let mut conn = pool.get()?;
        Ok(query::find_cook(&mut conn, id)?)
    })
    .await??;

    let form = CookUpdateForm::from_cook(&cook);
    state.render(
        "cook-form.html.tera",
        &update_ctx(id, &form, &FormErrors::default()),
    )
}

pub async fn update(
    state: web::Data<AppState>,
    _session: AuthSession,
    path: web::Path<i64>,
    form: web::Form<CookUpdateForm>,
) -> Result<HttpResponse, KitchenError> {
    let id = path.into_inner();
    let form = form.into_inner();
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return state.render("cook-form.html.tera", &update_ctx(id, &form, &errors)),
    };

    let pool = state.pool.clone();
    web::block(move || -> Result<(), KitchenError> {
        let mut conn = pool.get()?;
        Ok(query::update_cook(
            &mut conn,
            id,
            &CookChangeset {
                first_name: &input.first_name,
                last_name: &input.last_name,
                email: &input.email,
                years_of_experience: input.years_of_experience,
            },
        )?)
    })
    .await??;

    Ok(super::see_other(paths::COOK_LIST))
}
