use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::AuthSession;
use crate::error::KitchenError;
use crate::forms::{format_price, DishForm, FormErrors};
use crate::models::{Cook, Dish, DishType, Ingredient};
use crate::pagination;
use crate::query::{self, DishOrdering};
use crate::routes::paths;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DishListParams {
    #[serde(default)]
    ordering: Option<String>,
    #[serde(default)]
    page: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct DishRow {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub dish_type: String,
}

impl DishRow {
    pub(crate) fn new(dish: Dish, dish_type: DishType) -> Self {
        DishRow {
            id: dish.id,
            name: dish.name,
            price: format_price(dish.price_cents),
            dish_type: dish_type.name,
        }
    }
}

pub async fn list(
    state: web::Data<AppState>,
    _session: AuthSession,
    params: web::Query<DishListParams>,
) -> Result<HttpResponse, KitchenError> {
    let page = super::requested_page(&params.page);
    let ordering = DishOrdering::from_param(params.ordering.as_deref());

    let pool = state.pool.clone();
    let page_data =
        web::block(move || -> Result<query::Paginated<(Dish, DishType)>, KitchenError> {
            let mut conn = pool.get()?;
            Ok(query::dishes_page(&mut conn, ordering, page)?)
        })
        .await??;

    let rows: Vec<DishRow> = page_data
        .rows
        .into_iter()
        .map(|(dish, dish_type)| DishRow::new(dish, dish_type))
        .collect();

    let mut ctx = tera::Context::new();
    ctx.insert("dish_list", &rows);
    // Feeds the ordering select, pre-populated with the active choice.
    ctx.insert("ordering", ordering.as_param());
    let extra: Vec<(&str, &str)> = match ordering {
        DishOrdering::Default => Vec::new(),
        _ => vec![("ordering", ordering.as_param())],
    };
    pagination::insert_page_context(
        &mut ctx,
        paths::DISH_LIST,
        page_data.page,
        page_data.num_pages,
        &extra,
    );
    state.render("dish-list.html.tera", &ctx)
}

#[derive(Serialize)]
struct DishView {
    id: i64,
    name: String,
    description: String,
    price: String,
    dish_type: String,
}

pub async fn detail(
    state: web::Data<AppState>,
    _session: AuthSession,
    path: web::Path<i64>,
) -> Result<HttpResponse, KitchenError> {
    let id = path.into_inner();
    let pool = state.pool.clone();
    let detail = web::block(move || -> Result<query::DishDetail, KitchenError> {
        let mut conn = pool.get()?;
        Ok(query::find_dish_detail(&mut conn, id)?)
    })
    .await??;

    let mut ctx = tera::Context::new();
    ctx.insert(
        "dish",
        &DishView {
            id: detail.dish.id,
            name: detail.dish.name,
            description: detail.dish.description,
            price: format_price(detail.dish.price_cents),
            dish_type: detail.dish_type.name,
        },
    );
    ctx.insert("ingredients", &detail.ingredients);
    ctx.insert("cooks", &detail.cooks);
    state.render("dish-detail.html.tera", &ctx)
}

type FormData = (Vec<DishType>, Vec<Ingredient>, Vec<Cook>);

async fn load_form_data(state: &AppState) -> Result<FormData, KitchenError> {
    let pool = state.pool.clone();
    web::block(move || -> Result<FormData, KitchenError> {
        let mut conn = pool.get()?;
        let dish_types = query::dish_types_all(&mut conn)?;
        let ingredients = query::ingredients_all(&mut conn)?;
        let cooks = query::cooks_all(&mut conn)?;
        Ok((dish_types, ingredients, cooks))
    })
    .await?
}

fn form_ctx(
    action: &str,
    title: &str,
    form: &DishForm,
    errors: &FormErrors,
    data: &FormData,
) -> tera::Context {
    let mut ctx = tera::Context::new();
    ctx.insert("action", action);
    ctx.insert("title", title);
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    ctx.insert("dish_types", &data.0);
    ctx.insert("all_ingredients", &data.1);
    ctx.insert("all_cooks", &data.2);
    ctx.insert("selected_dish_type", &form.selected_type_id());
    ctx
}

fn constraint_errors(err: KitchenError) -> Result<FormErrors, KitchenError> {
    use diesel::result::{DatabaseErrorKind, Error};
    match err {
        KitchenError::Database(Error::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            _,
        )) => {
            let mut errors = FormErrors::default();
            errors.add("__all__", "A selected record no longer exists.");
            Ok(errors)
        }
        other => Err(other),
    }
}

pub async fn create_form(
    state: web::Data<AppState>,
    _session: AuthSession,
) -> Result<HttpResponse, KitchenError> {
    let data = load_form_data(&state).await?;
    state.render(
        "dish-form.html.tera",
        &form_ctx(
            paths::DISH_CREATE,
            "Add dish",
            &DishForm::default(),
            &FormErrors::default(),
            &data,
        ),
    )
}

pub async fn create(
    state: web::Data<AppState>,
    _session: AuthSession,
    body: web::Bytes,
) -> Result<HttpResponse, KitchenError> {
    let body = std::str::from_utf8(&body).unwrap_or_default();
    let form = DishForm::from_urlencoded(body);

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let data = load_form_data(&state).await?;
            return state.render(
                "dish-form.html.tera",
                &form_ctx(paths::DISH_CREATE, "Add dish", &form, &errors, &data),
            );
        }
    };

    let pool = state.pool.clone();
    let created = web::block(move || -> Result<Dish, KitchenError> {
        let mut conn = pool.get()?;
        Ok(query::insert_dish(&mut conn, &input)?)
    })
    .await?;

    match created {
        Ok(_) => Ok(super::see_other(paths::DISH_LIST)),
        Err(err) => {
            let errors = constraint_errors(err)?;
            let data = load_form_data(&state).await?;
            state.render(
                "dish-form.html.tera",
                &form_ctx(paths::DISH_CREATE, "Add dish", &form, &errors, &data),
            )
        }
    }
}

pub async fn update_form(
    state: web::Data<AppState>,
    _session: AuthSession,
    path: web::Path<i64>,
) -> Result<HttpResponse, KitchenError> {
    let id = path.into_inner();
    let pool = state.pool.clone();
    let detail = web::block(move || -> Result<query::DishDetail, KitchenError> {
        let mut conn = pool.get()?;
        Ok(query::find_dish_detail(&mut conn, id)?)
    })
    .await??;

    let form = DishForm {
        name: detail.dish.name.clone(),
        description: detail.dish.description.clone(),
        price: format_price(detail.dish.price_cents),
        dish_type_id: detail.dish.dish_type_id.to_string(),
        ingredient_ids: detail.ingredients.iter().map(|i| i.id).collect(),
        cook_ids: detail.cooks.iter().map(|c| c.id).collect(),
    };
    let data = load_form_data(&state).await?;
    state.render(
        "dish-form.html.tera",
        &form_ctx(
            &paths::dish_update(id),
            "Update dish",
            &form,
            &FormErrors::default(),
            &data,
        ),
    )
}

/// Unlike create, a successful update lands on the dish's own detail page.
pub async fn update(
    state: web::Data<AppState>,
    _session: AuthSession,
    path: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse, KitchenError> {
    let id = path.into_inner();
    let body = std::str::from_utf8(&body).unwrap_or_default();
    let form = DishForm::from_urlencoded(body);

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let data = load_form_data(&state).await?;
            return state.render(
                "dish-form.html.tera",
                &form_ctx(&paths::dish_update(id), "Update dish", &form, &errors, &data),
            );
        }
    };

    let pool = state.pool.clone();
    let updated = web::block(move || -> Result<(), KitchenError> {
        let mut conn = pool.get()?;
        Ok(query::update_dish(&mut conn, id, &input)?)
    })
    .await?;

    match updated {
        Ok(()) => Ok(super::see_other(&paths::dish_detail(id))),
        Err(err @ KitchenError::Database(diesel::result::Error::NotFound)) => Err(err),
        Err(err) => {
            let errors = constraint_errors(err)?;
            let data = load_form_data(&state).await?;
            state.render(
                "dish-form.html.tera",
                &form_ctx(&paths::dish_update(id), "Update dish", &form, &errors, &data),
            )
        }
    }
}
