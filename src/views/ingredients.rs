use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::AuthSession;
use crate::error::KitchenError;
use crate::forms::{FormErrors, IngredientForm};
use crate::models::{Ingredient, IngredientChangeset, IngredientType};
use crate::pagination;
use crate::query;
use crate::routes::paths;
use crate::state::AppState;

const QUANTITY_HELP: &str = "This could be gr, kg, pieces, etc";

#[derive(Debug, Deserialize)]
pub struct IngredientListParams {
    #[serde(default)]
    ingredient_type: Option<String>,
    #[serde(default)]
    page: Option<String>,
}

#[derive(Serialize)]
struct IngredientRow {
    id: i64,
    name: String,
    quantity: Option<i32>,
    type_name: String,
}

pub async fn list(
    state: web::Data<AppState>,
    _session: AuthSession,
    params: web::Query<IngredientListParams>,
) -> Result<HttpResponse, KitchenError> {
    let page = super::requested_page(&params.page);
    // An empty parameter means "no filter", same as an absent one.
    let selected_type = params
        .ingredient_type
        .clone()
        .filter(|name| !name.is_empty());

    let pool = state.pool.clone();
    let filter = selected_type.clone();
    type ListData = (
        query::Paginated<(Ingredient, IngredientType)>,
        Vec<IngredientType>,
    );
    let (page_data, types) = web::block(move || -> Result<ListData, KitchenError> {
        let mut conn = pool.get()?;
        let page_data = query::ingredients_page(&mut conn, filter.as_deref(), page)?;
        let types = query::ingredient_types_all(&mut conn)?;
        Ok((page_data, types))
    })
    .await??;

    let rows: Vec<IngredientRow> = page_data
        .rows
        .into_iter()
        .map(|(ingredient, ingredient_type)| IngredientRow {
            id: ingredient.id,
            name: ingredient.name,
            quantity: ingredient.quantity,
            type_name: ingredient_type.name,
        })
        .collect();

    let mut ctx = tera::Context::new();
    ctx.insert("ingredient_list", &rows);
    ctx.insert("selected_type", &selected_type);
    ctx.insert("ingredient_types", &types);
    let extra: Vec<(&str, &str)> = selected_type
        .as_deref()
        .map(|name| ("ingredient_type", name))
        .into_iter()
        .collect();
    pagination::insert_page_context(
        &mut ctx,
        paths::INGREDIENT_LIST,
        page_data.page,
        page_data.num_pages,
        &extra,
    );
    state.render("ingredient-list.html.tera", &ctx)
}

async fn load_types(state: &AppState) -> Result<Vec<IngredientType>, KitchenError> {
    let pool = state.pool.clone();
    web::block(move || -> Result<Vec<IngredientType>, KitchenError> {
        let mut conn = pool.get()?;
        Ok(query::ingredient_types_all(&mut conn)?)
    })
    .await?
}

fn form_ctx(
    action: &str,
    title: &str,
    form: &IngredientForm,
    errors: &FormErrors,
    types: &[IngredientType],
    quantity_help: Option<&str>,
) -> tera::Context {
    let mut ctx = tera::Context::new();
    ctx.insert("action", action);
    ctx.insert("title", title);
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    ctx.insert("ingredient_types", types);
    ctx.insert("selected_type_id", &form.selected_type_id());
    ctx.insert("quantity_help", &quantity_help);
    ctx
}

fn constraint_errors(err: KitchenError) -> Result<FormErrors, KitchenError> {
    use diesel::result::{DatabaseErrorKind, Error};
    match err {
        KitchenError::Database(Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            let mut errors = FormErrors::default();
            errors.add("name", "An ingredient with that name already exists.");
            Ok(errors)
        }
        KitchenError::Database(Error::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation,
            _,
        )) => {
            let mut errors = FormErrors::default();
            errors.add("type_id", "Select a valid ingredient type.");
            Ok(errors)
        }
        other => Err(other),
    }
}

pub async fn create_form(
    state: web::Data<AppState>,
    _session: AuthSession,
) -> Result<HttpResponse, KitchenError> {
    let types = load_types(&state).await?;
    state.render(
        "ingredient-form.html.tera",
        &form_ctx(
            paths::INGREDIENT_CREATE,
            "Add ingredient",
            &IngredientForm::default(),
            &FormErrors::default(),
            &types,
            Some(QUANTITY_HELP),
        ),
    )
}

pub async fn create(
    state: web::Data<AppState>,
    _session: AuthSession,
    form: web::Form<IngredientForm>,
) -> Result<HttpResponse, KitchenError> {
    let form = form.into_inner();
    let rerender = |state: &web::Data<AppState>, form: &IngredientForm, errors: &FormErrors, types: &[IngredientType]| {
        state.render(
            "ingredient-form.html.tera",
            &form_ctx(
                paths::INGREDIENT_CREATE,
                "Add ingredient",
                form,
                errors,
                types,
                Some(QUANTITY_HELP),
            ),
        )
    };

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let types = load_types(&state).await?;
            return rerender(&state, &form, &errors, &types);
        }
    };

    let pool = state.pool.clone();
    let created = web::block(move || -> Result<Ingredient, KitchenError> {
        let mut conn = pool.get()?;
        Ok(query::insert_ingredient(
            &mut conn,
            &IngredientChangeset {
                name: &input.name,
                quantity: input.quantity,
                type_id: input.type_id,
            },
        )?)
    })
    .await?;

    match created {
        Ok(_) => Ok(super::see_other(paths::INGREDIENT_LIST)),
        Err(err) => {
            let errors = constraint_errors(err)?;
            let types = load_types(&state).await?;
            rerender(&state, &form, &errors, &types)
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
    let ingredient = web::block(move || -> Result<Ingredient, KitchenError> {
        let mut conn = pool.get()?;
        Ok(query::find_ingredient(&mut conn, id)?)
    })
    .await??;

    let types = load_types(&state).await?;
    state.render(
        "ingredient-form.html.tera",
        &form_ctx(
            &paths::ingredient_update(id),
            "Update ingredient",
            &IngredientForm::from_ingredient(&ingredient),
            &FormErrors::default(),
            &types,
            None,
        ),
    )
}

pub async fn update(
    state: web::Data<AppState>,
    _session: AuthSession,
    path: web::Path<i64>,
    form: web::Form<IngredientForm>,
) -> Result<HttpResponse, KitchenError> {
    let id = path.into_inner();
    let form = form.into_inner();
    let rerender = |state: &web::Data<AppState>, form: &IngredientForm, errors: &FormErrors, types: &[IngredientType]| {
        state.render(
            "ingredient-form.html.tera",
            &form_ctx(
                &paths::ingredient_update(id),
                "Update ingredient",
                form,
                errors,
                types,
                None,
            ),
        )
    };

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            let types = load_types(&state).await?;
            return rerender(&state, &form, &errors, &types);
        }
    };

    let pool = state.pool.clone();
    let updated = web::block(move || -> Result<(), KitchenError> {
        let mut conn = pool.get()?;
        Ok(query::update_ingredient(
            &mut conn,
            id,
            &IngredientChangeset {
                name: &input.name,
                quantity: input.quantity,
                type_id: input.type_id,
            },
        )?)
    })
    .await?;

    match updated {
        Ok(()) => Ok(super::see_other(paths::INGREDIENT_LIST)),
        Err(err @ KitchenError::Database(diesel::result::Error::NotFound)) => Err(err),
        Err(err) => {
            let errors = constraint_errors(err)?;
            let types = load_types(&state).await?;
            rerender(&state, &form, &errors, &types)
        }
    }
}
