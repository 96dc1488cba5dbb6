//! One function per unit of database work, all synchronous diesel; handlers
//! run these inside `web::block`.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::forms::DishInput;
use crate::models::{
    Cook, CookChangeset, Dish, DishChangeset, DishCook, DishIngredient, DishType, Ingredient,
    IngredientChangeset, IngredientType, NewCook, NewDishType, NewIngredientType,
};
use crate::pagination;
use crate::schema::{
    cooks, dish_cooks, dish_ingredients, dish_types, dishes, ingredient_types, ingredients,
};

pub const DISHES_PER_PAGE: i64 = 5;
pub const COOKS_PER_PAGE: i64 = 5;
pub const INGREDIENTS_PER_PAGE: i64 = 10;

#[derive(Debug)]
pub struct Paginated<T> {
    pub rows: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub num_pages: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DishOrdering {
    Default,
    PriceAsc,
    PriceDesc,
}

impl DishOrdering {
    /// Unrecognized values fall back to the default order rather than erroring.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("price_asc") => DishOrdering::PriceAsc,
            Some("price_desc") => DishOrdering::PriceDesc,
            _ => DishOrdering::Default,
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            DishOrdering::Default => "",
            DishOrdering::PriceAsc => "price_asc",
            DishOrdering::PriceDesc => "price_desc",
        }
    }
}

#[derive(Debug)]
pub struct HomeCounts {
    pub dishes: i64,
    pub cooks: i64,
    pub ingredients: i64,
}

pub fn home_counts(conn: &mut SqliteConnection) -> QueryResult<HomeCounts> {
    Ok(HomeCounts {
        dishes: dishes::table.count().get_result(conn)?,
        cooks: cooks::table.count().get_result(conn)?,
        ingredients: ingredients::table.count().get_result(conn)?,
    })
}

pub fn dish_types_all(conn: &mut SqliteConnection) -> QueryResult<Vec<DishType>> {
    dish_types::table
        .select(DishType::as_select())
        .order(dish_types::name.asc())
        .load(conn)
}

pub fn ingredient_types_all(conn: &mut SqliteConnection) -> QueryResult<Vec<IngredientType>> {
    ingredient_types::table
        .select(IngredientType::as_select())
        .order(ingredient_types::name.asc())
        .load(conn)
}

pub fn insert_dish_type(conn: &mut SqliteConnection, name: &str) -> QueryResult<DishType> {
    diesel::insert_into(dish_types::table)
        .values(NewDishType { name })
        .returning(DishType::as_returning())
        .get_result(conn)
}

pub fn insert_ingredient_type(
    conn: &mut SqliteConnection,
    name: &str,
) -> QueryResult<IngredientType> {
    diesel::insert_into(ingredient_types::table)
        .values(NewIngredientType { name })
        .returning(IngredientType::as_returning())
        .get_result(conn)
}

// Maintenance operations; the cascade rules take the dependent records with
// the type.
pub fn delete_dish_type(conn: &mut SqliteConnection, id: i64) -> QueryResult<usize> {
    diesel::delete(dish_types::table.find(id)).execute(conn)
}

pub fn delete_ingredient_type(conn: &mut SqliteConnection, id: i64) -> QueryResult<usize> {
    diesel::delete(ingredient_types::table.find(id)).execute(conn)
}

pub fn ingredients_page(
    conn: &mut SqliteConnection,
    type_filter: Option<&str>,
    requested_page: i64,
) -> QueryResult<Paginated<(Ingredient, IngredientType)>> {
    let total: i64 = match type_filter {
        Some(name) => ingredients::table
            .inner_join(ingredient_types::table)
            .filter(ingredient_types::name.eq(name))
            .count()
            .get_result(conn)?,
        None => ingredients::table.count().get_result(conn)?,
    };
    let num_pages = pagination::num_pages(total, INGREDIENTS_PER_PAGE);
    let page = pagination::clamp_page(requested_page, num_pages);

    let mut query = ingredients::table
        .inner_join(ingredient_types::table)
        .select((Ingredient::as_select(), IngredientType::as_select()))
        .order(ingredients::id.asc())
        .into_boxed();
    if let Some(name) = type_filter {
        query = query.filter(ingredient_types::name.eq(name));
    }
    let rows = query
        .limit(INGREDIENTS_PER_PAGE)
        .offset(pagination::offset(page, INGREDIENTS_PER_PAGE))
        .load(conn)?;

    Ok(Paginated {
        rows,
        total,
        page,
        num_pages,
    })
}

pub fn ingredients_all(conn: &mut SqliteConnection) -> QueryResult<Vec<Ingredient>> {
    ingredients::table
        .select(Ingredient::as_select())
        .order(ingredients::name.asc())
        .load(conn)
}

pub fn find_ingredient(conn: &mut SqliteConnection, id: i64) -> QueryResult<Ingredient> {
    ingredients::table
        .find(id)
        .select(Ingredient::as_select())
        .first(conn)
}

pub fn insert_ingredient(
    conn: &mut SqliteConnection,
    changes: &IngredientChangeset<'_>,
) -> QueryResult<Ingredient> {
    diesel::insert_into(ingredients::table)
        .values(changes)
        .returning(Ingredient::as_returning())
        .get_result(conn)
}

pub fn update_ingredient(
    conn: &mut SqliteConnection,
    id: i64,
    changes: &IngredientChangeset<'_>,
) -> QueryResult<()> {
    let updated = diesel::update(ingredients::table.find(id))
        .set(changes)
        .execute(conn)?;
    if updated == 0 {
        return Err(diesel::result::Error::NotFound);
    }
    Ok(())
}

pub fn cooks_page(
    conn: &mut SqliteConnection,
    requested_page: i64,
) -> QueryResult<Paginated<Cook>> {
    let total: i64 = cooks::table.count().get_result(conn)?;
    let num_pages = pagination::num_pages(total, COOKS_PER_PAGE);
    let page = pagination::clamp_page(requested_page, num_pages);
    let rows = cooks::table
        .select(Cook::as_select())
        .order(cooks::id.asc())
        .limit(COOKS_PER_PAGE)
        .offset(pagination::offset(page, COOKS_PER_PAGE))
        .load(conn)?;
    Ok(Paginated {
        rows,
        total,
        page,
        num_pages,
    })
}

pub fn cooks_all(conn: &mut SqliteConnection) -> QueryResult<Vec<Cook>> {
    cooks::table
        .select(Cook::as_select())
        .order(cooks::username.asc())
        .load(conn)
}

pub fn find_cook(conn: &mut SqliteConnection, id: i64) -> QueryResult<Cook> {
    cooks::table.find(id).select(Cook::as_select()).first(conn)
}

pub fn find_cook_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> QueryResult<Option<Cook>> {
    cooks::table
        .filter(cooks::username.eq(username))
        .select(Cook::as_select())
        .first(conn)
        .optional()
}

pub fn insert_cook(conn: &mut SqliteConnection, new_cook: &NewCook<'_>) -> QueryResult<Cook> {
    diesel::insert_into(cooks::table)
        .values(new_cook)
        .returning(Cook::as_returning())
        .get_result(conn)
}

pub fn update_cook(
    conn: &mut SqliteConnection,
    id: i64,
    changes: &CookChangeset<'_>,
) -> QueryResult<()> {
    let updated = diesel::update(cooks::table.find(id))
        .set(changes)
        .execute(conn)?;
    if updated == 0 {
        return Err(diesel::result::Error::NotFound);
    }
    Ok(())
}

pub fn dishes_page(
    conn: &mut SqliteConnection,
    ordering: DishOrdering,
    requested_page: i64,
) -> QueryResult<Paginated<(Dish, DishType)>> {
    let total: i64 = dishes::table.count().get_result(conn)?;
    let num_pages = pagination::num_pages(total, DISHES_PER_PAGE);
    let page = pagination::clamp_page(requested_page, num_pages);

    let query = dishes::table
        .inner_join(dish_types::table)
        .select((Dish::as_select(), DishType::as_select()))
        .into_boxed();
    // Secondary id key keeps pages stable when prices collide.
    let query = match ordering {
        DishOrdering::PriceAsc => query
            .order(dishes::price_cents.asc())
            .then_order_by(dishes::id.asc()),
        DishOrdering::PriceDesc => query
            .order(dishes::price_cents.desc())
            .then_order_by(dishes::id.asc()),
        DishOrdering::Default => query.order(dishes::id.asc()),
    };
    let rows = query
        .limit(DISHES_PER_PAGE)
        .offset(pagination::offset(page, DISHES_PER_PAGE))
        .load(conn)?;

    Ok(Paginated {
        rows,
        total,
        page,
        num_pages,
    })
}

#[derive(Debug)]
pub struct DishDetail {
    pub dish: Dish,
    pub dish_type: DishType,
    pub ingredients: Vec<Ingredient>,
    pub cooks: Vec<Cook>,
}

pub fn find_dish_detail(conn: &mut SqliteConnection, id: i64) -> QueryResult<DishDetail> {
    let (dish, dish_type) = dishes::table
        .inner_join(dish_types::table)
        .filter(dishes::id.eq(id))
        .select((Dish::as_select(), DishType::as_select()))
        .first(conn)?;
    let dish_ingredients = dish_ingredients::table
        .inner_join(ingredients::table)
        .filter(dish_ingredients::dish_id.eq(id))
        .select(Ingredient::as_select())
        .order(ingredients::name.asc())
        .load(conn)?;
    let dish_cooks = dish_cooks::table
        .inner_join(cooks::table)
        .filter(dish_cooks::dish_id.eq(id))
        .select(Cook::as_select())
        .order(cooks::username.asc())
        .load(conn)?;
    Ok(DishDetail {
        dish,
        dish_type,
        ingredients: dish_ingredients,
        cooks: dish_cooks,
    })
}

pub fn dishes_for_cook(
    conn: &mut SqliteConnection,
    cook_id: i64,
) -> QueryResult<Vec<(Dish, DishType)>> {
    dish_cooks::table
        .inner_join(dishes::table.inner_join(dish_types::table))
        .filter(dish_cooks::cook_id.eq(cook_id))
        .select((Dish::as_select(), DishType::as_select()))
        .order(dishes::name.asc())
        .load(conn)
}

fn replace_dish_associations(
    conn: &mut SqliteConnection,
    dish_id: i64,
    ingredient_ids: &[i64],
    cook_ids: &[i64],
) -> QueryResult<()> {
    diesel::delete(dish_ingredients::table.filter(dish_ingredients::dish_id.eq(dish_id)))
        .execute(conn)?;
    diesel::delete(dish_cooks::table.filter(dish_cooks::dish_id.eq(dish_id))).execute(conn)?;

    let ingredient_rows: Vec<DishIngredient> = ingredient_ids
        .iter()
        .map(|&ingredient_id| DishIngredient {
            dish_id,
            ingredient_id,
        })
        .collect();
    diesel::insert_into(dish_ingredients::table)
        .values(&ingredient_rows)
        .execute(conn)?;

    let cook_rows: Vec<DishCook> = cook_ids
        .iter()
        .map(|&cook_id| DishCook { dish_id, cook_id })
        .collect();
    diesel::insert_into(dish_cooks::table)
        .values(&cook_rows)
        .execute(conn)?;
    Ok(())
}

pub fn insert_dish(conn: &mut SqliteConnection, input: &DishInput) -> QueryResult<Dish> {
    conn.transaction(|conn| {
        let dish: Dish = diesel::insert_into(dishes::table)
            .values(DishChangeset {
                name: &input.name,
                description: &input.description,
                price_cents: input.price_cents,
                dish_type_id: input.dish_type_id,
            })
            .returning(Dish::as_returning())
            .get_result(conn)?;
        replace_dish_associations(conn, dish.id, &input.ingredient_ids, &input.cook_ids)?;
        Ok(dish)
    })
}

pub fn update_dish(conn: &mut SqliteConnection, id: i64, input: &DishInput) -> QueryResult<()> {
    conn.transaction(|conn| {
        let updated = diesel::update(dishes::table.find(id))
            .set(DishChangeset {
                name: &input.name,
                description: &input.description,
                price_cents: input.price_cents,
                dish_type_id: input.dish_type_id,
            })
            .execute(conn)?;
        if updated == 0 {
            return Err(diesel::result::Error::NotFound);
        }
        replace_dish_associations(conn, id, &input.ingredient_ids, &input.cook_ids)
    })
}
