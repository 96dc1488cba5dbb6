use diesel::prelude::*;
use serde::Serialize;

use crate::schema::{
    cooks, dish_cooks, dish_ingredients, dish_types, dishes, ingredient_types, ingredients,
};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = dish_types, check_for_backend(diesel::sqlite::Sqlite))]
pub struct DishType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = dish_types)]
pub struct NewDishType<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = ingredient_types, check_for_backend(diesel::sqlite::Sqlite))]
pub struct IngredientType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = ingredient_types)]
pub struct NewIngredientType<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = ingredients, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub quantity: Option<i32>,
    pub type_id: i64,
}

// An update form with an emptied quantity must clear the column, so `None`
// writes NULL instead of skipping the field.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = ingredients, treat_none_as_null = true)]
pub struct IngredientChangeset<'a> {
    pub name: &'a str,
    pub quantity: Option<i32>,
    pub type_id: i64,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = cooks, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Cook {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    // never leaks into a template context
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub years_of_experience: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cooks)]
pub struct NewCook<'a> {
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub years_of_experience: Option<i32>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = cooks, treat_none_as_null = true)]
pub struct CookChangeset<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub years_of_experience: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = dishes, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Dish {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub dish_type_id: i64,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = dishes)]
pub struct DishChangeset<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price_cents: i64,
    pub dish_type_id: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = dish_ingredients)]
pub struct DishIngredient {
    pub dish_id: i64,
    pub ingredient_id: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = dish_cooks)]
pub struct DishCook {
    pub dish_id: i64,
    pub cook_id: i64,
}
