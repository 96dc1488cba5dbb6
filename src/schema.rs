diesel::table! {
    dish_types (id) {
        id -> BigInt,
        name -> Text,
    }
}

diesel::table! {
    ingredient_types (id) {
        id -> BigInt,
        name -> Text,
    }
}

diesel::table! {
    ingredients (id) {
        id -> BigInt,
        name -> Text,
        quantity -> Nullable<Integer>,
        type_id -> BigInt,
    }
}

diesel::table! {
    cooks (id) {
        id -> BigInt,
        username -> Text,
        first_name -> Text,
        last_name -> Text,
        email -> Text,
        password_hash -> Text,
        years_of_experience -> Nullable<Integer>,
    }
}

diesel::table! {
    dishes (id) {
        id -> BigInt,
        name -> Text,
        description -> Text,
        price_cents -> BigInt,
        dish_type_id -> BigInt,
    }
}

diesel::table! {
    dish_ingredients (dish_id, ingredient_id) {
        dish_id -> BigInt,
        ingredient_id -> BigInt,
    }
}

diesel::table! {
    dish_cooks (dish_id, cook_id) {
        dish_id -> BigInt,
        cook_id -> BigInt,
    }
}

diesel::joinable!(ingredients -> ingredient_types (type_id));
diesel::joinable!(dishes -> dish_types (dish_type_id));
diesel::joinable!(dish_ingredients -> dishes (dish_id));
diesel::joinable!(dish_ingredients -> ingredients (ingredient_id));
diesel::joinable!(dish_cooks -> dishes (dish_id));
diesel::joinable!(dish_cooks -> cooks (cook_id));

diesel::allow_tables_to_appear_in_same_query!(
    cooks,
    dish_cooks,
    dish_ingredients,
    dish_types,
    dishes,
    ingredient_types,
    ingredients,
);
