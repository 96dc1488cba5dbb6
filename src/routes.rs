use actix_web::web;

use crate::views;

/// Route paths, shared by the router, the redirect-guard middleware and
/// every handler that issues a redirect.
pub mod paths {
    pub const HOME: &str = "/";
    pub const LOGIN: &str = "/accounts/login";
    pub const LOGOUT: &str = "/accounts/logout";
    pub const COOK_REGISTER: &str = "/cooks/create";
    pub const COOK_LIST: &str = "/cooks";
    pub const COOK_DETAIL: &str = "/cooks/{id}";
    pub const COOK_UPDATE: &str = "/cooks/{id}/update";
    pub const INGREDIENT_LIST: &str = "/ingredients";
    pub const INGREDIENT_CREATE: &str = "/ingredients/create";
    pub const INGREDIENT_UPDATE: &str = "/ingredients/{id}/update";
    pub const DISH_LIST: &str = "/dishes";
    pub const DISH_CREATE: &str = "/dishes/create";
    pub const DISH_DETAIL: &str = "/dishes/{id}";
    pub const DISH_UPDATE: &str = "/dishes/{id}/update";

    pub fn cook_detail(id: i64) -> String {
        format!("{COOK_LIST}/{id}")
    }

    pub fn cook_update(id: i64) -> String {
        format!("{COOK_LIST}/{id}/update")
    }

    pub fn dish_detail(id: i64) -> String {
        format!("{DISH_LIST}/{id}")
    }

    pub fn dish_update(id: i64) -> String {
        format!("{DISH_LIST}/{id}/update")
    }

    pub fn ingredient_update(id: i64) -> String {
        format!("{INGREDIENT_LIST}/{id}/update")
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(paths::HOME).route(web::get().to(views::home::index)))
        .service(
            web::resource(paths::LOGIN)
                .route(web::get().to(views::accounts::login_form))
                .route(web::post().to(views::accounts::login)),
        )
        .service(web::resource(paths::LOGOUT).route(web::post().to(views::accounts::logout)))
        // Fixed segments are registered ahead of `{id}` captures.
        .service(
            web::resource(paths::COOK_REGISTER)
                .route(web::get().to(views::cooks::register_form))
                .route(web::post().to(views::cooks::register)),
        )
        .service(web::resource(paths::COOK_LIST).route(web::get().to(views::cooks::list)))
        .service(
            web::resource(paths::COOK_UPDATE)
                .route(web::get().to(views::cooks::update_form))
                .route(web::post().to(views::cooks::update)),
        )
        .service(web::resource(paths::COOK_DETAIL).route(web::get().to(views::cooks::detail)))
        .service(
            web::resource(paths::INGREDIENT_CREATE)
                .route(web::get().to(views::ingredients::create_form))
                .route(web::post().to(views::ingredients::create)),
        )
        .service(
            web::resource(paths::INGREDIENT_LIST).route(web::get().to(views::ingredients::list)),
        )
        .service(
            web::resource(paths::INGREDIENT_UPDATE)
                .route(web::get().to(views::ingredients::update_form))
                .route(web::post().to(views::ingredients::update)),
        )
        .service(
            web::resource(paths::DISH_CREATE)
                .route(web::get().to(views::dishes::create_form))
                .route(web::post().to(views::dishes::create)),
        )
        .service(web::resource(paths::DISH_LIST).route(web::get().to(views::dishes::list)))
        .service(
            web::resource(paths::DISH_UPDATE)
                .route(web::get().to(views::dishes::update_form))
                .route(web::post().to(views::dishes::update)),
        )
        .service(web::resource(paths::DISH_DETAIL).route(web::get().to(views::dishes::detail)))
        .service(actix_files::Files::new(
            "/static",
            concat!(env!("CARGO_MANIFEST_DIR"), "/static"),
        ));
}
