//! End-to-end handler and middleware tests over an in-memory database.

use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use serde::Serialize;
use tera::Tera;

use kitchen::auth::{self, SessionSigner, SESSION_COOKIE};
use kitchen::db;
use kitchen::forms::DishInput;
use kitchen::middleware::RedirectAuthenticatedUsers;
use kitchen::models::{Cook, Dish, IngredientChangeset, NewCook};
use kitchen::query;
use kitchen::routes;
use kitchen::state::AppState;

fn test_state() -> AppState {
    // One connection in the pool keeps every request on the same in-memory
    // database.
    let pool = db::build_pool(":memory:", 1).expect("pool");
    {
        let mut conn = pool.get().expect("connection");
        db::run_migrations(&mut conn).expect("migrations");
    }
    let templates = Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*"))
        .expect("templates");
    AppState {
        pool,
        templates,
        sessions: SessionSigner::new(b"test-secret"),
    }
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .wrap(RedirectAuthenticatedUsers)
                .configure(routes::configure),
        )
        .await
    };
}

fn seed_cook(state: &AppState, username: &str, password: &str) -> Cook {
    let mut conn = state.pool.get().expect("connection");
    let password_hash = auth::hash_password(password);
    query::insert_cook(
        &mut conn,
        &NewCook {
            username,
            first_name: "",
            last_name: "",
            email: "",
            password_hash: &password_hash,
            years_of_experience: None,
        },
    )
    .expect("insert cook")
}

fn seed_dish(state: &AppState, name: &str, price_cents: i64, dish_type_id: i64) -> Dish {
    let mut conn = state.pool.get().expect("connection");
    query::insert_dish(
        &mut conn,
        &DishInput {
            name: name.to_owned(),
            description: "Seeded for tests".to_owned(),
            price_cents,
            dish_type_id,
            ingredient_ids: vec![],
            cook_ids: vec![],
        },
    )
    .expect("insert dish")
}

fn session_cookie(state: &AppState, cook_id: i64) -> Cookie<'static> {
    Cookie::new(SESSION_COOKIE, state.sessions.issue(cook_id))
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

async fn body_text<B>(resp: actix_web::dev::ServiceResponse<B>) -> String
where
    B: actix_web::body::MessageBody,
    B::Error: std::fmt::Debug,
{
    String::from_utf8(test::read_body(resp).await.to_vec()).expect("utf-8 body")
}

#[actix_web::test]
async fn authenticated_users_are_redirected_off_anonymous_pages() {
    let state = test_state();
    let cook = seed_cook(&state, "gordon", "beef-wellington");
    let app = test_app!(state);

    for path in ["/accounts/login", "/cooks/create"] {
        let req = test::TestRequest::get()
            .uri(path)
            .cookie(session_cookie(&state, cook.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "guard on {path}");
        assert_eq!(location(&resp), "/");
    }
}

#[actix_web::test]
async fn anonymous_users_reach_login_and_registration() {
    let state = test_state();
    let app = test_app!(state);

    for path in ["/accounts/login", "/cooks/create"] {
        let req = test::TestRequest::get().uri(path).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "pass-through on {path}");
    }
}

#[actix_web::test]
async fn gated_pages_redirect_anonymous_users_to_login() {
    let state = test_state();
    let app = test_app!(state);

    for path in ["/", "/dishes", "/ingredients", "/cooks"] {
        let req = test::TestRequest::get().uri(path).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "gate on {path}");
        assert_eq!(location(&resp), "/accounts/login");
    }
}

#[derive(Serialize)]
struct RegistrationPayload {
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    years_of_experience: String,
    password1: String,
    password2: String,
}

impl RegistrationPayload {
    fn valid(username: &str) -> Self {
        RegistrationPayload {
            username: username.to_owned(),
            first_name: "Julia".to_owned(),
            last_name: "Child".to_owned(),
            email: "julia@example.com".to_owned(),
            years_of_experience: "10".to_owned(),
            password1: "mastering-the-art".to_owned(),
            password2: "mastering-the-art".to_owned(),
        }
    }
}

#[actix_web::test]
async fn registration_creates_one_cook_and_logs_in() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/cooks/create")
        .set_form(RegistrationPayload::valid("julia"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    // The requester is authenticated as the new cook right away.
    let session = resp
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .expect("session cookie is set");
    let cook_id = state
        .sessions
        .verify(session.value())
        .expect("session cookie verifies");

    let mut conn = state.pool.get().expect("connection");
    let counts = query::home_counts(&mut conn).expect("counts");
    assert_eq!(counts.cooks, 1);
    let cook = query::find_cook(&mut conn, cook_id).expect("cook");
    assert_eq!(cook.username, "julia");
    assert_eq!(cook.years_of_experience, Some(10));
}

#[actix_web::test]
async fn registration_rejects_taken_usernames() {
    let state = test_state();
    seed_cook(&state, "julia", "already-here-pw");
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/cooks/create")
        .set_form(RegistrationPayload::valid("julia"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("already exists"));

    let mut conn = state.pool.get().expect("connection");
    assert_eq!(query::home_counts(&mut conn).expect("counts").cooks, 1);
}

#[derive(Serialize)]
struct LoginPayload {
    username: String,
    password: String,
}

#[actix_web::test]
async fn login_accepts_good_credentials_and_rejects_bad_ones() {
    let state = test_state();
    let cook = seed_cook(&state, "gordon", "beef-wellington");
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/accounts/login")
        .set_form(LoginPayload {
            username: "gordon".to_owned(),
            password: "beef-wellington".to_owned(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    let session = resp
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .expect("session cookie is set");
    assert_eq!(state.sessions.verify(session.value()), Some(cook.id));

    let req = test::TestRequest::post()
        .uri("/accounts/login")
        .set_form(LoginPayload {
            username: "gordon".to_owned(),
            password: "wrong".to_owned(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Please enter a correct username and password."));
}

#[actix_web::test]
async fn home_page_reports_live_counts() {
    let state = test_state();
    let cook = seed_cook(&state, "gordon", "beef-wellington");
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/")
        .cookie(session_cookie(&state, cook.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("0 dishes"));
    assert!(body.contains("1 cooks"));
    assert!(body.contains("0 ingredients"));
}

#[actix_web::test]
async fn ingredient_list_filters_by_type_name() {
    let state = test_state();
    let cook = seed_cook(&state, "gordon", "beef-wellington");
    {
        let mut conn = state.pool.get().expect("connection");
        let spice = query::insert_ingredient_type(&mut conn, "Spice").expect("type");
        let vegetable = query::insert_ingredient_type(&mut conn, "Vegetable").expect("type");
        for (name, type_id) in [
            ("Paprika", spice.id),
            ("Cumin", spice.id),
            ("Tomato", vegetable.id),
        ] {
            query::insert_ingredient(
                &mut conn,
                &IngredientChangeset {
                    name,
                    quantity: None,
                    type_id,
                },
            )
            .expect("ingredient");
        }
    }
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/ingredients?ingredient_type=Spice")
        .cookie(session_cookie(&state, cook.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("Paprika"));
    assert!(body.contains("Cumin"));
    assert!(!body.contains("Tomato"));

    // Without the parameter the page is unfiltered.
    let req = test::TestRequest::get()
        .uri("/ingredients")
        .cookie(session_cookie(&state, cook.id))
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    assert!(body.contains("Paprika"));
    assert!(body.contains("Tomato"));

    // An unknown type name is an empty page, not an error.
    let req = test::TestRequest::get()
        .uri("/ingredients?ingredient_type=Metal")
        .cookie(session_cookie(&state, cook.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(!body.contains("Paprika"));
    assert!(!body.contains("Tomato"));
}

#[actix_web::test]
async fn dish_list_orders_by_price_when_asked() {
    let state = test_state();
    let cook = seed_cook(&state, "gordon", "beef-wellington");
    let dish_type = {
        let mut conn = state.pool.get().expect("connection");
        query::insert_dish_type(&mut conn, "Main course").expect("type")
    };
    seed_dish(&state, "Wellington", 3000, dish_type.id);
    seed_dish(&state, "Porridge", 500, dish_type.id);
    seed_dish(&state, "Risotto", 1800, dish_type.id);
    let app = test_app!(state);

    let order_of = |body: &str| {
        let pos = |needle: &str| {
            body.find(needle)
                .unwrap_or_else(|| panic!("{needle} missing from page"))
        };
        (pos("Wellington"), pos("Porridge"), pos("Risotto"))
    };

    let req = test::TestRequest::get()
        .uri("/dishes?ordering=price_asc")
        .cookie(session_cookie(&state, cook.id))
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    let (wellington, porridge, risotto) = order_of(&body);
    assert!(porridge < risotto && risotto < wellington);

    let req = test::TestRequest::get()
        .uri("/dishes?ordering=price_desc")
        .cookie(session_cookie(&state, cook.id))
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    let (wellington, porridge, risotto) = order_of(&body);
    assert!(wellington < risotto && risotto < porridge);

    // Anything else keeps insertion order.
    let req = test::TestRequest::get()
        .uri("/dishes?ordering=upside_down")
        .cookie(session_cookie(&state, cook.id))
        .to_request();
    let body = body_text(test::call_service(&app, req).await).await;
    let (wellington, porridge, risotto) = order_of(&body);
    assert!(wellington < porridge && porridge < risotto);
}

#[actix_web::test]
async fn dish_create_returns_to_the_list_but_update_opens_the_detail() {
    let state = test_state();
    let cook = seed_cook(&state, "gordon", "beef-wellington");
    let dish_type = {
        let mut conn = state.pool.get().expect("connection");
        query::insert_dish_type(&mut conn, "Main course").expect("type")
    };
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/dishes/create")
        .cookie(session_cookie(&state, cook.id))
        .insert_header(header::ContentType::form_url_encoded())
        .set_payload(format!(
            "name=Plov&description=Rice+and+lamb&price=7.50&dish_type_id={}&cooks={}",
            dish_type.id, cook.id
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/dishes");

    let dish_id = {
        let mut conn = state.pool.get().expect("connection");
        let page = query::dishes_page(&mut conn, query::DishOrdering::Default, 1).expect("page");
        assert_eq!(page.total, 1);
        page.rows[0].0.id
    };

    let req = test::TestRequest::post()
        .uri(&format!("/dishes/{dish_id}/update"))
        .cookie(session_cookie(&state, cook.id))
        .insert_header(header::ContentType::form_url_encoded())
        .set_payload(format!(
            "name=Plov&description=Rice+and+lamb&price=8.00&dish_type_id={}",
            dish_type.id
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), format!("/dishes/{dish_id}"));

    let mut conn = state.pool.get().expect("connection");
    let detail = query::find_dish_detail(&mut conn, dish_id).expect("detail");
    assert_eq!(detail.dish.price_cents, 800);
    // The update form posted no cooks, so the association set is now empty.
    assert!(detail.cooks.is_empty());
}

#[actix_web::test]
async fn missing_records_are_not_found() {
    let state = test_state();
    let cook = seed_cook(&state, "gordon", "beef-wellington");
    let app = test_app!(state);

    for path in ["/dishes/4096", "/cooks/4096", "/ingredients/4096/update"] {
        let req = test::TestRequest::get()
            .uri(path)
            .cookie(session_cookie(&state, cook.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "lookup on {path}");
    }
}
