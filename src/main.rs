use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};
use tera::Tera;

use kitchen::auth::SessionSigner;
use kitchen::config::Config;
use kitchen::db;
use kitchen::middleware::RedirectAuthenticatedUsers;
use kitchen::routes;
use kitchen::state::AppState;

const DB_POOL_MAX_OPEN: u32 = 16;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().expect("invalid configuration");

    // set up database connection pool
    let pool = db::build_pool(&config.database_url, DB_POOL_MAX_OPEN)
        .expect("Failed to create pool.");
    {
        let mut conn = pool.get().expect("Failed to check out a connection.");
        db::run_migrations(&mut conn).expect("Failed to run migrations.");
    }

    let templates = Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*"))
        .expect("Failed to load templates.");
    let state = AppState {
        pool,
        templates,
        sessions: SessionSigner::new(&config.session_secret),
    };

    log::info!(
        "starting HTTP server at http://{}:{}",
        config.host,
        config.port
    );

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(RedirectAuthenticatedUsers)
            .wrap(NormalizePath::trim())
            .wrap(Logger::default())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
