use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use dotenv::dotenv;

use taskhub::auth::TokenCodec;
use taskhub::config::Config;
use taskhub::store::PgStore;
use taskhub::{logging, routes, AppState};

fn fatal<E: std::fmt::Display>(context: &str, error: E) -> io::Error {
    log::error!("{}: {}", context, error);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, error))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    logging::init();

    let config = Config::from_env().map_err(|e| fatal("invalid configuration", e))?;

    let store = PgStore::connect(&config)
        .await
        .map_err(|e| fatal("failed to connect to the database", e))?;
    store
        .migrate()
        .await
        .map_err(|e| fatal("failed to run migrations", e))?;
    log::info!("database ready");

    let state = AppState::with_store(
        Arc::new(store),
        TokenCodec::new(&config.jwt_secret),
        config.bcrypt_cost,
    );

    log::info!("starting server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::configure(state.clone()))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
