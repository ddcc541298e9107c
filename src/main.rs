use std::io;

use actix_web::cookie::Key;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use actix_web_flash_messages::FlashMessagesFramework;
use actix_web_flash_messages::storage::CookieMessageStore;
use tera::Tera;

use trainer_dashboard::models::config::ServerConfig;
use trainer_dashboard::repository::{
    AppRepository, DieselRepository, establish_connection_pool, run_migrations,
};
use trainer_dashboard::routes::main::{guide, index, refresh};
use trainer_dashboard::routes::tone::analyze_tone;
use trainer_dashboard::routes::trainer_data::{
    add_row, delete_row, new_row, show_rows, update_row,
};
use trainer_dashboard::tone::ToneAnalysisClient;

fn startup_error(context: &str, error: impl std::fmt::Display) -> io::Error {
    log::error!("{context}: {error}");
    io::Error::other(format!("{context}: {error}"))
}

fn cookie_key(secret: Option<&str>) -> io::Result<Key> {
    match secret {
        Some(secret) => Key::try_from(secret.as_bytes())
            .map_err(|e| startup_error("Invalid cookie secret (need 64+ bytes)", e)),
        None => {
            log::warn!("No secret configured; flash messages will not survive a restart");
            Ok(Key::generate())
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config =
        ServerConfig::load().map_err(|e| startup_error("Failed to load configuration", e))?;
    let default_trainer = server_config
        .default_trainer()
        .map_err(|e| startup_error("Invalid default trainer id", e))?;

    let pool = establish_connection_pool(&server_config.database_url, server_config.pool_max_size)
        .map_err(|e| startup_error("Failed to set up the database pool", e))?;
    run_migrations(&pool).map_err(|e| startup_error("Failed to migrate the database", e))?;
    let repo = AppRepository::new(
        DieselRepository::new(pool),
        server_config.listing_cache_ttl(),
    );

    let tone = ToneAnalysisClient::new(&server_config.backend_api_url)
        .map_err(|e| startup_error("Failed to build the tone analysis client", e))?;

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| startup_error("Failed to load templates", e))?;

    let secret_key = cookie_key(server_config.secret.as_deref())?;
    let message_store = CookieMessageStore::builder(secret_key).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let bind = (server_config.bind_address.clone(), server_config.port);
    log::info!(
        "Serving the trainer dashboard on {}:{} (tone backend {})",
        bind.0,
        bind.1,
        tone.endpoint()
    );

    let repo = web::Data::new(repo);
    let tone = web::Data::new(tone);
    let tera = web::Data::new(tera);
    let default_trainer = web::Data::new(default_trainer);
    let server_config = web::Data::new(server_config);

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(Logger::default())
            .app_data(repo.clone())
            .app_data(tone.clone())
            .app_data(tera.clone())
            .app_data(default_trainer.clone())
            .app_data(server_config.clone())
            .service(index)
            .service(guide)
            .service(refresh)
            .service(analyze_tone)
            .service(new_row)
            .service(show_rows)
            .service(add_row)
            .service(update_row)
            .service(delete_row)
    })
    .bind(bind)?
    .run()
    .await
}
