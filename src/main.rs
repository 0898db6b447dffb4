use actix_web::{web, App, HttpServer};
use std::{io, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod calendar;
mod config;
mod database;
mod duration;
mod error;
mod messages;
mod middleware;
mod models;
mod routes;

use calendar::SystemClock;
use config::Config;
use routes::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studio_worklog=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(error) = dotenv {
        tracing::warn!(%error, "no .env file loaded, using process environment");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "invalid configuration");
            return Err(io::Error::new(io::ErrorKind::InvalidInput, error));
        }
    };

    let store = match database::connect(&config.mongodb_uri, &config.db_name).await {
        Ok(store) => store,
        Err(error) => {
            tracing::error!(%error, "unable to reach the database");
            return Err(io::Error::new(io::ErrorKind::Other, error));
        }
    };
    tracing::info!(db = %config.db_name, "connected to MongoDB");

    let state = web::Data::new(AppState {
        store: Arc::new(store),
        clock: Arc::new(SystemClock),
        static_dir: config.static_dir.clone(),
        template_dir: config.template_dir.clone(),
    });

    tracing::info!(host = %config.host, port = config.port, "starting HTTP server");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(routes::json_config())
            .app_data(routes::query_config())
            .wrap(middleware::RequestTracingFactory)
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
