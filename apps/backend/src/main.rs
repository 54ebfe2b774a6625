use actix_web::{web, App, HttpServer};
use skat_backend::config::{EngineConfig, ServerConfig};
use skat_backend::middleware::cors::cors_middleware;
use skat_backend::middleware::request_trace::RequestTrace;
use skat_backend::middleware::structured_logger::StructuredLogger;
use skat_backend::routes;
use skat_backend::state::app_state::AppState;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let server = ServerConfig::from_env();
    let engine = EngineConfig::from_env();

    let app_state = match AppState::in_memory(engine.clone()) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    info!(
        host = %server.host,
        port = server.port,
        long_poll_secs = engine.long_poll_timeout.as_secs(),
        inactivity_secs = engine.inactivity_timeout.as_secs(),
        "starting Skat backend"
    );

    let data = web::Data::new(app_state);
    let origins = server.cors_allowed_origins.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware(&origins))
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await
}
