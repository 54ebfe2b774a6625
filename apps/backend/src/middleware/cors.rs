use actix_cors::Cors;
use actix_web::http::header;

use crate::extractors::TICKET_HEADER;
use crate::middleware::TRACE_HEADER;

/// CORS for the configured origins (see `ServerConfig`), falling back to
/// localhost when none are set.
pub fn cors_middleware(allowed_origins: &[String]) -> Cors {
    let defaults = [
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ];
    let origins = if allowed_origins.is_empty() {
        &defaults[..]
    } else {
        allowed_origins
    };

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static(TICKET_HEADER),
        ])
        .expose_headers(vec![
            header::HeaderName::from_static(TRACE_HEADER),
            header::RETRY_AFTER,
        ])
        .max_age(3600);

    for origin in origins {
        cors = cors.allowed_origin(origin);
    }
    cors
}
