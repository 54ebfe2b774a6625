use actix_web::web;

pub mod computer;
pub mod health;
pub mod reservations;
pub mod table;

/// Register every route. `main.rs` and the route tests share this, with the
/// middleware stack added around it by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/health").configure(health::configure_routes));
    cfg.service(web::scope("/api/table").configure(table::configure_routes));
    cfg.service(web::scope("/api/computer").configure(computer::configure_routes));
    cfg.service(web::scope("/api/reservations").configure(reservations::configure_routes));
}
