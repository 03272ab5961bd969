//! HTTP surface (§6.3): read-only endpoints over the saga store.

pub mod sagas;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/sagas")
            .route("", web::get().to(sagas::list_sagas))
            .route("/{transactionId}", web::get().to(sagas::get_saga)),
    );
}
