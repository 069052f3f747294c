pub mod config;
pub mod operator;

pub use self::config::*;
pub use self::operator::*;

use crate::health;
use actix_web::web;

/// Register every route; shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health::health_check))
            .route("/metrics", web::get().to(health::detailed_metrics))
            .route("/config", web::get().to(get_config))
            .route("/operators/word-frequency", web::post().to(run_word_frequency)),
    )
    // Also provide health check at root level for convenience
    .route("/health", web::get().to(health::health_check));
}
