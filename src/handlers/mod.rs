//! HTTP handlers

pub mod health;
pub mod kelly;
pub mod predict;

use actix_web::web;

use crate::context::PredictionContext;
use crate::core::KellyOptimizer;
use crate::error::AppError;

/// Application state shared across handlers
pub struct AppState {
    /// `None` when the model or feature tables failed to load
    pub context: Option<PredictionContext>,
    pub optimizer: KellyOptimizer,
}

fn bad_request<E: std::fmt::Display>(err: E) -> actix_web::Error {
    AppError::ValidationError(err.to_string()).into()
}

/// Register every route
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Malformed query strings and bodies get the same error shape as failed validation
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _| bad_request(err)))
        .app_data(web::JsonConfig::default().error_handler(|err, _| bad_request(err)))
        .route("/health", web::get().to(health::health_check))
        .route("/predict", web::get().to(predict::predict_game))
        .route("/kelly-optimize", web::post().to(kelly::kelly_optimize));
}

#[cfg(test)]
pub(crate) mod testing {
    use actix_web::{dev::ServiceResponse, test, web, App};
    use std::sync::Arc;

    use super::{configure, AppState};
    use crate::context::PredictionContext;
    use crate::core::KellyOptimizer;

    pub fn state(context: Option<PredictionContext>) -> Arc<AppState> {
        Arc::new(AppState {
            context,
            optimizer: KellyOptimizer::default(),
        })
    }

    pub async fn call(state: Arc<AppState>, req: test::TestRequest) -> ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;
        test::call_service(&app, req.to_request()).await
    }
}
