use actix_web::{web, HttpResponse};
use std::sync::Arc;
use tracing::info;

use super::AppState;
use crate::context::optimize_portfolio;
use crate::error::AppError;
use crate::models::{KellyRequest, KellyResponse};
use crate::validation::validate_kelly_request;

/// Size a batch of bets under a shared bankroll
pub async fn kelly_optimize(
    state: web::Data<Arc<AppState>>,
    req: web::Json<KellyRequest>,
) -> Result<HttpResponse, AppError> {
    let validated = validate_kelly_request(&req)?;
    let bets = validated.probabilities.len();

    // The solver is CPU-bound
    let state = state.get_ref().clone();
    let sizing = web::block(move || optimize_portfolio(&state.optimizer, &validated))
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))??;

    info!(
        "Kelly allocation for {} bets: total fraction {:.4}",
        bets, sizing.total_fraction
    );

    Ok(HttpResponse::Ok().json(KellyResponse {
        allocations: sizing.allocations,
        total_fraction: sizing.total_fraction,
    }))
}
