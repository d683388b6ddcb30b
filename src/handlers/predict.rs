use actix_web::{web, HttpResponse};
use std::sync::Arc;
use tracing::info;

use super::AppState;
use crate::error::AppError;
use crate::models::{PredictQuery, PredictResponse};
use crate::validation::validate_predict_query;

/// Predict the run differential and run line edge for one game
pub async fn predict_game(
    state: web::Data<Arc<AppState>>,
    query: web::Query<PredictQuery>,
) -> Result<HttpResponse, AppError> {
    // Reject bad input before touching the model
    let validated = validate_predict_query(&query)?;

    let state = state.get_ref().clone();
    let prediction = web::block(move || {
        let context = state.context.as_ref().ok_or(AppError::ModelNotLoaded)?;
        context.predict_game(&validated).map_err(AppError::from)
    })
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))??;

    info!(
        "{} @ {} (line {}): y_pred={:.3} y_std={:.3}",
        query.away_team, query.home_team, query.run_line, prediction.estimate.value,
        prediction.estimate.std_dev
    );

    let response = PredictResponse {
        y_pred: prediction.estimate.value,
        y_std: prediction.estimate.std_dev,
        bet_recommendation: prediction.recommendation,
    };

    Ok(HttpResponse::Ok().json(response))
}
