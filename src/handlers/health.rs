use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

use super::AppState;
use crate::models::HealthResponse;

/// Health check endpoint
pub async fn health_check(state: web::Data<Arc<AppState>>) -> impl Responder {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_loaded: state.context.is_some(),
    };

    HttpResponse::Ok().json(response)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{call, state};
    use crate::context::testing::context;
    use crate::models::HealthResponse;
    use actix_web::test;

    #[actix_web::test]
    async fn test_health_without_model() {
        let resp = call(state(None), test::TestRequest::get().uri("/health")).await;
        assert!(resp.status().is_success());

        let body: HealthResponse = test::read_body_json(resp).await;
        assert_eq!(body.status, "healthy");
        assert!(!body.model_loaded);
    }

    #[actix_web::test]
    async fn test_health_with_model() {
        let (ctx, _) = context(1.0, 3.0);
        let resp = call(state(Some(ctx)), test::TestRequest::get().uri("/health")).await;
        let body: HealthResponse = test::read_body_json(resp).await;
        assert!(body.model_loaded);
    }
}
