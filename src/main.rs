use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use runline::core::KellyOptimizer;
use runline::handlers::{self, AppState};
use runline::{PredictionContext, ServerConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let config = ServerConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let addr = config.addr();

    info!(
        "Loading model {:?} with feature tables from {:?}",
        config.model_path, config.data_dir
    );

    let context = match PredictionContext::load(
        &config.model_path,
        &config.data_dir,
        config.spread_convention,
    ) {
        Ok(ctx) => Some(ctx),
        Err(e) => {
            warn!("Failed to load prediction context: {}. /predict will return 503.", e);
            None
        }
    };

    let app_state = Arc::new(AppState {
        context,
        optimizer: KellyOptimizer::new(config.solver),
    });

    info!("Starting Runline API server at http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
    })
    .bind(&addr)?
    .run()
    .await
}
