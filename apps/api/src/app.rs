use crate::{
    config::Config,
    error::{ApiError, Result},
    ml::Embedder,
    routes::api_routes,
    services::{Catalog, RecommendationService},
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::info;
use std::{net::TcpListener, sync::Arc};

/// Everything request handlers need, built once at startup and shared read-only.
pub struct AppState {
    pub service: RecommendationService,
    pub top_k: usize,
}

impl AppState {
    /// Load the catalog, set up the embedder and, if enabled, embed the
    /// whole catalog up front.
    pub async fn build(config: &Config) -> Result<Self> {
        let catalog = Catalog::load(&config.dataset_path)
            .with_context(|| format!("Failed to load catalog {}", config.dataset_path.display()))?;

        let embedder = Embedder::from_config(config).context("Failed to initialize embedder")?;
        info!("Using embedder: {}", embedder.name());

        let mut service = RecommendationService::new(Arc::new(catalog), embedder);
        if config.prebuild_catalog_index {
            service
                .prebuild_catalog_index()
                .await
                .context("Failed to build catalog index")?;
        }

        Ok(Self {
            service,
            top_k: config.top_k,
        })
    }
}

/// Register JSON handling and every route on an actix app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::InvalidInput(err.to_string()).into()
    }))
    .service(api_routes());
}

pub struct Application {
    port: u16,
    host: String,
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: &Config) -> Self {
        Self {
            port: config.port,
            host: config.host.clone(),
            config: config.clone(),
        }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        let bind_address = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&bind_address)?;
        info!("Starting server at http://{}", bind_address);

        self.run_with_listener(listener).await
    }

    /// Run the server with a specific TCP listener
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        let state = web::Data::new(AppState::build(&self.config).await?);

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(state.clone())
                .configure(configure)
        })
        .listen(listener)?
        .run()
        .await?;

        Ok(())
    }
}
