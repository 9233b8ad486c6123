pub mod config;
pub mod middleware;

use crate::{
    config::Config,
    database::{
        DatabaseHealthChecker, DatabaseManager, DatabaseManagerImpl, DatabaseSubscriptionStore,
    },
    error::AppError,
    health::HealthService,
    mrr::{MrrService, SubscriptionStore},
    routes::{create_health_routes, create_mrr_routes},
    server::middleware::{cors, request_response_logger},
    shutdown::ShutdownCoordinator,
};
use axum::{Router, middleware::from_fn};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Clone)]
pub struct Server {
    pub config: Arc<Config>,
    pub database: Arc<dyn DatabaseManager>,
    pub health_service: Arc<HealthService>,
    pub mrr_service: Arc<MrrService>,
    pub shutdown_coordinator: Arc<ShutdownCoordinator>,
}

impl Server {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        let database: Arc<dyn DatabaseManager> = Arc::new(
            DatabaseManagerImpl::new_from_config(&config.database)
                .await
                .map_err(AppError::Database)?,
        );
        let store: Arc<dyn SubscriptionStore> =
            Arc::new(DatabaseSubscriptionStore::new(database.clone()));

        Ok(Self::with_store(config, database, store).await)
    }

    /// Assemble a server around an explicit subscription store
    pub async fn with_store(
        config: Config,
        database: Arc<dyn DatabaseManager>,
        store: Arc<dyn SubscriptionStore>,
    ) -> Self {
        let mrr_service = Arc::new(MrrService::new(store, config.mrr.clone()));

        let health_service = Arc::new(HealthService::new());
        health_service
            .register(Arc::new(DatabaseHealthChecker::new(database.clone())))
            .await;
        health_service.register(mrr_service.clone()).await;

        Self {
            config: Arc::new(config),
            database,
            health_service,
            mrr_service,
            shutdown_coordinator: Arc::new(ShutdownCoordinator::new()),
        }
    }

    pub async fn run(&self) -> Result<(), AppError> {
        if self.config.database.migration_on_startup {
            info!("Running database migrations");
            self.database.migrate().await.map_err(AppError::Database)?;
        }

        let app = self.create_app();

        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

        info!("MRR API listening on http://{}", addr);

        let shutdown_coordinator = self.shutdown_coordinator.clone();
        tokio::spawn(async move {
            shutdown_coordinator.wait_for_shutdown_signal().await;
        });

        let shutdown = self.shutdown_coordinator.clone();
        let result = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown.wait_for_shutdown().await;
            info!("Graceful shutdown initiated");
        })
        .await;

        if let Err(e) = result {
            error!("Server error: {}", e);
            return Err(AppError::Internal(format!("Server error: {}", e)));
        }

        info!("Server shutdown complete");
        Ok(())
    }

    // Creates an application router
    pub fn create_app(&self) -> Router {
        let mut app = Router::new()
            .nest(
                "/health",
                create_health_routes().with_state(self.health_service.clone()),
            )
            .nest(
                "/api/health",
                create_health_routes().with_state(self.health_service.clone()),
            )
            .nest(
                "/api",
                create_mrr_routes().with_state(self.mrr_service.clone()),
            )
            .layer(from_fn(cors));

        if self.config.logging.log_request {
            app = app.layer(from_fn(request_response_logger));
        }
        app
    }
}
