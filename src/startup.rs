use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::handlers;
use crate::repositories::{MongoUserRepository, UserRepository};
use crate::services::{MongoDb, UserService};

#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    /// Build the production application: connect to MongoDB, ensure the
    /// unique email index, then bind the listener.
    pub async fn build(config: AppConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;
        db.ping().await.map_err(|e| {
            tracing::error!("MongoDB is not reachable: {}", e);
            e
        })?;
        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let repo: Arc<dyn UserRepository> = Arc::new(MongoUserRepository::new(db.users()));
        Self::with_repository(config, repo).await
    }

    /// Build the application over an arbitrary user store. Production wiring
    /// goes through [`Application::build`]; the test harness injects the
    /// in-memory store here.
    pub async fn with_repository(
        config: AppConfig,
        repo: Arc<dyn UserRepository>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            users: UserService::new(repo),
        };

        let app = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/user", post(handlers::register_user))
            .route(
                "/user/:id",
                get(handlers::get_user)
                    .put(handlers::update_user)
                    .delete(handlers::delete_user),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
