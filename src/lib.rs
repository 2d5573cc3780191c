use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::Key;

use crate::{
    config::Settings,
    database::DatabasePool,
    error::ApiError,
    repositories::{
        DocumentRepository, InMemoryDocumentRepository, InMemorySearchLogRepository,
        InMemoryUserRepository, SearchLogRepository, SqlxDocumentRepository,
        SqlxSearchLogRepository, SqlxUserRepository, UserRepository,
    },
    services::{
        AuthService, BlobStorage, DocumentService, ModerationService, SearchService,
        ThumbnailGenerator,
    },
};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

/// Room for multipart boundaries and the text fields on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    /// `None` when running on the in-memory store.
    pub db_pool: Option<DatabasePool>,
    pub document_repository: Arc<dyn DocumentRepository + Send + Sync>,
    pub search_log_repository: Arc<dyn SearchLogRepository + Send + Sync>,
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub storage: Arc<BlobStorage>,
    pub document_service: Arc<DocumentService>,
    pub search_service: Arc<SearchService>,
    pub moderation_service: Arc<ModerationService>,
    pub auth_service: Arc<AuthService>,
    pub key: Key,
}

// Lets PrivateCookieJar pull its key out of the state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

impl AppState {
    /// Builds the state on PostgreSQL, or on the in-memory store for a `memory:` URL.
    pub async fn new(config: Settings) -> Result<Self, ApiError> {
        if config.uses_memory_store() {
            tracing::info!("using the in-memory store, data is not persisted");
            return Self::new_with_repositories(
                config,
                None,
                Arc::new(InMemoryDocumentRepository::new()),
                Arc::new(InMemorySearchLogRepository::new()),
                Arc::new(InMemoryUserRepository::new()),
            )
            .await;
        }

        let db_pool = crate::database::create_connection_pool(
            &config.database_url,
            config.database_max_connections,
        )
        .await?;
        Self::new_with_pool(config, db_pool).await
    }

    /// Create new application state with existing database pool
    pub async fn new_with_pool(config: Settings, db_pool: DatabasePool) -> Result<Self, ApiError> {
        Self::new_with_repositories(
            config,
            Some(db_pool.clone()),
            Arc::new(SqlxDocumentRepository::new(db_pool.clone())),
            Arc::new(SqlxSearchLogRepository::new(db_pool.clone())),
            Arc::new(SqlxUserRepository::new(db_pool)),
        )
        .await
    }

    pub async fn new_with_repositories(
        config: Settings,
        db_pool: Option<DatabasePool>,
        document_repository: Arc<dyn DocumentRepository + Send + Sync>,
        search_log_repository: Arc<dyn SearchLogRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
    ) -> Result<Self, ApiError> {
        let key = Key::try_from(config.auth_secret.as_bytes())
            .map_err(|e| ApiError::Configuration(format!("Invalid auth_secret: {}", e)))?;
        let config = Arc::new(config);

        let storage = Arc::new(BlobStorage::new(&config.media_root));
        storage.ensure_dirs().await?;

        let thumbnails = ThumbnailGenerator::new(
            storage.clone(),
            config.thumbnail_max_dimension,
            config.thumbnail_quality,
        );

        let document_service = Arc::new(DocumentService::new(
            document_repository.clone(),
            storage.clone(),
            thumbnails,
        ));

        let search_service = Arc::new(SearchService::new(
            document_repository.clone(),
            search_log_repository.clone(),
            config.search_page_size,
        ));

        let moderation_service = Arc::new(ModerationService::new(
            document_repository.clone(),
            search_log_repository.clone(),
            storage.clone(),
            config.dashboard_search_log_limit,
        ));

        let auth_service = Arc::new(AuthService::new(config.clone(), user_repository.clone()));
        auth_service.ensure_admin().await?;

        Ok(Self {
            config,
            db_pool,
            document_repository,
            search_log_repository,
            user_repository,
            storage,
            document_service,
            search_service,
            moderation_service,
            auth_service,
            key,
        })
    }
}

/// All routes with their access layers and the global middleware stack
pub fn create_router(app_state: AppState) -> Router {
    let config = app_state.config.clone();

    let public_routes = Router::new()
        .route("/", get(handlers::home_handlers::home))
        .route("/search/", get(handlers::search_handlers::search))
        .route("/document/:id/", get(handlers::document_handlers::get_document))
        .route("/media/thumbnails/:name", get(handlers::serve_thumbnail))
        .route(
            "/auth/login/",
            get(handlers::auth_handlers::login_page).post(handlers::auth_handlers::login),
        )
        .route("/auth/logout/", post(handlers::auth_handlers::logout))
        .route("/health", get(handlers::health_check))
        .route("/health/ready", get(handlers::readiness_check));

    let login_routes = Router::new()
        .route(
            "/document/add/",
            get(handlers::document_handlers::add_document_form)
                .post(handlers::document_handlers::add_document),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::require_login,
        ));

    let staff_routes = Router::new()
        .route(
            "/document/:id/download/",
            get(handlers::document_handlers::download_document),
        )
        .route("/admin/dashboard/", get(handlers::admin_handlers::dashboard))
        .route(
            "/admin/dashboard/document/:id/toggle/",
            get(handlers::admin_handlers::toggle_document)
                .post(handlers::admin_handlers::toggle_document),
        )
        .route(
            "/admin/dashboard/document/:id/delete/",
            get(handlers::admin_handlers::delete_document_preview)
                .post(handlers::admin_handlers::delete_document),
        )
        .route(
            "/admin/dashboard/document/:id/edit/",
            get(handlers::admin_handlers::edit_document_form)
                .post(handlers::admin_handlers::edit_document),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::require_staff,
        ));

    let body_limit = usize::try_from(config.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .merge(public_routes)
        .merge(login_routes)
        .merge(staff_routes)
        .with_state(app_state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(
            middleware::request_logging_middleware,
        ))
        .layer(middleware::create_logging_layer())
        .layer(middleware::create_cors_layer(&config.cors_allow_origins))
}
