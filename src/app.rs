use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::filters::{default_registry, FilterRegistry};
use crate::jwt::JwtConfig;
use crate::models::produtor::ProdutorRural;
use crate::models::propriedade::Propriedade;
use crate::models::rebanho::Rebanho;
use crate::models::unidade_producao::UnidadeProducao;
use crate::routes::{auth, dashboard, health, reports, resources, users};
use crate::service::Resource;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: Arc<JwtConfig>,
    pub filters: Arc<FilterRegistry>,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt: JwtConfig) -> Self {
        Self {
            pool,
            jwt: Arc::new(jwt),
            filters: Arc::new(default_registry()),
        }
    }
}

pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let jwt_config = JwtConfig::from_env()?;
    Ok(router(AppState::new(pool, jwt_config)))
}

/// `/{NAME}` and `/{NAME}/:id` CRUD routes for one resource.
fn resource_routes<R: Resource>() -> Router<AppState> {
    Router::new()
        .route(
            &format!("/{}", R::NAME),
            get(resources::index::<R>).post(resources::store::<R>),
        )
        .route(
            &format!("/{}/:id", R::NAME),
            get(resources::show::<R>)
                .put(resources::update::<R>)
                .delete(resources::destroy::<R>),
        )
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout));

    let user_routes = Router::new()
        .route("/", get(users::index).post(users::store))
        .route("/:id", get(users::show).put(users::update).delete(users::destroy));

    let report_routes = Router::new()
        .route("/propriedades-por-municipio", get(reports::propriedades_por_municipio))
        .route("/animais-por-especie", get(reports::animais_por_especie))
        .route("/hectares-por-cultura", get(reports::hectares_por_cultura));

    Router::new()
        .route("/api/health", get(health::health))
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/relatorios", report_routes)
        .route("/dashboard/stats", get(dashboard::stats))
        .merge(resource_routes::<ProdutorRural>())
        .merge(resource_routes::<Propriedade>())
        .merge(resource_routes::<Rebanho>())
        .merge(resource_routes::<UnidadeProducao>())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
