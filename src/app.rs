use std::net::SocketAddr;

use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    auth,
    classifications::RecipeClassification,
    config::AppConfig,
    customers::Customer,
    error::{attach_request_url, not_found_fallback},
    ingredients::Ingredient,
    recipes::Recipe,
    resource::handlers::routes,
    reviews::{RecipeReview, WeeklyMenuReview},
    state::AppState,
    weekly_menus::{self, WeeklyMenu},
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(routes::<RecipeClassification>())
        .merge(routes::<Recipe>())
        .merge(routes::<Ingredient>())
        .merge(routes::<RecipeReview>())
        .merge(routes::<WeeklyMenuReview>())
        .merge(routes::<Customer>())
        .merge(routes::<WeeklyMenu>())
        .merge(weekly_menus::handlers::menu_recipe_routes())
        .route("/health", get(|| async { "ok" }))
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .fallback(not_found_fallback)
        .with_state(state)
        .layer(middleware::from_fn(attach_request_url))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
