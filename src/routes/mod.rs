pub mod health;
pub mod users;
pub mod validation;
pub mod videos;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub use health::health_check;
pub use users::{login, signup};
pub use videos::{delete_video, get_video, list_videos, save_video};

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
}

/// Build the application router
///
/// - `GET /health`
/// - `POST /signup`, `POST /login`
/// - `GET|POST /videos`
/// - `GET|DELETE /videos/:videoId`
pub fn create_app(state: AppState) -> Router {
    let log_requests = state.config.log_requests;
    let cors = cors_layer(&state.config.allowed_origins);

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/videos", get(list_videos).post(save_video))
        .route("/videos/:video_id", get(get_video).delete(delete_video))
        .layer(cors)
        .with_state(state);

    if log_requests {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}
