use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/challenges", challenge_routes())
        .nest("/images", image_routes())
}

fn challenge_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::challenge::create_challenge))
        .route(
            "/{challenge_id}",
            get(handlers::challenge::get_challenge)
                .patch(handlers::challenge::update_challenge)
                .delete(handlers::challenge::delete_challenge),
        )
        .route(
            "/participate/{challenge_id}",
            post(handlers::challenge::participate_challenge),
        )
        .route(
            "/cert/{challenge_id}",
            patch(handlers::challenge::certify_challenge),
        )
        .route(
            "/all/{category_id}",
            get(handlers::challenge::list_challenges_in_category),
        )
        .route("/titles", get(handlers::challenge::list_challenge_titles))
        .route("/search", get(handlers::challenge::search_challenges))
        .layer(handlers::challenge::image_upload_body_limit())
}

fn image_routes() -> Router<AppState> {
    Router::new().route("/{image_id}", get(handlers::image::download_image))
}
