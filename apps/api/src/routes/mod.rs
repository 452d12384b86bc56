pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::paths::handlers as path_handlers;
use crate::quiz::handlers as quiz_handlers;
use crate::search::handlers as search_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Learning Path API
        .route(
            "/api/v1/learning-paths/generate",
            post(path_handlers::handle_generate_path),
        )
        .route(
            "/api/v1/learning-paths",
            get(path_handlers::handle_list_paths),
        )
        .route(
            "/api/v1/learning-paths/:id",
            get(path_handlers::handle_get_path).delete(path_handlers::handle_delete_path),
        )
        // Quiz API
        .route(
            "/api/v1/quizzes/generate",
            post(quiz_handlers::handle_generate_quiz),
        )
        .route(
            "/api/v1/quizzes/submit",
            post(quiz_handlers::handle_submit_quiz),
        )
        .route("/api/v1/quizzes", get(quiz_handlers::handle_list_quizzes))
        .route("/api/v1/quizzes/:id", get(quiz_handlers::handle_get_quiz))
        // Video Search API
        .route(
            "/api/v1/videos/search",
            post(search_handlers::handle_search_videos),
        )
        .route(
            "/api/v1/videos/setup-index",
            post(search_handlers::handle_setup_index),
        )
        .route(
            "/api/v1/videos/:id/index",
            post(search_handlers::handle_index_video)
                .delete(search_handlers::handle_remove_video_from_index),
        )
        .route(
            "/api/v1/videos/content/search",
            post(search_handlers::handle_search_content),
        )
        .with_state(state)
}
