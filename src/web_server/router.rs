//! Axum router construction.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::uploads::MAX_UPLOAD_SIZE;
use crate::web_server::handlers;
use crate::web_server::state::SharedState;

/// Room for multipart framing around a maximum-size file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build the complete Axum router with all API routes and upload serving.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        // Health
        .route("/api/health", get(handlers::health::health_handler))
        // Auth
        .route("/api/auth/login", post(handlers::auth::login_handler))
        .route("/api/auth/logout", post(handlers::auth::logout_handler))
        .route("/api/auth/session", get(handlers::auth::session_handler))
        .route(
            "/api/auth/credentials",
            put(handlers::auth::update_credentials_handler),
        )
        // Dashboard and message triage
        .route(
            "/api/dashboard/stats",
            get(handlers::dashboard::stats_handler),
        )
        .route(
            "/api/messages",
            get(handlers::messages::list_messages_handler),
        )
        .route(
            "/api/messages/mark-read",
            post(handlers::messages::mark_read_handler),
        )
        .route(
            "/api/contact",
            post(handlers::contact::submit_contact_handler),
        )
        // Singletons
        .route(
            "/api/profile",
            get(handlers::profile::get_profile_handler)
                .put(handlers::profile::update_profile_handler),
        )
        .route(
            "/api/contact-info",
            get(handlers::contact_info::get_contact_info_handler)
                .put(handlers::contact_info::update_contact_info_handler),
        )
        // Projects
        .route(
            "/api/projects",
            get(handlers::projects::list_projects_handler)
                .post(handlers::projects::create_project_handler),
        )
        .route(
            "/api/projects/:id",
            get(handlers::projects::get_project_handler)
                .put(handlers::projects::update_project_handler)
                .delete(handlers::projects::delete_project_handler),
        )
        // Experiences
        .route(
            "/api/experiences",
            get(handlers::experiences::list_experiences_handler)
                .post(handlers::experiences::create_experience_handler),
        )
        .route(
            "/api/experiences/:id",
            get(handlers::experiences::get_experience_handler)
                .put(handlers::experiences::update_experience_handler)
                .delete(handlers::experiences::delete_experience_handler),
        )
        // Skills
        .route(
            "/api/skills",
            get(handlers::skills::list_skills_handler)
                .post(handlers::skills::create_skill_handler),
        )
        .route(
            "/api/skills/:id",
            get(handlers::skills::get_skill_handler)
                .put(handlers::skills::update_skill_handler)
                .delete(handlers::skills::delete_skill_handler),
        )
        // Achievements
        .route(
            "/api/achievements",
            get(handlers::achievements::list_achievements_handler)
                .post(handlers::achievements::create_achievement_handler),
        )
        .route(
            "/api/achievements/:id",
            get(handlers::achievements::get_achievement_handler)
                .put(handlers::achievements::update_achievement_handler)
                .delete(handlers::achievements::delete_achievement_handler),
        )
        // Goals
        .route(
            "/api/goals",
            get(handlers::goals::list_goals_handler).post(handlers::goals::create_goal_handler),
        )
        .route(
            "/api/goals/:id",
            get(handlers::goals::get_goal_handler)
                .put(handlers::goals::update_goal_handler)
                .delete(handlers::goals::delete_goal_handler),
        )
        // Uploads
        .route(
            "/api/uploads",
            post(handlers::uploads::upload_handler)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE as usize + MULTIPART_OVERHEAD)),
        )
        .route(
            "/api/uploads/:name",
            delete(handlers::uploads::delete_upload_handler),
        )
        .route(
            "/uploads/:name",
            get(handlers::uploads::serve_upload_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
