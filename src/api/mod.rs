pub mod auth;
mod disciplines;
mod users;

use std::sync::Arc;

use axum::Json;
use axum::routing::{patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::error::AppError;
use crate::services::{DailyJobs, ReminderStats, RolloverStats};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users", post(users::register))
        .route("/me", get(users::me).patch(users::update_me))
        .route(
            "/disciplines",
            get(disciplines::list_disciplines).post(disciplines::create_discipline),
        )
        .route(
            "/disciplines/{id}",
            get(disciplines::get_discipline)
                .patch(disciplines::update_discipline)
                .delete(disciplines::delete_discipline),
        )
        .route("/disciplines/{id}/days", get(disciplines::list_days))
        .route("/disciplines/{id}/tasks", post(disciplines::add_task))
        .route(
            "/tasks/{id}",
            patch(disciplines::update_task).delete(disciplines::remove_task),
        )
        .route("/days/today", get(disciplines::today))
        .route(
            "/days/today/tasks/{task_id}",
            patch(disciplines::set_completion),
        )
        .route("/jobs/rollover", post(run_rollover))
        .route("/jobs/reminders", post(run_reminders))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn run_rollover(State(state): State<AppState>) -> Result<Json<RolloverStats>, AppError> {
    let jobs = DailyJobs::new(state.db.clone(), Arc::clone(&state.notifier));
    let stats = jobs.rollover(state.clock.today()).await?;
    Ok(Json(stats))
}

async fn run_reminders(State(state): State<AppState>) -> Result<Json<ReminderStats>, AppError> {
    let jobs = DailyJobs::new(state.db.clone(), Arc::clone(&state.notifier));
    let stats = jobs.send_reminders(state.clock.today()).await?;
    Ok(Json(stats))
}
