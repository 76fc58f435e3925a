use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::api::auth::CurrentUser;
use crate::error::AppError;
use crate::models::*;
use crate::services::Tracker;
use crate::state::AppState;

pub(super) async fn list_disciplines(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<DisciplineView>>, AppError> {
    let tracker = Tracker::new(state.db.clone());
    let list = tracker.list_disciplines(&user.id, state.clock.today()).await?;
    Ok(Json(list))
}

pub(super) async fn create_discipline(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<NewDisciplineRequest>,
) -> Result<(StatusCode, Json<DisciplineDetail>), AppError> {
    let tracker = Tracker::new(state.db.clone());
    let detail = tracker
        .create_discipline(&user.id, req, state.clock.today())
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub(super) async fn get_discipline(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DisciplineDetail>, AppError> {
    let tracker = Tracker::new(state.db.clone());
    let detail = tracker
        .discipline_detail(&user.id, &id, state.clock.today())
        .await?;
    Ok(Json(detail))
}

pub(super) async fn update_discipline(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateDisciplineRequest>,
) -> Result<Json<DisciplineView>, AppError> {
    let tracker = Tracker::new(state.db.clone());
    let view = tracker
        .update_discipline(&user.id, &id, req, state.clock.today())
        .await?;
    Ok(Json(view))
}

pub(super) async fn delete_discipline(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let tracker = Tracker::new(state.db.clone());
    tracker.delete_discipline(&user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn list_days(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<DayView>>, AppError> {
    let tracker = Tracker::new(state.db.clone());
    Ok(Json(tracker.discipline_days(&user.id, &id).await?))
}

pub(super) async fn add_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<NewTaskRequest>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let tracker = Tracker::new(state.db.clone());
    let task = tracker
        .add_task(&user.id, &id, req, state.clock.today())
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub(super) async fn update_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, AppError> {
    let tracker = Tracker::new(state.db.clone());
    let task = tracker
        .update_task(&user.id, &id, req, state.clock.today())
        .await?;
    Ok(Json(task))
}

pub(super) async fn remove_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let tracker = Tracker::new(state.db.clone());
    tracker
        .remove_task(&user.id, &id, state.clock.today())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn today(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DayView>, AppError> {
    let tracker = Tracker::new(state.db.clone());
    Ok(Json(tracker.today(&user.id, state.clock.today()).await?))
}

pub(super) async fn set_completion(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(task_id): Path<String>,
    Json(req): Json<SetCompletionRequest>,
) -> Result<Json<DayView>, AppError> {
    let tracker = Tracker::new(state.db.clone());
    let day = tracker
        .set_task_completion(&user.id, &task_id, req.is_completed, state.clock.today())
        .await?;
    Ok(Json(day))
}
