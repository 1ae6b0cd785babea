use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;

use crate::activity::{record_activity, ActivityKind};
use crate::error::{AppError, AppResult};
use crate::models::{Application, Deadline, NewDeadline};
use crate::schema::{applications, deadlines};
use crate::state::AppState;

/// Recommended deadline types. The column accepts any string; overdue,
/// incomplete deadlines are never auto-completed by time passing.
#[allow(dead_code)]
pub const SUGGESTED_DEADLINE_TYPES: &[&str] = &[
    "application",
    "interview",
    "assessment",
    "follow_up",
    "decision",
    "offer_response",
];

#[derive(Deserialize)]
pub struct CreateDeadlineRequest {
    pub deadline_type: String,
    pub deadline_date: NaiveDateTime,
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Deserialize)]
pub struct UpdateDeadlineRequest {
    pub deadline_type: Option<String>,
    pub deadline_date: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(AsChangeset)]
#[diesel(table_name = deadlines)]
struct DeadlineChangeset<'a> {
    deadline_type: Option<&'a str>,
    deadline_date: Option<NaiveDateTime>,
    description: Option<&'a str>,
    is_completed: Option<bool>,
    updated_at: NaiveDateTime,
}

pub async fn list_deadlines(
    State(state): State<AppState>,
    Path(application_id): Path<i32>,
) -> AppResult<Json<Vec<Deadline>>> {
    let mut conn = state.db()?;
    let application: Application = applications::table.find(application_id).first(&mut conn)?;
    let rows: Vec<Deadline> = Deadline::belonging_to(&application)
        .order((deadlines::deadline_date.asc(), deadlines::id.asc()))
        .load(&mut conn)?;
    Ok(Json(rows))
}

pub async fn create_deadline(
    State(state): State<AppState>,
    Path(application_id): Path<i32>,
    Json(payload): Json<CreateDeadlineRequest>,
) -> AppResult<(StatusCode, Json<Deadline>)> {
    let deadline_type = payload.deadline_type.trim();
    if deadline_type.is_empty() {
        return Err(AppError::constraint("deadline_type must not be empty"));
    }

    let mut conn = state.db()?;
    let _application: Application = applications::table.find(application_id).first(&mut conn)?;

    let now = Utc::now().naive_utc();
    let new_deadline = NewDeadline {
        application_id,
        deadline_type: deadline_type.to_string(),
        deadline_date: payload.deadline_date,
        description: payload.description,
        is_completed: payload.is_completed,
        created_at: now,
        updated_at: now,
    };

    let deadline = conn.transaction::<Deadline, AppError, _>(|conn| {
        let deadline: Deadline = diesel::insert_into(deadlines::table)
            .values(&new_deadline)
            .get_result(conn)?;
        record_activity(
            conn,
            application_id,
            ActivityKind::DeadlineAdded,
            format!(
                "Added {} deadline for {}",
                deadline.deadline_type,
                deadline.deadline_date.format("%Y-%m-%d")
            ),
        )?;
        Ok(deadline)
    })?;

    Ok((StatusCode::CREATED, Json(deadline)))
}

pub async fn update_deadline(
    State(state): State<AppState>,
    Path(deadline_id): Path<i32>,
    Json(payload): Json<UpdateDeadlineRequest>,
) -> AppResult<Json<Deadline>> {
    if let Some(deadline_type) = payload.deadline_type.as_deref() {
        if deadline_type.trim().is_empty() {
            return Err(AppError::constraint("deadline_type must not be empty"));
        }
    }

    let mut conn = state.db()?;
    let existing: Deadline = deadlines::table.find(deadline_id).first(&mut conn)?;

    let changeset = DeadlineChangeset {
        deadline_type: payload.deadline_type.as_deref().map(str::trim),
        deadline_date: payload.deadline_date,
        description: payload.description.as_deref(),
        is_completed: payload.is_completed,
        updated_at: Utc::now().naive_utc(),
    };

    let updated = conn.transaction::<Deadline, AppError, _>(|conn| {
        diesel::update(deadlines::table.find(existing.id))
            .set(&changeset)
            .execute(conn)?;

        let updated: Deadline = deadlines::table.find(existing.id).first(conn)?;

        // only a genuine flip is history-worthy
        if updated.is_completed != existing.is_completed {
            let kind = if updated.is_completed {
                ActivityKind::DeadlineCompleted
            } else {
                ActivityKind::DeadlineReopened
            };
            let verb = if updated.is_completed {
                "completed"
            } else {
                "reopened"
            };
            record_activity(
                conn,
                existing.application_id,
                kind,
                format!("{} deadline {verb}", updated.deadline_type),
            )?;
        }

        Ok(updated)
    })?;

    Ok(Json(updated))
}

pub async fn delete_deadline(
    State(state): State<AppState>,
    Path(deadline_id): Path<i32>,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    let existing: Deadline = deadlines::table.find(deadline_id).first(&mut conn)?;

    conn.transaction::<(), AppError, _>(|conn| {
        diesel::delete(deadlines::table.find(existing.id)).execute(conn)?;
        record_activity(
            conn,
            existing.application_id,
            ActivityKind::DeadlineDeleted,
            "Deleted a deadline",
        )?;
        Ok(())
    })?;

    Ok(StatusCode::NO_CONTENT)
}
