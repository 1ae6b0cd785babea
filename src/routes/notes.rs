use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;

use crate::activity::{record_activity, ActivityKind};
use crate::error::{AppError, AppResult};
use crate::models::{Application, NewNote, Note};
use crate::schema::{applications, notes};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NoteRequest {
    pub content: String,
}

pub async fn list_notes(
    State(state): State<AppState>,
    Path(application_id): Path<i32>,
) -> AppResult<Json<Vec<Note>>> {
    let mut conn = state.db()?;
    let application: Application = applications::table.find(application_id).first(&mut conn)?;
    let rows: Vec<Note> = Note::belonging_to(&application)
        .order((notes::created_at.asc(), notes::id.asc()))
        .load(&mut conn)?;
    Ok(Json(rows))
}

pub async fn create_note(
    State(state): State<AppState>,
    Path(application_id): Path<i32>,
    Json(payload): Json<NoteRequest>,
) -> AppResult<(StatusCode, Json<Note>)> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::constraint("note content must not be empty"));
    }

    let mut conn = state.db()?;
    let _application: Application = applications::table.find(application_id).first(&mut conn)?;

    let now = Utc::now().naive_utc();
    let new_note = NewNote {
        application_id,
        content: content.to_string(),
        created_at: now,
        updated_at: now,
    };

    let note = conn.transaction::<Note, AppError, _>(|conn| {
        let note: Note = diesel::insert_into(notes::table)
            .values(&new_note)
            .get_result(conn)?;
        record_activity(conn, application_id, ActivityKind::NoteAdded, "Added a new note")?;
        Ok(note)
    })?;

    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn update_note(
    State(state): State<AppState>,
    Path(note_id): Path<i32>,
    Json(payload): Json<NoteRequest>,
) -> AppResult<Json<Note>> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::constraint("note content must not be empty"));
    }

    let mut conn = state.db()?;
    let existing: Note = notes::table.find(note_id).first(&mut conn)?;

    let updated = conn.transaction::<Note, AppError, _>(|conn| {
        diesel::update(notes::table.find(existing.id))
            .set((
                notes::content.eq(content),
                notes::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;
        record_activity(
            conn,
            existing.application_id,
            ActivityKind::NoteUpdated,
            "Updated a note",
        )?;
        let updated: Note = notes::table.find(existing.id).first(conn)?;
        Ok(updated)
    })?;

    Ok(Json(updated))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(note_id): Path<i32>,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;
    let existing: Note = notes::table.find(note_id).first(&mut conn)?;

    conn.transaction::<(), AppError, _>(|conn| {
        diesel::delete(notes::table.find(existing.id)).execute(conn)?;
        record_activity(
            conn,
            existing.application_id,
            ActivityKind::NoteDeleted,
            "Deleted a note",
        )?;
        Ok(())
    })?;

    Ok(StatusCode::NO_CONTENT)
}
