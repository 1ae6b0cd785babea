use axum::{extract::State, http::header, response::IntoResponse};
use diesel::prelude::*;

use crate::error::AppResult;
use crate::models::{Application, Note};
use crate::schema::{applications, notes};
use crate::state::AppState;

/// Plain CSV dump of the application list, newest first, with each row's
/// most recent note appended.
pub async fn export_csv(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let rows: Vec<Application> = applications::table
        .order((applications::created_at.desc(), applications::id.desc()))
        .load(&mut conn)?;

    let mut csv = String::from(
        "id,company,position,location,salary,status,date_applied,job_url,latest_note\n",
    );
    for application in &rows {
        let latest_note: Option<Note> = Note::belonging_to(application)
            .order((notes::created_at.desc(), notes::id.desc()))
            .first(&mut conn)
            .optional()?;

        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            application.id,
            csv_field(&application.company_name),
            csv_field(&application.position_title),
            csv_field(application.location.as_deref().unwrap_or_default()),
            csv_field(application.salary.as_deref().unwrap_or_default()),
            csv_field(&application.status),
            application.date_applied.format("%Y-%m-%d"),
            csv_field(application.job_url.as_deref().unwrap_or_default()),
            csv_field(latest_note.as_ref().map(|note| note.content.as_str()).unwrap_or_default()),
        ));
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"applications.csv\"",
            ),
        ],
        csv,
    ))
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
