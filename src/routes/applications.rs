use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::activity::{record_activity, record_activity_with_change, ActivityKind};
use crate::error::{AppError, AppResult};
use crate::models::{
    ActivityRecord, Application, Deadline, JobDetail, NewApplication, NewJobDetail, Note,
};
use crate::schema::{activity_log, applications, deadlines, job_details, notes};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateApplicationRequest {
    pub company_name: String,
    pub position_title: String,
    pub job_url: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub status: Option<String>,
    pub date_applied: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
pub struct UpdateApplicationRequest {
    pub company_name: Option<String>,
    pub position_title: Option<String>,
    pub job_url: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub status: Option<String>,
    pub date_applied: Option<NaiveDateTime>,
}

#[derive(AsChangeset)]
#[diesel(table_name = applications)]
struct ApplicationChangeset<'a> {
    company_name: Option<&'a str>,
    position_title: Option<&'a str>,
    job_url: Option<&'a str>,
    location: Option<&'a str>,
    salary: Option<&'a str>,
    status: Option<&'a str>,
    date_applied: Option<NaiveDateTime>,
    updated_at: NaiveDateTime,
}

/// One consistent snapshot of an application and everything it owns.
#[derive(Serialize)]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub application: Application,
    pub job_details: Option<JobDetail>,
    pub notes: Vec<Note>,
    pub deadlines: Vec<Deadline>,
    pub activity: Vec<ActivityRecord>,
}

pub async fn list_applications(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Application>>> {
    let mut conn = state.db()?;
    let rows: Vec<Application> = applications::table
        .order((applications::created_at.desc(), applications::id.desc()))
        .load(&mut conn)?;
    Ok(Json(rows))
}

pub async fn create_application(
    State(state): State<AppState>,
    Json(payload): Json<CreateApplicationRequest>,
) -> AppResult<(StatusCode, Json<Application>)> {
    let company_name = payload.company_name.trim();
    let position_title = payload.position_title.trim();
    if company_name.is_empty() {
        return Err(AppError::constraint("company_name must not be empty"));
    }
    if position_title.is_empty() {
        return Err(AppError::constraint("position_title must not be empty"));
    }

    let now = Utc::now().naive_utc();
    let new_application = NewApplication {
        company_name: company_name.to_string(),
        position_title: position_title.to_string(),
        job_url: payload.job_url,
        location: payload.location,
        salary: payload.salary,
        status: payload
            .status
            .map(|status| status.trim().to_string())
            .filter(|status| !status.is_empty())
            .unwrap_or_else(|| "Applied".to_string()),
        date_applied: payload.date_applied.unwrap_or(now),
        created_at: now,
        updated_at: now,
    };

    let mut conn = state.db()?;
    let application = conn.transaction::<Application, AppError, _>(|conn| {
        let application: Application = diesel::insert_into(applications::table)
            .values(&new_application)
            .get_result(conn)?;
        record_activity(
            conn,
            application.id,
            ActivityKind::ApplicationCreated,
            format!(
                "Applied to {} at {}",
                application.position_title, application.company_name
            ),
        )?;
        Ok(application)
    })?;

    tracing::info!(
        application_id = application.id,
        company = %application.company_name,
        "created application"
    );
    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn get_application(
    State(state): State<AppState>,
    Path(application_id): Path<i32>,
) -> AppResult<Json<ApplicationDetail>> {
    let mut conn = state.db()?;

    let detail = conn.transaction::<ApplicationDetail, AppError, _>(|conn| {
        let application: Application = applications::table.find(application_id).first(conn)?;

        let details: Option<JobDetail> = JobDetail::belonging_to(&application)
            .first(conn)
            .optional()?;
        let note_rows: Vec<Note> = Note::belonging_to(&application)
            .order((notes::created_at.asc(), notes::id.asc()))
            .load(conn)?;
        let deadline_rows: Vec<Deadline> = Deadline::belonging_to(&application)
            .order((deadlines::deadline_date.asc(), deadlines::id.asc()))
            .load(conn)?;
        let activity_rows: Vec<ActivityRecord> = ActivityRecord::belonging_to(&application)
            .order((activity_log::created_at.asc(), activity_log::id.asc()))
            .load(conn)?;

        Ok(ApplicationDetail {
            application,
            job_details: details,
            notes: note_rows,
            deadlines: deadline_rows,
            activity: activity_rows,
        })
    })?;

    Ok(Json(detail))
}

pub async fn update_application(
    State(state): State<AppState>,
    Path(application_id): Path<i32>,
    Json(payload): Json<UpdateApplicationRequest>,
) -> AppResult<Json<Application>> {
    if let Some(name) = payload.company_name.as_deref() {
        if name.trim().is_empty() {
            return Err(AppError::constraint("company_name must not be empty"));
        }
    }
    if let Some(title) = payload.position_title.as_deref() {
        if title.trim().is_empty() {
            return Err(AppError::constraint("position_title must not be empty"));
        }
    }

    let mut conn = state.db()?;
    let existing: Application = applications::table.find(application_id).first(&mut conn)?;

    let new_status = payload
        .status
        .as_deref()
        .map(str::trim)
        .filter(|status| !status.is_empty() && *status != existing.status);

    let changeset = ApplicationChangeset {
        company_name: payload.company_name.as_deref().map(str::trim),
        position_title: payload.position_title.as_deref().map(str::trim),
        job_url: payload.job_url.as_deref(),
        location: payload.location.as_deref(),
        salary: payload.salary.as_deref(),
        status: new_status,
        date_applied: payload.date_applied,
        updated_at: Utc::now().naive_utc(),
    };

    let updated = conn.transaction::<Application, AppError, _>(|conn| {
        diesel::update(applications::table.find(application_id))
            .set(&changeset)
            .execute(conn)?;

        if let Some(status) = new_status {
            record_activity_with_change(
                conn,
                application_id,
                ActivityKind::StatusChange,
                format!("Status changed from {} to {}", existing.status, status),
                Some(existing.status.clone()),
                Some(status.to_string()),
            )?;
            tracing::info!(
                application_id,
                old_status = %existing.status,
                new_status = %status,
                "status changed"
            );
        }

        let updated: Application = applications::table.find(application_id).first(conn)?;
        Ok(updated)
    })?;

    Ok(Json(updated))
}

pub async fn delete_application(
    State(state): State<AppState>,
    Path(application_id): Path<i32>,
) -> AppResult<StatusCode> {
    let mut conn = state.db()?;

    conn.transaction::<(), AppError, _>(|conn| {
        let application: Application = applications::table.find(application_id).first(conn)?;

        // children first, so the cascade holds even without the FK pragma
        diesel::delete(
            activity_log::table.filter(activity_log::application_id.eq(application.id)),
        )
        .execute(conn)?;
        diesel::delete(deadlines::table.filter(deadlines::application_id.eq(application.id)))
            .execute(conn)?;
        diesel::delete(notes::table.filter(notes::application_id.eq(application.id)))
            .execute(conn)?;
        diesel::delete(job_details::table.filter(job_details::application_id.eq(application.id)))
            .execute(conn)?;
        diesel::delete(applications::table.find(application.id)).execute(conn)?;
        Ok(())
    })?;

    tracing::info!(application_id, "deleted application and owned records");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct JobDetailsRequest {
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub clean_text_content: Option<String>,
    pub ai_advice: Option<String>,
}

#[derive(AsChangeset)]
#[diesel(table_name = job_details)]
struct JobDetailChangeset<'a> {
    description: Option<&'a str>,
    requirements: Option<&'a str>,
    clean_text_content: Option<&'a str>,
    ai_advice: Option<&'a str>,
    updated_at: NaiveDateTime,
}

/// Upsert: creates the single details row when none exists, updates in place
/// when one does.
pub async fn upsert_job_details(
    State(state): State<AppState>,
    Path(application_id): Path<i32>,
    Json(payload): Json<JobDetailsRequest>,
) -> AppResult<(StatusCode, Json<JobDetail>)> {
    let mut conn = state.db()?;
    let application: Application = applications::table.find(application_id).first(&mut conn)?;

    let now = Utc::now().naive_utc();
    let (status, detail) = conn.transaction::<(StatusCode, JobDetail), AppError, _>(|conn| {
        let existing: Option<JobDetail> =
            JobDetail::belonging_to(&application).first(conn).optional()?;

        match existing {
            Some(existing) => {
                let changeset = JobDetailChangeset {
                    description: payload.description.as_deref(),
                    requirements: payload.requirements.as_deref(),
                    clean_text_content: payload.clean_text_content.as_deref(),
                    ai_advice: payload.ai_advice.as_deref(),
                    updated_at: now,
                };
                diesel::update(job_details::table.find(existing.id))
                    .set(&changeset)
                    .execute(conn)?;
                record_activity(
                    conn,
                    application_id,
                    ActivityKind::DetailsUpdated,
                    "Updated job details",
                )?;
                let updated: JobDetail = job_details::table.find(existing.id).first(conn)?;
                Ok((StatusCode::OK, updated))
            }
            None => {
                let new_detail = NewJobDetail {
                    application_id,
                    description: payload.description,
                    requirements: payload.requirements,
                    clean_text_content: payload.clean_text_content,
                    ai_advice: payload.ai_advice,
                    created_at: now,
                    updated_at: now,
                };
                let created: JobDetail = diesel::insert_into(job_details::table)
                    .values(&new_detail)
                    .get_result(conn)?;
                record_activity(
                    conn,
                    application_id,
                    ActivityKind::DetailsAdded,
                    "Added job details",
                )?;
                Ok((StatusCode::CREATED, created))
            }
        }
    })?;

    Ok((status, Json(detail)))
}

pub async fn list_activity(
    State(state): State<AppState>,
    Path(application_id): Path<i32>,
) -> AppResult<Json<Vec<ActivityRecord>>> {
    let mut conn = state.db()?;
    let application: Application = applications::table.find(application_id).first(&mut conn)?;
    let rows: Vec<ActivityRecord> = ActivityRecord::belonging_to(&application)
        .order((activity_log::created_at.asc(), activity_log::id.asc()))
        .load(&mut conn)?;
    Ok(Json(rows))
}
