use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::*;

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = applications)]
pub struct Application {
    pub id: i32,
    pub company_name: String,
    pub position_title: String,
    pub job_url: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub status: String,
    pub date_applied: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = applications)]
pub struct NewApplication {
    pub company_name: String,
    pub position_title: String,
    pub job_url: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    pub status: String,
    pub date_applied: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = job_details)]
#[diesel(belongs_to(Application))]
pub struct JobDetail {
    pub id: i32,
    pub application_id: i32,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub clean_text_content: Option<String>,
    pub ai_advice: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = job_details)]
pub struct NewJobDetail {
    pub application_id: i32,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub clean_text_content: Option<String>,
    pub ai_advice: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = notes)]
#[diesel(belongs_to(Application))]
pub struct Note {
    pub id: i32,
    pub application_id: i32,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notes)]
pub struct NewNote {
    pub application_id: i32,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = deadlines)]
#[diesel(belongs_to(Application))]
pub struct Deadline {
    pub id: i32,
    pub application_id: i32,
    pub deadline_type: String,
    pub deadline_date: NaiveDateTime,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = deadlines)]
pub struct NewDeadline {
    pub application_id: i32,
    pub deadline_type: String,
    pub deadline_date: NaiveDateTime,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = activity_log)]
#[diesel(belongs_to(Application))]
pub struct ActivityRecord {
    pub id: i32,
    pub application_id: i32,
    pub activity_type: String,
    pub description: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = activity_log)]
pub struct NewActivityRecord {
    pub application_id: i32,
    pub activity_type: String,
    pub description: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub created_at: NaiveDateTime,
}
