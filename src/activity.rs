use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::models::NewActivityRecord;
use crate::schema::activity_log;

/// Every user-visible mutation appends exactly one record of one of these
/// kinds. Records are append-only; nothing in the crate updates or rewrites
/// a row once inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    ApplicationCreated,
    StatusChange,
    NoteAdded,
    NoteUpdated,
    NoteDeleted,
    DeadlineAdded,
    DeadlineCompleted,
    DeadlineReopened,
    DeadlineDeleted,
    DetailsAdded,
    DetailsUpdated,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApplicationCreated => "application_created",
            Self::StatusChange => "status_change",
            Self::NoteAdded => "note_added",
            Self::NoteUpdated => "note_updated",
            Self::NoteDeleted => "note_deleted",
            Self::DeadlineAdded => "deadline_added",
            Self::DeadlineCompleted => "deadline_completed",
            Self::DeadlineReopened => "deadline_reopened",
            Self::DeadlineDeleted => "deadline_deleted",
            Self::DetailsAdded => "details_added",
            Self::DetailsUpdated => "details_updated",
        }
    }
}

/// Appends a history entry for a mutation. Must be called inside the same
/// transaction as the mutation it describes, so a failed append rolls the
/// data change back with it.
pub fn record_activity(
    conn: &mut SqliteConnection,
    application_id: i32,
    kind: ActivityKind,
    description: impl Into<String>,
) -> QueryResult<()> {
    record_activity_with_change(conn, application_id, kind, description, None, None)
}

pub fn record_activity_with_change(
    conn: &mut SqliteConnection,
    application_id: i32,
    kind: ActivityKind,
    description: impl Into<String>,
    old_value: Option<String>,
    new_value: Option<String>,
) -> QueryResult<()> {
    let record = NewActivityRecord {
        application_id,
        activity_type: kind.as_str().to_string(),
        description: description.into(),
        old_value,
        new_value,
        created_at: Utc::now().naive_utc(),
    };
    diesel::insert_into(activity_log::table)
        .values(&record)
        .execute(conn)?;
    Ok(())
}
