diesel::table! {
    activity_log (id) {
        id -> Integer,
        application_id -> Integer,
        activity_type -> Text,
        description -> Text,
        old_value -> Nullable<Text>,
        new_value -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    applications (id) {
        id -> Integer,
        company_name -> Text,
        position_title -> Text,
        job_url -> Nullable<Text>,
        location -> Nullable<Text>,
        salary -> Nullable<Text>,
        status -> Text,
        date_applied -> Timestamp,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    deadlines (id) {
        id -> Integer,
        application_id -> Integer,
        deadline_type -> Text,
        deadline_date -> Timestamp,
        description -> Nullable<Text>,
        is_completed -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    job_details (id) {
        id -> Integer,
        application_id -> Integer,
        description -> Nullable<Text>,
        requirements -> Nullable<Text>,
        clean_text_content -> Nullable<Text>,
        ai_advice -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    notes (id) {
        id -> Integer,
        application_id -> Integer,
        content -> Text,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::joinable!(activity_log -> applications (application_id));
diesel::joinable!(deadlines -> applications (application_id));
diesel::joinable!(job_details -> applications (application_id));
diesel::joinable!(notes -> applications (application_id));

diesel::allow_tables_to_appear_in_same_query!(
    activity_log,
    applications,
    deadlines,
    job_details,
    notes,
);
