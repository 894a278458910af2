//! Diesel schema for task persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional free-form description.
        description -> Nullable<Text>,
        /// Priority between 1 and 5.
        priority -> Int2,
        /// Current task status.
        #[max_length = 50]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Status transitions recorded for each task.
    task_logs (id) {
        /// Log entry identifier.
        id -> Uuid,
        /// Owning task identifier.
        task_id -> Uuid,
        /// Status reached by the task.
        #[max_length = 50]
        status -> Varchar,
        /// Time the status was reached.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(task_logs -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_logs);
