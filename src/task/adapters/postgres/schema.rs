//! Diesel schema for task persistence.

diesel::table! {
    /// Task records, one row per task including soft-deleted ones.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Trimmed task title.
        #[max_length = 120]
        title -> Varchar,
        /// Task description, possibly empty.
        #[max_length = 500]
        description -> Varchar,
        /// Lifecycle status in storage form.
        #[max_length = 20]
        status -> Varchar,
        /// Priority in storage form.
        #[max_length = 20]
        priority -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Timestamptz>,
        /// Timestamp of the latest transition into done.
        completed_at -> Nullable<Timestamptz>,
        /// Soft-delete marker.
        is_deleted -> Bool,
        /// Soft-delete timestamp.
        deleted_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
