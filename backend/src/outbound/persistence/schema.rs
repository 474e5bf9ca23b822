//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Enumerations are
//! stored as short lowercase strings guarded by `CHECK` constraints.

diesel::table! {
    /// Registered marketplace users keyed by normalised email.
    users (id) {
        id -> Uuid,
        /// Unique, trimmed, lower-cased.
        email -> Varchar,
        /// `customer`, `agent` or `admin`.
        role -> Varchar,
        /// `none`, `requested`, `verified` or `fraud`.
        status -> Varchar,
        name -> Nullable<Text>,
        photo_url -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Read-only mirror of listings: existence, moderation state and owner.
    properties (id) {
        id -> Uuid,
        verification -> Varchar,
        owner_email -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Purchase offers. A partial unique index allows one `accepted` row per
    /// `property_id`.
    offers (id) {
        id -> Uuid,
        property_id -> Uuid,
        user_email -> Varchar,
        amount -> Int8,
        /// `pending`, `accepted` or `rejected`.
        bought_status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(offers -> properties (property_id));
diesel::allow_tables_to_appear_in_same_query!(users, properties, offers);
