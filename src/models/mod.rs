//! Core data models for the bucketlist service.
//!
//! These entities represent users, their bucketlists and the items inside
//! each list. They map cleanly to database tables via `sqlx::FromRow`; the
//! external JSON shape lives in `crate::serializers`.

pub mod bucketlist;
pub mod item;
pub mod user;
