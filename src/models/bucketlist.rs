//! Represents a named, user-owned list.

use crate::validation::{ValidationError, optional_text, require_text};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A bucketlist owned by exactly one user.
///
/// `(created_by, list_name)` is unique, so a user cannot hold two lists with
/// the same name.
#[derive(Clone, FromRow, Debug)]
pub struct BucketList {
    /// Row identifier.
    pub id: i64,

    /// Display name, unique per owner.
    pub list_name: String,

    /// ID of the owning user.
    pub created_by: i64,

    /// When this list was created.
    pub date_created: DateTime<Utc>,

    /// When this list was last renamed.
    pub date_modified: DateTime<Utc>,
}

/// Typed input for creating a bucketlist.
#[derive(Debug, Clone)]
pub struct NewBucketList {
    pub list_name: String,
}

impl NewBucketList {
    pub fn parse(list_name: Option<&str>) -> Result<Self, ValidationError> {
        Ok(Self {
            list_name: require_text(list_name, "list_name")?,
        })
    }
}

/// Typed input for updating a bucketlist. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct BucketListChanges {
    pub list_name: Option<String>,
}

impl BucketListChanges {
    pub fn parse(list_name: Option<&str>) -> Result<Self, ValidationError> {
        Ok(Self {
            list_name: optional_text(list_name, "list_name")?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.list_name.is_none()
    }
}
