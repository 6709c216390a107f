//! Represents an entry inside a bucketlist.

use crate::validation::{ValidationError, optional_text, require_text};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A task-like entry with a priority and a completion flag.
///
/// Items are only reachable through their parent list, and `item_name` is
/// unique within that list.
#[derive(Clone, FromRow, Debug)]
pub struct BucketListItem {
    /// Row identifier.
    pub item_id: i64,

    /// Display name, unique within the parent list.
    pub item_name: String,

    /// Free-form priority label (e.g. "high").
    pub priority: String,

    /// Whether the item has been completed.
    pub done: bool,

    /// Parent list.
    pub bucketlist_id: i64,

    /// When this item was created.
    pub date_created: DateTime<Utc>,

    /// When this item was last changed.
    pub date_modified: DateTime<Utc>,
}

/// Typed input for creating an item. New items always start not done.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub item_name: String,
    pub priority: String,
}

impl NewItem {
    pub fn parse(item_name: Option<&str>, priority: Option<&str>) -> Result<Self, ValidationError> {
        Ok(Self {
            item_name: require_text(item_name, "item_name")?,
            priority: require_text(priority, "priority")?,
        })
    }
}

/// Typed input for updating an item. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub item_name: Option<String>,
    pub priority: Option<String>,
    pub done: Option<bool>,
}

impl ItemChanges {
    pub fn parse(
        item_name: Option<&str>,
        priority: Option<&str>,
        done: Option<bool>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            item_name: optional_text(item_name, "item_name")?,
            priority: optional_text(priority, "priority")?,
            done,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.item_name.is_none() && self.priority.is_none() && self.done.is_none()
    }
}
