//! External JSON shapes for users, bucketlists and items.
//!
//! Each entity has one projection function. Nested collections are passed in
//! by the caller, so projecting never touches the database.

use crate::models::{bucketlist::BucketList, item::BucketListItem, user::User};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ItemView {
    pub item_id: i64,
    pub item_name: String,
    pub priority: String,
    pub done: bool,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BucketListView {
    pub id: i64,
    pub list_name: String,
    pub created_by: i64,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub bucketlist_items: Vec<ItemView>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub bucketlists: Vec<BucketListView>,
}

pub fn item_view(item: &BucketListItem) -> ItemView {
    ItemView {
        item_id: item.item_id,
        item_name: item.item_name.clone(),
        priority: item.priority.clone(),
        done: item.done,
        date_created: item.date_created,
        date_modified: item.date_modified,
    }
}

pub fn bucketlist_view(list: &BucketList, items: &[BucketListItem]) -> BucketListView {
    BucketListView {
        id: list.id,
        list_name: list.list_name.clone(),
        created_by: list.created_by,
        date_created: list.date_created,
        date_modified: list.date_modified,
        bucketlist_items: items.iter().map(item_view).collect(),
    }
}

/// Project a page of lists, attaching each list's items from `items_by_list`.
/// Lists without an entry get an empty item array.
pub fn bucketlist_views(
    lists: &[BucketList],
    items_by_list: &HashMap<i64, Vec<BucketListItem>>,
) -> Vec<BucketListView> {
    lists
        .iter()
        .map(|list| {
            let items = items_by_list
                .get(&list.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            bucketlist_view(list, items)
        })
        .collect()
}

/// The password digest never leaves the service layer.
pub fn user_view(user: &User, bucketlists: Vec<BucketListView>) -> UserView {
    UserView {
        id: user.id,
        username: user.username.clone(),
        bucketlists,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(id: i64, name: &str) -> BucketList {
        let now = Utc::now();
        BucketList {
            id,
            list_name: name.into(),
            created_by: 7,
            date_created: now,
            date_modified: now,
        }
    }

    fn item(item_id: i64, bucketlist_id: i64, name: &str) -> BucketListItem {
        let now = Utc::now();
        BucketListItem {
            item_id,
            item_name: name.into(),
            priority: "high".into(),
            done: false,
            bucketlist_id,
            date_created: now,
            date_modified: now,
        }
    }

    #[test]
    fn bucketlist_embeds_its_items() {
        let value = serde_json::to_value(bucketlist_view(
            &list(1, "Travel"),
            &[item(3, 1, "Visit Kyoto")],
        ))
        .unwrap();

        assert_eq!(value["id"], 1);
        assert_eq!(value["list_name"], "Travel");
        assert_eq!(value["created_by"], 7);
        assert_eq!(value["bucketlist_items"][0]["item_id"], 3);
        assert_eq!(value["bucketlist_items"][0]["item_name"], "Visit Kyoto");
        assert_eq!(value["bucketlist_items"][0]["done"], false);
        assert!(value["bucketlist_items"][0].get("bucketlist_id").is_none());
    }

    #[test]
    fn lists_without_items_get_empty_arrays() {
        let lists = vec![list(1, "Travel"), list(2, "Food")];
        let mut items = HashMap::new();
        items.insert(2, vec![item(9, 2, "Ramen")]);

        let views = bucketlist_views(&lists, &items);
        assert!(views[0].bucketlist_items.is_empty());
        assert_eq!(views[1].bucketlist_items.len(), 1);
    }

    #[test]
    fn user_view_never_exposes_password_hash() {
        let user = User {
            id: 7,
            username: "amy".into(),
            password_hash: "pbkdf2-sha256$1$salt$hash".into(),
        };
        let value = serde_json::to_value(user_view(&user, vec![])).unwrap();

        assert_eq!(value["username"], "amy");
        assert_eq!(value["bucketlists"], serde_json::json!([]));
        assert!(value.get("password_hash").is_none());
    }
}
