//! BucketListService: owner-scoped CRUD for bucketlists and their items.
//!
//! Every query filters on the caller's user id, so another user's rows are
//! indistinguishable from missing ones. Each mutation opens its transaction
//! with the write itself, ownership folded into the `WHERE` clause, so SQLite
//! never has to upgrade a read lock. Returning early with `?` drops the
//! transaction, which rolls it back.

use super::{ServiceError, ServiceResult, is_unique_violation};
use crate::{
    models::{
        bucketlist::{BucketList, BucketListChanges, NewBucketList},
        item::{BucketListItem, ItemChanges, NewItem},
        user::CurrentUser,
    },
    pagination::{Page, PageRequest, PageWindow},
};
use chrono::Utc;
use sqlx::{QueryBuilder, SqliteConnection, SqlitePool, sqlite::Sqlite};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info};

const LIST_NOT_FOUND: &str = "the bucketlist was not found.";
const ITEM_NOT_FOUND: &str = "No item matching the given id was found.";

/// Result of an update that may have had nothing to apply.
#[derive(Debug)]
pub enum Updated<T> {
    Unchanged,
    Changed(T),
}

/// A single list together with all of its items.
#[derive(Debug, Clone)]
pub struct BucketListDetail {
    pub list: BucketList,
    pub items: Vec<BucketListItem>,
}

/// A page of lists plus the items of every list on the page, keyed by list id.
#[derive(Debug, Clone)]
pub struct BucketListPage {
    pub page: Page<BucketList>,
    pub items: HashMap<i64, Vec<BucketListItem>>,
}

#[derive(Clone)]
pub struct BucketListService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl BucketListService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    pub async fn create_bucketlist(
        &self,
        user: &CurrentUser,
        new: NewBucketList,
    ) -> ServiceResult<BucketListDetail> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;
        let list = sqlx::query_as::<_, BucketList>(
            "INSERT INTO bucketlists (list_name, created_by, date_created, date_modified)
             VALUES (?, ?, ?, ?)
             RETURNING id, list_name, created_by, date_created, date_modified",
        )
        .bind(&new.list_name)
        .bind(user.id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| conflict_on(err, "list_name"))?;
        tx.commit().await?;

        info!(user_id = user.id, list_id = list.id, "created bucketlist `{}`", list.list_name);
        Ok(BucketListDetail {
            list,
            items: Vec::new(),
        })
    }

    /// Page through the caller's lists, optionally restricted to an exact
    /// name. A search that matches nothing is `NotFound`, unlike an empty
    /// unfiltered collection.
    pub async fn list_bucketlists(
        &self,
        user: &CurrentUser,
        search: Option<&str>,
        request: PageRequest,
    ) -> ServiceResult<BucketListPage> {
        let search = match search.map(str::trim) {
            Some("") => {
                return Err(ServiceError::Validation(
                    "Please provide a search parameter".into(),
                ));
            }
            other => other,
        };

        let mut conn = self.db.acquire().await?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM bucketlists");
        push_list_filter(&mut count, user.id, search);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

        if let Some(name) = search {
            if total == 0 {
                debug!(user_id = user.id, "search for `{}` matched nothing", name);
                return Err(ServiceError::NotFound(format!(
                    "Bucketlist {} doesn't exist.",
                    name
                )));
            }
        }

        let mut select = QueryBuilder::<Sqlite>::new(
            "SELECT id, list_name, created_by, date_created, date_modified FROM bucketlists",
        );
        push_list_filter(&mut select, user.id, search);
        push_page(&mut select, request);
        let lists: Vec<BucketList> = select.build_query_as().fetch_all(&mut *conn).await?;

        let ids: Vec<i64> = lists.iter().map(|list| list.id).collect();
        let items = items_for_lists(&mut conn, &ids).await?;

        Ok(BucketListPage {
            page: Page {
                items: lists,
                window: PageWindow::new(request, total),
            },
            items,
        })
    }

    pub async fn get_bucketlist(
        &self,
        user: &CurrentUser,
        id: i64,
    ) -> ServiceResult<BucketListDetail> {
        let mut conn = self.db.acquire().await?;
        let list = owned_list(&mut conn, user.id, id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(LIST_NOT_FOUND.into()))?;
        let items = items_of_list(&mut conn, list.id).await?;
        Ok(BucketListDetail { list, items })
    }

    pub async fn update_bucketlist(
        &self,
        user: &CurrentUser,
        id: i64,
        changes: BucketListChanges,
    ) -> ServiceResult<Updated<BucketListDetail>> {
        if changes.is_empty() {
            let mut conn = self.db.acquire().await?;
            owned_list(&mut conn, user.id, id)
                .await?
                .ok_or_else(|| ServiceError::NotFound(LIST_NOT_FOUND.into()))?;
            return Ok(Updated::Unchanged);
        }

        let mut tx = self.db.begin().await?;
        let list = sqlx::query_as::<_, BucketList>(
            "UPDATE bucketlists SET list_name = COALESCE(?, list_name), date_modified = ?
             WHERE id = ? AND created_by = ?
             RETURNING id, list_name, created_by, date_created, date_modified",
        )
        .bind(changes.list_name)
        .bind(Utc::now())
        .bind(id)
        .bind(user.id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|err| conflict_on(err, "list_name"))?
        .ok_or_else(|| ServiceError::NotFound(LIST_NOT_FOUND.into()))?;
        let items = items_of_list(&mut tx, id).await?;
        tx.commit().await?;

        info!(user_id = user.id, list_id = id, "renamed bucketlist to `{}`", list.list_name);
        Ok(Updated::Changed(BucketListDetail { list, items }))
    }

    /// Delete a list and its items. Returns the deleted list's name, or
    /// `None` when the caller owns no list with that id.
    pub async fn delete_bucketlist(
        &self,
        user: &CurrentUser,
        id: i64,
    ) -> ServiceResult<Option<String>> {
        let mut tx = self.db.begin().await?;
        let removed_items = sqlx::query(
            "DELETE FROM bucketlist_items WHERE bucketlist_id IN
                (SELECT id FROM bucketlists WHERE id = ? AND created_by = ?)",
        )
        .bind(id)
        .bind(user.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        let deleted: Option<String> = sqlx::query_scalar(
            "DELETE FROM bucketlists WHERE id = ? AND created_by = ? RETURNING list_name",
        )
        .bind(id)
        .bind(user.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(list_name) = deleted else {
            debug!(user_id = user.id, list_id = id, "nothing to delete");
            return Ok(None);
        };
        tx.commit().await?;

        info!(
            user_id = user.id,
            list_id = id,
            removed_items,
            "deleted bucketlist `{}`",
            list_name
        );
        Ok(Some(list_name))
    }

    /// All of the caller's lists with their items, oldest first.
    pub async fn all_bucketlists(&self, user: &CurrentUser) -> ServiceResult<Vec<BucketListDetail>> {
        let mut conn = self.db.acquire().await?;
        let lists = sqlx::query_as::<_, BucketList>(
            "SELECT id, list_name, created_by, date_created, date_modified
             FROM bucketlists WHERE created_by = ? ORDER BY id ASC",
        )
        .bind(user.id)
        .fetch_all(&mut *conn)
        .await?;

        let ids: Vec<i64> = lists.iter().map(|list| list.id).collect();
        let mut items = items_for_lists(&mut conn, &ids).await?;
        Ok(lists
            .into_iter()
            .map(|list| {
                let items = items.remove(&list.id).unwrap_or_default();
                BucketListDetail { list, items }
            })
            .collect())
    }

    pub async fn list_items(
        &self,
        user: &CurrentUser,
        list_id: i64,
        request: PageRequest,
    ) -> ServiceResult<Page<BucketListItem>> {
        let mut conn = self.db.acquire().await?;
        if owned_list(&mut conn, user.id, list_id).await?.is_none() {
            return Err(ServiceError::NotFound(LIST_NOT_FOUND.into()));
        }

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bucketlist_items WHERE bucketlist_id = ?")
                .bind(list_id)
                .fetch_one(&mut *conn)
                .await?;

        let mut select = QueryBuilder::<Sqlite>::new(
            "SELECT item_id, item_name, priority, done, bucketlist_id, date_created, date_modified
             FROM bucketlist_items WHERE bucketlist_id = ",
        );
        select.push_bind(list_id);
        push_page(&mut select, request);
        let items: Vec<BucketListItem> = select.build_query_as().fetch_all(&mut *conn).await?;

        Ok(Page {
            items,
            window: PageWindow::new(request, total),
        })
    }

    /// The insert only selects the parent row when the caller owns it, so a
    /// foreign or missing list inserts nothing.
    pub async fn create_item(
        &self,
        user: &CurrentUser,
        list_id: i64,
        new: NewItem,
    ) -> ServiceResult<BucketListItem> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;
        let item = sqlx::query_as::<_, BucketListItem>(
            "INSERT INTO bucketlist_items
                (item_name, priority, done, bucketlist_id, date_created, date_modified)
             SELECT ?, ?, 0, id, ?, ? FROM bucketlists WHERE id = ? AND created_by = ?
             RETURNING item_id, item_name, priority, done, bucketlist_id, date_created, date_modified",
        )
        .bind(&new.item_name)
        .bind(&new.priority)
        .bind(now)
        .bind(now)
        .bind(list_id)
        .bind(user.id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|err| conflict_on(err, "item_name"))?
        .ok_or_else(|| ServiceError::NotFound(LIST_NOT_FOUND.into()))?;
        tx.commit().await?;

        info!(list_id, item_id = item.item_id, "added item `{}`", item.item_name);
        Ok(item)
    }

    pub async fn get_item(
        &self,
        user: &CurrentUser,
        list_id: i64,
        item_id: i64,
    ) -> ServiceResult<BucketListItem> {
        let mut conn = self.db.acquire().await?;
        if owned_list(&mut conn, user.id, list_id).await?.is_none() {
            return Err(ServiceError::NotFound(LIST_NOT_FOUND.into()));
        }
        find_item(&mut conn, list_id, item_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(ITEM_NOT_FOUND.into()))
    }

    pub async fn update_item(
        &self,
        user: &CurrentUser,
        list_id: i64,
        item_id: i64,
        changes: ItemChanges,
    ) -> ServiceResult<Updated<BucketListItem>> {
        if changes.is_empty() {
            self.get_item(user, list_id, item_id).await?;
            return Ok(Updated::Unchanged);
        }

        let mut tx = self.db.begin().await?;
        let updated = sqlx::query_as::<_, BucketListItem>(
            "UPDATE bucketlist_items
             SET item_name = COALESCE(?, item_name),
                 priority = COALESCE(?, priority),
                 done = COALESCE(?, done),
                 date_modified = ?
             WHERE item_id = ? AND bucketlist_id = ?
               AND bucketlist_id IN (SELECT id FROM bucketlists WHERE created_by = ?)
             RETURNING item_id, item_name, priority, done, bucketlist_id, date_created, date_modified",
        )
        .bind(changes.item_name)
        .bind(changes.priority)
        .bind(changes.done)
        .bind(Utc::now())
        .bind(item_id)
        .bind(list_id)
        .bind(user.id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|err| conflict_on(err, "item_name"))?;

        let Some(item) = updated else {
            return Err(missing_item(&mut tx, user.id, list_id).await?);
        };
        tx.commit().await?;

        info!(list_id, item_id, "updated item `{}`", item.item_name);
        Ok(Updated::Changed(item))
    }

    /// Delete one item. Returns its name, or `None` when there was nothing
    /// the caller could delete.
    pub async fn delete_item(
        &self,
        user: &CurrentUser,
        list_id: i64,
        item_id: i64,
    ) -> ServiceResult<Option<String>> {
        let deleted: Option<String> = sqlx::query_scalar(
            "DELETE FROM bucketlist_items
             WHERE item_id = ? AND bucketlist_id = ?
               AND bucketlist_id IN (SELECT id FROM bucketlists WHERE created_by = ?)
             RETURNING item_name",
        )
        .bind(item_id)
        .bind(list_id)
        .bind(user.id)
        .fetch_optional(&*self.db)
        .await?;

        match &deleted {
            Some(name) => info!(list_id, item_id, "deleted item `{}`", name),
            None => debug!(user_id = user.id, list_id, item_id, "nothing to delete"),
        }
        Ok(deleted)
    }
}

fn conflict_on(err: sqlx::Error, field: &'static str) -> ServiceError {
    if is_unique_violation(&err) {
        ServiceError::Conflict { field }
    } else {
        ServiceError::Sqlx(err)
    }
}

fn push_list_filter(builder: &mut QueryBuilder<'_, Sqlite>, owner: i64, search: Option<&str>) {
    builder.push(" WHERE created_by = ");
    builder.push_bind(owner);
    if let Some(name) = search {
        builder.push(" AND list_name = ");
        builder.push_bind(name.to_string());
    }
}

fn push_page(builder: &mut QueryBuilder<'_, Sqlite>, request: PageRequest) {
    builder.push(" ORDER BY 1 ASC LIMIT ");
    builder.push_bind(i64::from(request.limit));
    builder.push(" OFFSET ");
    builder.push_bind(request.offset());
}

/// Pick the not-found message for an item lookup that matched nothing.
async fn missing_item(
    conn: &mut SqliteConnection,
    owner: i64,
    list_id: i64,
) -> Result<ServiceError, sqlx::Error> {
    let message = match owned_list(conn, owner, list_id).await? {
        Some(_) => ITEM_NOT_FOUND,
        None => LIST_NOT_FOUND,
    };
    Ok(ServiceError::NotFound(message.into()))
}

async fn owned_list(
    conn: &mut SqliteConnection,
    owner: i64,
    id: i64,
) -> Result<Option<BucketList>, sqlx::Error> {
    sqlx::query_as::<_, BucketList>(
        "SELECT id, list_name, created_by, date_created, date_modified
         FROM bucketlists WHERE id = ? AND created_by = ?",
    )
    .bind(id)
    .bind(owner)
    .fetch_optional(conn)
    .await
}

async fn find_item(
    conn: &mut SqliteConnection,
    list_id: i64,
    item_id: i64,
) -> Result<Option<BucketListItem>, sqlx::Error> {
    sqlx::query_as::<_, BucketListItem>(
        "SELECT item_id, item_name, priority, done, bucketlist_id, date_created, date_modified
         FROM bucketlist_items WHERE item_id = ? AND bucketlist_id = ?",
    )
    .bind(item_id)
    .bind(list_id)
    .fetch_optional(conn)
    .await
}

async fn items_of_list(
    conn: &mut SqliteConnection,
    list_id: i64,
) -> Result<Vec<BucketListItem>, sqlx::Error> {
    sqlx::query_as::<_, BucketListItem>(
        "SELECT item_id, item_name, priority, done, bucketlist_id, date_created, date_modified
         FROM bucketlist_items WHERE bucketlist_id = ? ORDER BY item_id ASC",
    )
    .bind(list_id)
    .fetch_all(conn)
    .await
}

/// Fetch the items of several lists in one query, grouped by list id.
async fn items_for_lists(
    conn: &mut SqliteConnection,
    list_ids: &[i64],
) -> Result<HashMap<i64, Vec<BucketListItem>>, sqlx::Error> {
    let mut grouped: HashMap<i64, Vec<BucketListItem>> = HashMap::new();
    if list_ids.is_empty() {
        return Ok(grouped);
    }

    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT item_id, item_name, priority, done, bucketlist_id, date_created, date_modified
         FROM bucketlist_items WHERE bucketlist_id IN (",
    );
    let mut separated = builder.separated(", ");
    for id in list_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY item_id ASC");

    let rows: Vec<BucketListItem> = builder.build_query_as().fetch_all(conn).await?;
    for item in rows {
        grouped.entry(item.bucketlist_id).or_default().push(item);
    }
    Ok(grouped)
}
