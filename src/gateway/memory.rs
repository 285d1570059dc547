//! In-process backend.
//!
//! `MemoryBackend` keeps every platform table as a list of JSON rows and honours the same
//! contract as the hosted service: server-assigned ids and timestamps, column defaults, slug
//! uniqueness, join-expansion, a change feed that fires on every write, the view-count RPC and
//! a session that can be signed in and out. It also records every request and can be told to
//! fail a table, which is what the sync and command tests lean on.

use crate::gateway::{
    AuthProvider, ChangeFeed, ChangeKind, ChangeNotification, Embed, Filter, Gateway,
    GatewayError, Select, Session, Subscription, TextSearch,
};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, watch};
use tracing::debug;
use uuid::Uuid;

type Row = Map<String, Value>;

const TABLES: &[&str] = &[
    "years",
    "units",
    "lecturers",
    "tags",
    "notes",
    "note_tags",
    "note_views",
    "categories",
    "posts",
];

const UNIQUE_COLUMNS: &[(&str, &str)] = &[
    ("notes", "slug"),
    ("posts", "slug"),
    ("categories", "slug"),
];

/// Kind of request recorded in the request log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
    Rpc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub operation: Operation,
    /// Table name, or function name for RPCs.
    pub target: String,
}

struct Subscriber {
    key: u64,
    table: String,
    sender: mpsc::UnboundedSender<ChangeNotification>,
}

#[derive(Default)]
struct FeedRegistry {
    next_key: u64,
    subscribers: Vec<Subscriber>,
}

pub struct MemoryBackend {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    feed: Arc<Mutex<FeedRegistry>>,
    auth: watch::Sender<Option<Session>>,
    faults: Mutex<HashMap<String, String>>,
    log: Mutex<Vec<RequestRecord>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

fn column_defaults(table: &str) -> Vec<(&'static str, Value)> {
    match table {
        "notes" => vec![
            ("difficulty_level", Value::from("Beginner")),
            ("is_published", Value::from(false)),
            ("is_featured", Value::from(false)),
            ("view_count", Value::from(0)),
            ("download_count", Value::from(0)),
        ],
        "posts" => vec![("published", Value::from(false))],
        "units" | "lecturers" => vec![("is_active", Value::from(true))],
        _ => Vec::new(),
    }
}

fn fill_if_absent(row: &mut Row, key: &str, value: Value) {
    if row.get(key).map_or(true, Value::is_null) {
        row.insert(key.to_string(), value);
    }
}

fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn matches_filters(row: &Row, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|filter| row.get(&filter.column).unwrap_or(&Value::Null) == &filter.value)
}

fn matches_text(row: &Row, text: Option<&TextSearch>) -> bool {
    let Some(text) = text else { return true };
    let term = text.term.to_lowercase();
    text.columns.iter().any(|column| {
        row.get(*column)
            .and_then(Value::as_str)
            .is_some_and(|value| value.to_lowercase().contains(&term))
    })
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn check_unique(
    table: &str,
    row: &Row,
    existing: &[Row],
    except_id: Option<&str>,
) -> Result<(), GatewayError> {
    for (unique_table, column) in UNIQUE_COLUMNS {
        if *unique_table != table {
            continue;
        }
        let Some(value) = row.get(*column).filter(|v| !v.is_null()) else {
            continue;
        };
        let clash = existing
            .iter()
            .filter(|other| except_id.is_none() || row_id(other) != except_id)
            .any(|other| other.get(*column) == Some(value));
        if clash {
            return Err(GatewayError::Constraint(format!(
                "duplicate key value violates unique constraint \"{table}_{column}_key\""
            )));
        }
    }
    Ok(())
}

fn expand(tables: &HashMap<String, Vec<Row>>, row: &Row, embeds: &[Embed]) -> Value {
    let mut out = row.clone();
    for embed in embeds {
        match embed {
            Embed::One {
                alias,
                table,
                foreign_key,
            } => {
                let related = row
                    .get(*foreign_key)
                    .and_then(Value::as_str)
                    .and_then(|fk| {
                        tables
                            .get(*table)?
                            .iter()
                            .find(|candidate| row_id(candidate) == Some(fk))
                    })
                    .map(|found| Value::Object(found.clone()))
                    .unwrap_or(Value::Null);
                out.insert(alias.to_string(), related);
            }
            Embed::Many {
                alias,
                table,
                back_reference,
                nested,
            } => {
                let id = row.get("id").filter(|v| !v.is_null());
                let related = tables
                    .get(*table)
                    .map(|rows| {
                        rows.iter()
                            .filter(|candidate| {
                                id.is_some() && candidate.get(*back_reference) == id
                            })
                            .map(|candidate| expand(tables, candidate, nested))
                            .collect()
                    })
                    .unwrap_or_default();
                out.insert(alias.to_string(), Value::Array(related));
            }
        }
    }
    Value::Object(out)
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let tables = TABLES
            .iter()
            .map(|table| (table.to_string(), Vec::new()))
            .collect();
        let (auth, _) = watch::channel(None);
        Self {
            tables: Mutex::new(tables),
            feed: Arc::new(Mutex::new(FeedRegistry::default())),
            auth,
            faults: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Loads rows directly, without notifications or request log entries.
    pub fn seed(
        &self,
        table: &str,
        rows: impl IntoIterator<Item = Value>,
    ) -> Result<(), GatewayError> {
        let mut tables = lock(&self.tables);
        let existing = tables
            .get_mut(table)
            .ok_or_else(|| GatewayError::UnknownTable(table.to_string()))?;
        for row in rows {
            let Value::Object(mut row) = row else {
                return Err(GatewayError::Decode(format!("seed rows for {table} must be objects")));
            };
            fill_if_absent(&mut row, "id", Value::String(Uuid::new_v4().to_string()));
            fill_if_absent(&mut row, "created_at", timestamp());
            for (column, value) in column_defaults(table) {
                fill_if_absent(&mut row, column, value);
            }
            existing.push(row);
        }
        Ok(())
    }

    /// Raw rows of `table` as currently stored.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        lock(&self.tables)
            .get(table)
            .map(|rows| rows.iter().cloned().map(Value::Object).collect())
            .unwrap_or_default()
    }

    pub fn sign_in(&self, user_id: impl Into<String>, email: Option<String>) -> Session {
        let session = Session {
            user_id: user_id.into(),
            email,
            access_token: Uuid::new_v4().to_string(),
            expires_at: Some(Utc::now() + chrono::Duration::hours(1)),
        };
        self.auth.send_replace(Some(session.clone()));
        session
    }

    pub fn sign_out(&self) {
        self.auth.send_replace(None);
    }

    /// Makes every request touching `target` (table, function or channel) fail with `message`.
    pub fn fail(&self, target: impl Into<String>, message: impl Into<String>) {
        lock(&self.faults).insert(target.into(), message.into());
    }

    pub fn clear_faults(&self) {
        lock(&self.faults).clear();
    }

    pub fn requests(&self) -> Vec<RequestRecord> {
        lock(&self.log).clone()
    }

    /// Number of logged requests of `operation` against `target`.
    pub fn count(&self, operation: Operation, target: &str) -> usize {
        lock(&self.log)
            .iter()
            .filter(|record| record.operation == operation && record.target == target)
            .count()
    }

    pub fn subscriber_count(&self, table: &str) -> usize {
        lock(&self.feed)
            .subscribers
            .iter()
            .filter(|subscriber| subscriber.table == table && !subscriber.sender.is_closed())
            .count()
    }

    fn record(&self, operation: Operation, target: &str) -> Result<(), GatewayError> {
        lock(&self.log).push(RequestRecord {
            operation,
            target: target.to_string(),
        });
        match lock(&self.faults).get(target) {
            Some(message) => Err(GatewayError::Injected(message.clone())),
            None => Ok(()),
        }
    }

    fn publish(&self, notifications: Vec<ChangeNotification>) {
        let mut feed = lock(&self.feed);
        feed.subscribers.retain(|subscriber| !subscriber.sender.is_closed());
        for notification in notifications {
            for subscriber in feed
                .subscribers
                .iter()
                .filter(|subscriber| subscriber.table == notification.table)
            {
                let _ = subscriber.sender.send(notification.clone());
            }
        }
    }

    fn select_now(&self, query: &Select) -> Result<Vec<Value>, GatewayError> {
        let tables = lock(&self.tables);
        let rows = tables
            .get(query.table)
            .ok_or_else(|| GatewayError::UnknownTable(query.table.to_string()))?;
        let mut matched: Vec<&Row> = rows
            .iter()
            .filter(|row| matches_filters(row, &query.filters))
            .filter(|row| matches_text(row, query.text.as_ref()))
            .collect();
        if let Some(order) = query.order {
            matched.sort_by(|a, b| {
                let ordering = compare_values(a.get(order.column), b.get(order.column));
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        Ok(matched
            .into_iter()
            .map(|row| expand(&tables, row, &query.embeds))
            .collect())
    }

    fn insert_now(
        &self,
        table: &str,
        row: Value,
        embeds: &[Embed],
    ) -> Result<(Value, ChangeNotification), GatewayError> {
        let Value::Object(mut row) = row else {
            return Err(GatewayError::Decode(format!("insert into {table} expects an object")));
        };
        let mut tables = lock(&self.tables);
        let existing = tables
            .get(table)
            .ok_or_else(|| GatewayError::UnknownTable(table.to_string()))?;

        fill_if_absent(&mut row, "id", Value::String(Uuid::new_v4().to_string()));
        let now = timestamp();
        fill_if_absent(&mut row, "created_at", now.clone());
        fill_if_absent(&mut row, "updated_at", now);
        for (column, value) in column_defaults(table) {
            fill_if_absent(&mut row, column, value);
        }
        check_unique(table, &row, existing, None)?;

        if let Some(rows) = tables.get_mut(table) {
            rows.push(row.clone());
        }
        let expanded = expand(&tables, &row, embeds);
        let notification = ChangeNotification {
            kind: ChangeKind::Insert,
            table: table.to_string(),
            record: Value::Object(row),
            old_record: Value::Null,
        };
        Ok((expanded, notification))
    }

    fn update_now(
        &self,
        table: &str,
        id: &str,
        patch: Value,
        embeds: &[Embed],
    ) -> Result<(Value, ChangeNotification), GatewayError> {
        let Value::Object(patch) = patch else {
            return Err(GatewayError::Decode(format!("update of {table} expects an object")));
        };
        let mut tables = lock(&self.tables);
        let existing = tables
            .get(table)
            .ok_or_else(|| GatewayError::UnknownTable(table.to_string()))?;
        let index = existing
            .iter()
            .position(|row| row_id(row) == Some(id))
            .ok_or_else(|| GatewayError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            })?;

        let old = existing[index].clone();
        let mut updated = old.clone();
        for (column, value) in patch {
            if column != "id" {
                updated.insert(column, value);
            }
        }
        updated.insert("updated_at".to_string(), timestamp());
        check_unique(table, &updated, existing, Some(id))?;

        if let Some(rows) = tables.get_mut(table) {
            rows[index] = updated.clone();
        }
        let expanded = expand(&tables, &updated, embeds);
        let notification = ChangeNotification {
            kind: ChangeKind::Update,
            table: table.to_string(),
            record: Value::Object(updated),
            old_record: Value::Object(old),
        };
        Ok((expanded, notification))
    }

    fn delete_now(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Vec<ChangeNotification>, GatewayError> {
        let mut tables = lock(&self.tables);
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| GatewayError::UnknownTable(table.to_string()))?;
        let (removed, kept): (Vec<Row>, Vec<Row>) = std::mem::take(rows)
            .into_iter()
            .partition(|row| matches_filters(row, filters));
        *rows = kept;
        Ok(removed
            .into_iter()
            .map(|row| ChangeNotification {
                kind: ChangeKind::Delete,
                table: table.to_string(),
                record: Value::Null,
                old_record: Value::Object(row),
            })
            .collect())
    }

    fn increment_view_count(&self, args: &Value) -> Result<ChangeNotification, GatewayError> {
        let note_id = args
            .get("note_id")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::Decode("increment_note_view_count needs note_id".into()))?;
        let mut tables = lock(&self.tables);
        let note = tables
            .get_mut("notes")
            .and_then(|rows| rows.iter_mut().find(|row| row_id(row) == Some(note_id)))
            .ok_or_else(|| GatewayError::NotFound {
                table: "notes".to_string(),
                id: note_id.to_string(),
            })?;
        let old = note.clone();
        let views = note.get("view_count").and_then(Value::as_u64).unwrap_or(0);
        note.insert("view_count".to_string(), Value::from(views + 1));
        Ok(ChangeNotification {
            kind: ChangeKind::Update,
            table: "notes".to_string(),
            record: Value::Object(note.clone()),
            old_record: Value::Object(old),
        })
    }
}

#[async_trait]
impl Gateway for MemoryBackend {
    async fn select(&self, query: &Select) -> Result<Vec<Value>, GatewayError> {
        self.record(Operation::Select, query.table)?;
        let rows = self.select_now(query)?;
        debug!(table = query.table, rows = rows.len(), "select");
        Ok(rows)
    }

    async fn insert(
        &self,
        table: &str,
        row: Value,
        embeds: &[Embed],
    ) -> Result<Value, GatewayError> {
        self.record(Operation::Insert, table)?;
        let (stored, notification) = self.insert_now(table, row, embeds)?;
        debug!(table, "insert");
        self.publish(vec![notification]);
        Ok(stored)
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: Value,
        embeds: &[Embed],
    ) -> Result<Value, GatewayError> {
        self.record(Operation::Update, table)?;
        let (stored, notification) = self.update_now(table, id, patch, embeds)?;
        debug!(table, id, "update");
        self.publish(vec![notification]);
        Ok(stored)
    }

    async fn delete_where(&self, table: &str, filters: &[Filter]) -> Result<(), GatewayError> {
        self.record(Operation::Delete, table)?;
        let notifications = self.delete_now(table, filters)?;
        debug!(table, removed = notifications.len(), "delete");
        self.publish(notifications);
        Ok(())
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, GatewayError> {
        self.record(Operation::Rpc, function)?;
        match function {
            "increment_note_view_count" => {
                let notification = self.increment_view_count(&args)?;
                self.publish(vec![notification]);
                Ok(Value::Null)
            }
            other => Err(GatewayError::UnknownFunction(other.to_string())),
        }
    }
}

#[async_trait]
impl ChangeFeed for MemoryBackend {
    async fn subscribe(&self, channel: &str, table: &str) -> Result<Subscription, GatewayError> {
        if !TABLES.contains(&table) {
            return Err(GatewayError::UnknownTable(table.to_string()));
        }
        if let Some(message) = lock(&self.faults).get(channel) {
            return Err(GatewayError::Injected(message.clone()));
        }
        let (sender, receiver) = mpsc::unbounded_channel();
        let key = {
            let mut feed = lock(&self.feed);
            feed.next_key += 1;
            let key = feed.next_key;
            feed.subscribers.push(Subscriber {
                key,
                table: table.to_string(),
                sender,
            });
            key
        };
        debug!(channel, table, "subscribe");
        let registry = Arc::clone(&self.feed);
        Ok(Subscription::new(channel, receiver).on_teardown(move || {
            lock(&registry)
                .subscribers
                .retain(|subscriber| subscriber.key != key);
        }))
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn current_session(&self) -> Result<Option<Session>, GatewayError> {
        Ok(self.auth.borrow().clone())
    }

    fn watch_auth(&self) -> watch::Receiver<Option<Session>> {
        self.auth.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend_with_notes() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend
            .seed(
                "tags",
                vec![
                    json!({"id": "t1", "name": "Cardio"}),
                    json!({"id": "t2", "name": "Renal"}),
                ],
            )
            .unwrap();
        backend
            .seed(
                "units",
                vec![json!({"id": "u1", "name": "Physiology", "code": "PHY101", "year_id": "y1"})],
            )
            .unwrap();
        backend
            .seed(
                "notes",
                vec![
                    json!({
                        "id": "n1", "title": "Cardiac Cycle", "slug": "cardiac-cycle",
                        "unit_id": "u1", "year_id": "y1", "is_published": true,
                        "created_at": "2024-01-01T00:00:00.000000Z"
                    }),
                    json!({
                        "id": "n2", "title": "Nephron", "slug": "nephron",
                        "unit_id": "u1", "year_id": "y1", "is_published": false,
                        "created_at": "2024-02-01T00:00:00.000000Z"
                    }),
                ],
            )
            .unwrap();
        backend
            .seed(
                "note_tags",
                vec![
                    json!({"note_id": "n1", "tag_id": "t1"}),
                    json!({"note_id": "n1", "tag_id": "t2"}),
                ],
            )
            .unwrap();
        backend
    }

    #[tokio::test]
    async fn test_insert_assigns_id_timestamps_and_defaults() {
        let backend = MemoryBackend::new();
        let stored = backend
            .insert("notes", json!({"title": "Cardiac Cycle", "slug": "cardiac-cycle"}), &[])
            .await
            .unwrap();

        assert!(stored["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(stored["created_at"].is_string());
        assert_eq!(stored["view_count"], json!(0));
        assert_eq!(stored["is_published"], json!(false));
        assert_eq!(backend.rows("notes").len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_rejected() {
        let backend = backend_with_notes();
        let result = backend
            .insert("notes", json!({"title": "Again", "slug": "cardiac-cycle"}), &[])
            .await;

        assert!(matches!(result, Err(GatewayError::Constraint(_))));
        assert_eq!(backend.rows("notes").len(), 2);
    }

    #[tokio::test]
    async fn test_update_merges_patch_and_reports_missing_rows() {
        let backend = backend_with_notes();
        let stored = backend
            .update("notes", "n2", json!({"is_published": true}), &[])
            .await
            .unwrap();
        assert_eq!(stored["is_published"], json!(true));
        assert_eq!(stored["title"], json!("Nephron"));

        let missing = backend.update("notes", "nope", json!({}), &[]).await;
        assert!(matches!(missing, Err(GatewayError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_select_expands_embeds_and_applies_predicates() {
        let backend = backend_with_notes();
        let query = Select::from("notes")
            .embed_all(vec![
                Embed::one("unit", "units", "unit_id"),
                Embed::many(
                    "note_tags",
                    "note_tags",
                    "note_id",
                    vec![Embed::one("tag", "tags", "tag_id")],
                ),
            ])
            .eq("is_published", true)
            .search(vec!["title"], "CARDIAC");

        let rows = backend.select(&query).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["unit"]["code"], json!("PHY101"));
        let tags = rows[0]["note_tags"].as_array().unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0]["tag"]["name"], json!("Cardio"));
    }

    #[tokio::test]
    async fn test_select_orders_and_limits() {
        let backend = backend_with_notes();
        let rows = backend
            .select(&Select::from("notes").order_by("created_at", true).limit(1))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], json!("n2"));
    }

    #[tokio::test]
    async fn test_subscription_only_sees_its_table_and_unsubscribes_on_drop() {
        let backend = backend_with_notes();
        let mut subscription = backend.subscribe("notes-changes", "notes").await.unwrap();
        assert_eq!(backend.subscriber_count("notes"), 1);

        backend
            .insert("tags", json!({"name": "Neuro"}), &[])
            .await
            .unwrap();
        backend
            .update("notes", "n1", json!({"title": "Cardiac Cycle II"}), &[])
            .await
            .unwrap();

        let notification = subscription.next().await.unwrap();
        assert_eq!(notification.kind, ChangeKind::Update);
        assert_eq!(notification.table, "notes");
        assert_eq!(notification.old_record["title"], json!("Cardiac Cycle"));

        drop(subscription);
        assert_eq!(backend.subscriber_count("notes"), 0);
    }

    #[tokio::test]
    async fn test_view_count_rpc_increments_and_notifies() {
        let backend = backend_with_notes();
        let mut subscription = backend.subscribe("notes-changes", "notes").await.unwrap();

        backend
            .rpc("increment_note_view_count", json!({"note_id": "n1"}))
            .await
            .unwrap();

        let note = backend
            .rows("notes")
            .into_iter()
            .find(|row| row["id"] == json!("n1"))
            .unwrap();
        assert_eq!(note["view_count"], json!(1));
        assert_eq!(subscription.next().await.unwrap().kind, ChangeKind::Update);

        let unknown = backend.rpc("drop_everything", json!({})).await;
        assert!(matches!(unknown, Err(GatewayError::UnknownFunction(_))));
    }

    #[tokio::test]
    async fn test_injected_faults_fail_requests_until_cleared() {
        let backend = backend_with_notes();
        backend.fail("notes", "permission denied for table notes");

        let failed = backend.select(&Select::from("notes")).await;
        assert_eq!(
            failed,
            Err(GatewayError::Injected("permission denied for table notes".into()))
        );
        assert_eq!(backend.count(Operation::Select, "notes"), 1);

        backend.clear_faults();
        assert_eq!(backend.select(&Select::from("notes")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_where_removes_matching_rows() {
        let backend = backend_with_notes();
        backend
            .delete_where("note_tags", &[Filter::eq("note_id", "n1")])
            .await
            .unwrap();
        assert!(backend.rows("note_tags").is_empty());

        backend.delete("notes", "n2").await.unwrap();
        assert_eq!(backend.rows("notes").len(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_and_out_update_watchers() {
        let backend = MemoryBackend::new();
        let mut watcher = backend.watch_auth();

        let session = backend.sign_in("user-1", Some("a@example.com".into()));
        watcher.changed().await.unwrap();
        assert_eq!(watcher.borrow().as_ref(), Some(&session));
        assert_eq!(backend.current_session().await.unwrap(), Some(session));

        backend.sign_out();
        watcher.changed().await.unwrap();
        assert!(watcher.borrow().is_none());
    }
}
