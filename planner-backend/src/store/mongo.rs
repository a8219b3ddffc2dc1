//! MongoDB-backed store: a `tasks` and a `notes` collection.
//!
//! Each store call is a single database operation, so no extra locking is
//! needed. Reads project away `_id` so callers only see declared fields.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{FindOptions, UpdateOptions};
use mongodb::{Client, Collection};
use planner_types::{DashboardData, Notes, Task, TaskId};
use serde::{Deserialize, Serialize};

use super::{StoreResult, TaskStore};

const TASKS_COLLECTION: &str = "tasks";
const NOTES_COLLECTION: &str = "notes";

/// How a note is stored in the `notes` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NoteDocument {
    key: String,
    note: String,
}

pub struct MongoStore {
    tasks: Collection<Task>,
    notes: Collection<NoteDocument>,
}

impl MongoStore {
    /// Connect and verify reachability with a `ping` round trip
    pub async fn connect(uri: &str, database: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }, None).await?;

        Ok(Self {
            tasks: db.collection(TASKS_COLLECTION),
            notes: db.collection(NOTES_COLLECTION),
        })
    }

    async fn load_all(&self) -> StoreResult<DashboardData> {
        let tasks: Vec<Task> = self
            .tasks
            .find(None, without_object_id())
            .await?
            .try_collect()
            .await?;

        let notes: Vec<NoteDocument> = self
            .notes
            .find(None, without_object_id())
            .await?
            .try_collect()
            .await?;

        Ok(DashboardData {
            tasks,
            notes: notes.into_iter().map(|n| (n.key, n.note)).collect::<Notes>(),
        })
    }
}

fn without_object_id() -> FindOptions {
    FindOptions::builder().projection(doc! { "_id": 0 }).build()
}

fn id_to_bson(id: &TaskId) -> Bson {
    match id {
        TaskId::Number(n) => Bson::Int64(*n),
        TaskId::Text(s) => Bson::String(s.clone()),
    }
}

fn id_filter(id: &TaskId) -> Document {
    doc! { "id": id_to_bson(id) }
}

#[async_trait]
impl TaskStore for MongoStore {
    fn backend_name(&self) -> &'static str {
        "mongo"
    }

    async fn get_all(&self) -> DashboardData {
        match self.load_all().await {
            Ok(data) => data,
            Err(e) => {
                log::error!("[STORE] Failed to load dashboard data from MongoDB: {}", e);
                DashboardData::default()
            }
        }
    }

    async fn insert_task(&self, task: Task) -> StoreResult<()> {
        self.tasks.insert_one(task, None).await?;
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId) -> StoreResult<()> {
        let result = self.tasks.delete_many(id_filter(id), None).await?;
        log::debug!("[STORE] Deleted {} task(s) with id {}", result.deleted_count, id);
        Ok(())
    }

    async fn update_task_date(&self, id: &TaskId, date: &str) -> StoreResult<()> {
        self.tasks
            .update_many(id_filter(id), doc! { "$set": { "date": date } }, None)
            .await?;
        Ok(())
    }

    async fn set_note(&self, key: &str, body: &str) -> StoreResult<()> {
        let options = UpdateOptions::builder().upsert(true).build();
        self.notes
            .update_one(doc! { "key": key }, doc! { "$set": { "note": body } }, options)
            .await?;
        Ok(())
    }

    async fn delete_note(&self, key: &str) -> StoreResult<()> {
        self.notes.delete_one(doc! { "key": key }, None).await?;
        Ok(())
    }

    async fn tasks_due_on(&self, date: &str) -> StoreResult<Vec<Task>> {
        let tasks = self
            .tasks
            .find(doc! { "date": date }, without_object_id())
            .await?
            .try_collect()
            .await?;
        Ok(tasks)
    }
}
