use crate::autosave::NotebookAutosave;
use crate::storage;
use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use uuid::Uuid;

// One storage key per slice. The layout mirrors the portal's original
// local-storage surface, so an exported workspace stays recognizable.
const KEY_PROGRESS: &str = "progress";
const KEY_BOOKMARKS: &str = "bookmarks";
const KEY_NOTES: &str = "notes";
const KEY_COLLECTIONS: &str = "collections";
const KEY_STICKY_NOTES: &str = "stickyNotes";
const KEY_ADDITIONAL_NOTES: &str = "additionalNotes";
const KEY_ENTERED_PORTAL: &str = "hasEnteredPortal";

const TAB_COUNT: usize = 6;

/// The six trackable content sections of an experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Aim,
    Theory,
    Procedure,
    Simulation,
    Pretest,
    Posttest,
}

impl Tab {
    pub fn parse(name: &str) -> Option<Tab> {
        match name {
            "aim" => Some(Tab::Aim),
            "theory" => Some(Tab::Theory),
            "procedure" => Some(Tab::Procedure),
            "simulation" => Some(Tab::Simulation),
            "pretest" => Some(Tab::Pretest),
            "posttest" => Some(Tab::Posttest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabProgress {
    pub aim: bool,
    pub theory: bool,
    pub procedure: bool,
    pub simulation: bool,
    pub pretest: bool,
    pub posttest: bool,
}

impl TabProgress {
    fn set(&mut self, tab: Tab) {
        match tab {
            Tab::Aim => self.aim = true,
            Tab::Theory => self.theory = true,
            Tab::Procedure => self.procedure = true,
            Tab::Simulation => self.simulation = true,
            Tab::Pretest => self.pretest = true,
            Tab::Posttest => self.posttest = true,
        }
    }

    fn completed_count(&self) -> usize {
        [
            self.aim,
            self.theory,
            self.procedure,
            self.simulation,
            self.pretest,
            self.posttest,
        ]
        .iter()
        .filter(|v| **v)
        .count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentProgress {
    pub overall: i64,
    #[serde(default)]
    pub tabs: TabProgress,
}

/// Overall percentage is always derived from tab completion, except for the
/// direct-set operation which overwrites it and discards tab detail.
fn derive_overall(tabs: &TabProgress) -> i64 {
    ((tabs.completed_count() as f64 / TAB_COUNT as f64) * 100.0).round() as i64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub experiment_ids: Vec<String>,
    pub last_modified: i64,
    // Empty string means unset; filled from the first added experiment.
    #[serde(default)]
    pub thumbnail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickyNote {
    pub id: String,
    pub text: String,
    pub color: String,
    pub experiment_id: String,
    pub created_at: String,
}

/// Per-workspace user state: six independently persisted slices plus the
/// first-run flag, written through synchronously on every mutation.
pub struct UserStore {
    conn: Connection,
    progress: HashMap<String, ExperimentProgress>,
    bookmarks: Vec<String>,
    notes: HashMap<String, String>,
    collections: Vec<Collection>,
    sticky_notes: HashMap<String, Vec<StickyNote>>,
    additional_notes: HashMap<String, String>,
    entered_portal: bool,
    collection_seq: u64,
    autosave: NotebookAutosave,
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// A missing or malformed slice value falls back to the slice default; the
/// rest of the store keeps whatever loaded cleanly.
fn load_slice<T: DeserializeOwned + Default>(conn: &Connection, key: &str) -> T {
    match storage::state_get(conn, key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
        _ => T::default(),
    }
}

/// Early portal builds stored bookmark ids as numbers. Normalize once at
/// load; everything downstream is string-typed.
fn load_bookmarks(conn: &Connection) -> Vec<String> {
    let raw: Vec<serde_json::Value> = load_slice(conn, KEY_BOOKMARKS);
    raw.into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

impl UserStore {
    pub fn load(conn: Connection) -> UserStore {
        let progress = load_slice(&conn, KEY_PROGRESS);
        let bookmarks = load_bookmarks(&conn);
        let notes = load_slice(&conn, KEY_NOTES);
        let collections = load_slice(&conn, KEY_COLLECTIONS);
        let sticky_notes = load_slice(&conn, KEY_STICKY_NOTES);
        let additional_notes = load_slice(&conn, KEY_ADDITIONAL_NOTES);
        let entered_portal = storage::state_get(&conn, KEY_ENTERED_PORTAL)
            .ok()
            .flatten()
            .is_some_and(|v| v == "true");

        UserStore {
            conn,
            progress,
            bookmarks,
            notes,
            collections,
            sticky_notes,
            additional_notes,
            entered_portal,
            collection_seq: 0,
            autosave: NotebookAutosave::default(),
        }
    }

    fn persist<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        storage::state_set(&self.conn, key, &serde_json::to_string(value)?)
    }

    // ---- first-run flag ----

    pub fn has_entered_portal(&self) -> bool {
        self.entered_portal
    }

    pub fn enter_portal(&mut self) -> anyhow::Result<()> {
        self.entered_portal = true;
        storage::state_set(&self.conn, KEY_ENTERED_PORTAL, "true")
    }

    // ---- progress engine ----

    /// Marks one tab completed and re-derives the overall percentage.
    /// Idempotent; re-persists either way.
    pub fn mark_tab_completed(
        &mut self,
        experiment_id: &str,
        tab: Tab,
    ) -> anyhow::Result<ExperimentProgress> {
        let entry = self.progress.entry(experiment_id.to_string()).or_default();
        entry.tabs.set(tab);
        entry.overall = derive_overall(&entry.tabs);
        let updated = *entry;
        self.persist(KEY_PROGRESS, &self.progress)?;
        Ok(updated)
    }

    /// Direct overwrite of the overall percentage. Resets tab detail to
    /// all-false; callers that care about per-tab state must not use this.
    pub fn set_progress(&mut self, experiment_id: &str, percent: i64) -> anyhow::Result<()> {
        self.progress.insert(
            experiment_id.to_string(),
            ExperimentProgress {
                overall: percent,
                tabs: TabProgress::default(),
            },
        );
        self.persist(KEY_PROGRESS, &self.progress)
    }

    pub fn experiment_progress(&self, experiment_id: &str) -> ExperimentProgress {
        self.progress.get(experiment_id).copied().unwrap_or_default()
    }

    pub fn progress_map(&self) -> &HashMap<String, ExperimentProgress> {
        &self.progress
    }

    // ---- bookmarks & plain-text notes ----

    /// Flips membership; returns whether the experiment is now bookmarked.
    pub fn toggle_bookmark(&mut self, experiment_id: &str) -> anyhow::Result<bool> {
        let bookmarked = if let Some(pos) = self.bookmarks.iter().position(|id| id == experiment_id)
        {
            self.bookmarks.remove(pos);
            false
        } else {
            self.bookmarks.push(experiment_id.to_string());
            true
        };
        self.persist(KEY_BOOKMARKS, &self.bookmarks)?;
        Ok(bookmarked)
    }

    pub fn bookmarks(&self) -> &[String] {
        &self.bookmarks
    }

    pub fn save_note(&mut self, experiment_id: &str, text: &str) -> anyhow::Result<()> {
        self.notes
            .insert(experiment_id.to_string(), text.to_string());
        self.persist(KEY_NOTES, &self.notes)
    }

    pub fn note(&self, experiment_id: &str) -> &str {
        self.notes.get(experiment_id).map(String::as_str).unwrap_or("")
    }

    // ---- collections ----

    /// Millisecond timestamps alone collide under rapid creation; suffix
    /// with a per-store counter.
    fn next_collection_id(&mut self) -> String {
        self.collection_seq += 1;
        format!("{}-{}", now_ms(), self.collection_seq)
    }

    pub fn create_collection(
        &mut self,
        title: &str,
        description: &str,
    ) -> anyhow::Result<String> {
        let id = self.next_collection_id();
        self.collections.push(Collection {
            id: id.clone(),
            title: title.to_string(),
            description: description.to_string(),
            experiment_ids: Vec::new(),
            last_modified: now_ms(),
            thumbnail: String::new(),
        });
        self.persist(KEY_COLLECTIONS, &self.collections)?;
        Ok(id)
    }

    /// Returns None when the collection does not exist, otherwise whether
    /// the experiment was newly added. Adding an existing member changes
    /// nothing, including lastModified.
    pub fn add_experiment_to_collection(
        &mut self,
        collection_id: &str,
        experiment_id: &str,
        experiment_thumbnail: &str,
    ) -> anyhow::Result<Option<bool>> {
        let Some(collection) = self.collections.iter_mut().find(|c| c.id == collection_id)
        else {
            return Ok(None);
        };

        if collection.experiment_ids.iter().any(|id| id == experiment_id) {
            return Ok(Some(false));
        }

        collection.experiment_ids.push(experiment_id.to_string());
        // Wall clock may step backwards; lastModified stays monotonic per
        // collection.
        collection.last_modified = now_ms().max(collection.last_modified);
        if collection.thumbnail.is_empty() && !experiment_thumbnail.is_empty() {
            collection.thumbnail = experiment_thumbnail.to_string();
        }
        self.persist(KEY_COLLECTIONS, &self.collections)?;
        Ok(Some(true))
    }

    /// Thumbnail is not re-derived on removal.
    pub fn remove_experiment_from_collection(
        &mut self,
        collection_id: &str,
        experiment_id: &str,
    ) -> anyhow::Result<Option<bool>> {
        let Some(collection) = self.collections.iter_mut().find(|c| c.id == collection_id)
        else {
            return Ok(None);
        };

        let before = collection.experiment_ids.len();
        collection.experiment_ids.retain(|id| id != experiment_id);
        let removed = collection.experiment_ids.len() != before;
        if removed {
            collection.last_modified = now_ms().max(collection.last_modified);
        }
        self.persist(KEY_COLLECTIONS, &self.collections)?;
        Ok(Some(removed))
    }

    pub fn delete_collection(&mut self, collection_id: &str) -> anyhow::Result<bool> {
        let before = self.collections.len();
        self.collections.retain(|c| c.id != collection_id);
        let deleted = self.collections.len() != before;
        self.persist(KEY_COLLECTIONS, &self.collections)?;
        Ok(deleted)
    }

    pub fn collection_by_id(&self, collection_id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == collection_id)
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn collections_by_experiment(&self, experiment_id: &str) -> Vec<&Collection> {
        self.collections
            .iter()
            .filter(|c| c.experiment_ids.iter().any(|id| id == experiment_id))
            .collect()
    }

    // ---- sticky notes ----

    pub fn add_sticky_note(
        &mut self,
        experiment_id: &str,
        text: &str,
        color: &str,
    ) -> anyhow::Result<StickyNote> {
        let note = StickyNote {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            // Semantic color tag; the shell maps it to its palette.
            color: color.to_string(),
            experiment_id: experiment_id.to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        self.sticky_notes
            .entry(experiment_id.to_string())
            .or_default()
            .push(note.clone());
        self.persist(KEY_STICKY_NOTES, &self.sticky_notes)?;
        Ok(note)
    }

    /// Replaces the note text in place; returns whether a note matched.
    pub fn update_sticky_note(
        &mut self,
        experiment_id: &str,
        note_id: &str,
        text: &str,
    ) -> anyhow::Result<bool> {
        let updated = self
            .sticky_notes
            .get_mut(experiment_id)
            .and_then(|notes| notes.iter_mut().find(|n| n.id == note_id))
            .map(|note| note.text = text.to_string())
            .is_some();
        if updated {
            self.persist(KEY_STICKY_NOTES, &self.sticky_notes)?;
        }
        Ok(updated)
    }

    pub fn delete_sticky_note(
        &mut self,
        experiment_id: &str,
        note_id: &str,
    ) -> anyhow::Result<bool> {
        let Some(notes) = self.sticky_notes.get_mut(experiment_id) else {
            return Ok(false);
        };
        let before = notes.len();
        notes.retain(|n| n.id != note_id);
        let deleted = notes.len() != before;
        if deleted {
            self.persist(KEY_STICKY_NOTES, &self.sticky_notes)?;
        }
        Ok(deleted)
    }

    pub fn sticky_notes(&self, experiment_id: &str) -> &[StickyNote] {
        self.sticky_notes
            .get(experiment_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ---- rich-text notebook ----

    /// Wholesale overwrite of the experiment's notebook content.
    pub fn save_additional_notes(
        &mut self,
        experiment_id: &str,
        html: &str,
    ) -> anyhow::Result<()> {
        self.additional_notes
            .insert(experiment_id.to_string(), html.to_string());
        self.persist(KEY_ADDITIONAL_NOTES, &self.additional_notes)
    }

    pub fn additional_notes(&self, experiment_id: &str) -> &str {
        self.additional_notes
            .get(experiment_id)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn schedule_notebook_draft(&mut self, experiment_id: &str, content: &str, now: Instant) {
        self.autosave.schedule(experiment_id, content, now);
    }

    /// Writes the pending draft through if its quiet period has elapsed.
    /// Pumped by the request loop before each dispatch.
    pub fn flush_due_notebook(&mut self, now: Instant) -> anyhow::Result<()> {
        if let Some((experiment_id, content)) = self.autosave.take_due(now) {
            self.save_additional_notes(&experiment_id, &content)?;
        }
        Ok(())
    }

    /// Explicit save: supersedes whatever draft is pending.
    pub fn save_notebook_now(&mut self, experiment_id: &str, content: &str) -> anyhow::Result<()> {
        self.autosave.cancel();
        self.save_additional_notes(experiment_id, content)
    }

    /// Notebook teardown: the pending draft is stale, drop it unwritten.
    pub fn close_notebook(&mut self) {
        self.autosave.cancel();
    }

    pub fn notebook_draft_pending(&self) -> bool {
        self.autosave.is_pending()
    }
}
