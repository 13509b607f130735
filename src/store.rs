use crate::model::{id_text, normalize_assignment_fields, normalize_class_fields};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

pub type Record = Map<String, Value>;

/// Every independently managed record collection, by durable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Classes,
    Assignments,
    Skills,
    TodoItems,
    References,
    AdditionalResources,
    Extracurriculars,
    Internships,
    SkillsToGain,
    Applications,
    Contacts,
}

impl EntityKind {
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Classes,
        EntityKind::Assignments,
        EntityKind::Skills,
        EntityKind::TodoItems,
        EntityKind::References,
        EntityKind::AdditionalResources,
        EntityKind::Extracurriculars,
        EntityKind::Internships,
        EntityKind::SkillsToGain,
        EntityKind::Applications,
        EntityKind::Contacts,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Classes => "classes",
            Self::Assignments => "assignments",
            Self::Skills => "skills",
            Self::TodoItems => "todoItems",
            Self::References => "references",
            Self::AdditionalResources => "additionalResources",
            Self::Extracurriculars => "extracurriculars",
            Self::Internships => "internships",
            Self::SkillsToGain => "skillsToGain",
            Self::Applications => "applications",
            Self::Contacts => "contacts",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == s)
    }

    /// Collections the grade report is derived from.
    pub fn feeds_grades(self) -> bool {
        matches!(self, Self::Classes | Self::Assignments)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown collection kind: {0}")]
    UnknownKind(String),
    #[error("{0} must be a JSON object")]
    NotAnObject(&'static str),
    #[error("select a workspace first")]
    NoWorkspace,
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownKind(_) => "unknown_kind",
            Self::NotAnObject(_) => "bad_params",
            Self::NoWorkspace => "no_workspace",
        }
    }
}

/// Durable key-value substrate under the store. Each key holds one
/// serialized collection.
pub trait KvBackend {
    fn read(&self, key: &str) -> anyhow::Result<Option<String>>;
    /// Writes all entries or none of them.
    fn write_many(&mut self, entries: &[(&str, String)]) -> anyhow::Result<()>;
}

/// Keyed-record collections with an in-memory copy that stays
/// authoritative when a write to the backend fails.
pub struct CollectionStore {
    backend: Box<dyn KvBackend>,
    cache: HashMap<EntityKind, Vec<Record>>,
}

impl CollectionStore {
    pub fn new(backend: Box<dyn KvBackend>) -> Self {
        Self {
            backend,
            cache: HashMap::new(),
        }
    }

    pub fn records(&mut self, kind: EntityKind) -> &[Record] {
        self.loaded(kind).as_slice()
    }

    pub fn load_all(&mut self, kind: EntityKind) -> Vec<Record> {
        self.records(kind).to_vec()
    }

    pub fn find(&mut self, kind: EntityKind, id: &str) -> Option<Record> {
        self.records(kind)
            .iter()
            .find(|r| record_has_id(r, id))
            .cloned()
    }

    /// Appends a record under a fresh id. Any `id` in `data` is ignored.
    pub fn add(&mut self, kind: EntityKind, mut data: Record) -> Vec<Record> {
        data.remove("id");
        normalize_fields(kind, &mut data);
        if kind == EntityKind::TodoItems && !data.contains_key("completed") {
            data.insert("completed".to_string(), Value::Bool(false));
        }

        let mut record = Record::new();
        record.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        record.extend(data);

        self.loaded(kind).push(record);
        self.persist(&[kind]);
        self.load_all(kind)
    }

    /// Merges `patch` into the record with `id`. The id itself never changes.
    pub fn update(&mut self, kind: EntityKind, id: &str, mut patch: Record) -> Vec<Record> {
        patch.remove("id");
        normalize_fields(kind, &mut patch);

        let mut changed = false;
        if let Some(record) = self.loaded(kind).iter_mut().find(|r| record_has_id(r, id)) {
            record.extend(patch);
            changed = true;
        }
        if changed {
            self.persist(&[kind]);
        } else {
            debug!(kind = kind.key(), id, "update skipped, no such record");
        }
        self.load_all(kind)
    }

    /// Filters out the record with `id`. Removing a class also removes its
    /// assignments, persisted together.
    pub fn remove(&mut self, kind: EntityKind, id: &str) -> Vec<Record> {
        self.loaded(kind).retain(|r| !record_has_id(r, id));
        if kind == EntityKind::Classes {
            self.loaded(EntityKind::Assignments)
                .retain(|a| a.get("classId").map(id_text).as_deref() != Some(id));
            self.persist(&[EntityKind::Classes, EntityKind::Assignments]);
        } else {
            self.persist(&[kind]);
        }
        self.load_all(kind)
    }

    fn loaded(&mut self, kind: EntityKind) -> &mut Vec<Record> {
        if !self.cache.contains_key(&kind) {
            let records = read_collection(self.backend.as_ref(), kind);
            self.cache.insert(kind, records);
        }
        self.cache.entry(kind).or_default()
    }

    fn persist(&mut self, kinds: &[EntityKind]) {
        let mut entries: Vec<(&str, String)> = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let records = self.cache.get(&kind).map(Vec::as_slice).unwrap_or(&[]);
            match serde_json::to_string(records) {
                Ok(payload) => entries.push((kind.key(), payload)),
                Err(e) => warn!(kind = kind.key(), error = %e, "failed to serialize collection"),
            }
        }
        if let Err(e) = self.backend.write_many(&entries) {
            warn!(
                keys = ?kinds.iter().map(|k| k.key()).collect::<Vec<_>>(),
                error = %format!("{e:#}"),
                "failed to persist collections; keeping in-memory copy"
            );
        }
    }
}

fn normalize_fields(kind: EntityKind, data: &mut Record) {
    match kind {
        EntityKind::Classes => normalize_class_fields(data),
        EntityKind::Assignments => normalize_assignment_fields(data),
        _ => {}
    }
}

fn record_has_id(record: &Record, id: &str) -> bool {
    record.get("id").map(id_text).as_deref() == Some(id)
}

/// Corrupt or unreadable payloads degrade to an empty collection for that
/// key only.
fn read_collection(backend: &dyn KvBackend, kind: EntityKind) -> Vec<Record> {
    let payload = match backend.read(kind.key()) {
        Ok(Some(p)) => p,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(kind = kind.key(), error = %format!("{e:#}"), "failed to read collection");
            return Vec::new();
        }
    };
    let values: Vec<Value> = match serde_json::from_str(&payload) {
        Ok(v) => v,
        Err(e) => {
            warn!(kind = kind.key(), error = %e, "corrupt collection payload, using empty");
            return Vec::new();
        }
    };

    let total = values.len();
    let records: Vec<Record> = values
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();
    if records.len() != total {
        warn!(
            kind = kind.key(),
            dropped = total - records.len(),
            "dropped non-object entries from collection"
        );
    }
    records
}
