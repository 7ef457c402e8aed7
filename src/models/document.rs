use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Opaque revision token assigned by the store on every accepted write.
///
/// Format: `<generation>-<digest>`. Only the store looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generation counter, 0 when the token was not issued by this store
    pub fn generation(&self) -> u64 {
        self.0
            .split_once('-')
            .and_then(|(generation, _)| generation.parse().ok())
            .unwrap_or(0)
    }

    /// Next revision for a document body written over `previous`
    pub fn next(previous: Option<&Revision>, fields: &Map<String, Value>) -> Self {
        let generation = previous.map(Revision::generation).unwrap_or(0) + 1;

        let mut hasher = DefaultHasher::new();
        generation.hash(&mut hasher);
        // Map 的 Display 输出是确定的（键有序）
        Value::Object(fields.clone()).to_string().hash(&mut hasher);

        Self(format!("{}-{:016x}", generation, hasher.finish()))
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored record: an id, the revision it was stored at, and an open set of fields.
///
/// The store does not know what a task is; it only looks at `id` and `revision`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub revision: Option<Revision>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            revision: None,
            fields,
        }
    }

    pub fn with_revision(mut self, revision: Option<Revision>) -> Self {
        self.revision = revision;
        self
    }
}
