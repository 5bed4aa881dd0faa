use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A persisted interview question/answer pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub question: String,
    pub answer: String,
    /// Comma-separated free-form labels.
    pub tags: Option<String>,
    pub difficulty: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a question.
#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// One field of a partial update.
///
/// `Unset` means the field was absent from the request and must be left
/// alone; `Null` means it was sent as `null` and should be cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    #[default]
    Unset,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    /// `(overwrite, value)` for a nullable column: when `overwrite` is false
    /// the stored value is kept, otherwise it is replaced by `value`.
    pub fn into_assignment(self) -> (bool, Option<T>) {
        match self {
            Patch::Unset => (false, None),
            Patch::Null => (true, None),
            Patch::Value(v) => (true, Some(v)),
        }
    }
}

// Only called for keys present in the payload; absent keys fall back to
// `Default` (Unset) via `#[serde(default)]`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Patch::Null, Patch::Value))
    }
}

/// Partial update of a question. Omitted fields stay untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionPatch {
    #[serde(default)]
    pub question: Patch<String>,
    #[serde(default)]
    pub answer: Patch<String>,
    #[serde(default)]
    pub tags: Patch<String>,
    #[serde(default)]
    pub difficulty: Patch<String>,
}
