//! Core domain types for labelprep category folders.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label placeholder written for segments that have not been labeled yet.
pub const EMPTY_LABELS: &str = "[]";

/// Column order of the merged per-category CSV.
pub const MERGED_COLUMNS: [&str; 4] = ["segment_id", "segment_labels", "segment_text", "segment_type"];

// ---------------------------------------------------------------------------
// SegmentType
// ---------------------------------------------------------------------------

/// Provenance of a segment in the merged table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentType {
    /// Came from the classified source and carries assigned labels.
    Classified,
    /// Came from the unclassified source and awaits labeling.
    Unclassified,
}

impl SegmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classified => "classified",
            Self::Unclassified => "unclassified",
        }
    }
}

impl std::fmt::Display for SegmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SegmentRecord
// ---------------------------------------------------------------------------

/// One row of the merged table. Field order matches [`MERGED_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRecord {
    /// Key of the segment within its category, as written in the source.
    pub segment_id: String,
    /// JSON array text; `[]` for unlabeled segments.
    pub segment_labels: String,
    /// Raw text to classify.
    pub segment_text: String,
    pub segment_type: SegmentType,
}

impl SegmentRecord {
    /// A labeled segment. `labels` must already be JSON array text.
    pub fn classified(
        segment_id: impl Into<String>,
        labels: impl Into<String>,
        segment_text: impl Into<String>,
    ) -> Self {
        Self {
            segment_id: segment_id.into(),
            segment_labels: labels.into(),
            segment_text: segment_text.into(),
            segment_type: SegmentType::Classified,
        }
    }

    /// A segment awaiting labels.
    pub fn unclassified(segment_id: impl Into<String>, segment_text: impl Into<String>) -> Self {
        Self {
            segment_id: segment_id.into(),
            segment_labels: EMPTY_LABELS.to_string(),
            segment_text: segment_text.into(),
            segment_type: SegmentType::Unclassified,
        }
    }
}

// ---------------------------------------------------------------------------
// GuidanceRecord
// ---------------------------------------------------------------------------

/// One ontology entry: column name to cell text, in source column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuidanceRecord(serde_json::Map<String, Value>);

impl GuidanceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. Later inserts of the same key keep the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), Value::String(value.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_type_serializes_lowercase() {
        let json = serde_json::to_string(&SegmentType::Unclassified).expect("serialize");
        assert_eq!(json, "\"unclassified\"");
        assert_eq!(SegmentType::Classified.to_string(), "classified");
    }

    #[test]
    fn unclassified_record_gets_empty_labels() {
        let record = SegmentRecord::unclassified("2", "go");
        assert_eq!(record.segment_labels, "[]");
        assert_eq!(record.segment_type, SegmentType::Unclassified);
    }

    #[test]
    fn guidance_record_preserves_column_order() {
        let mut record = GuidanceRecord::new();
        record.insert("desc", "Alert");
        record.insert("code", "A");
        record.insert("notes", "");
        record.insert("desc", "Alarm");

        let json = serde_json::to_string(&record).expect("serialize");
        assert_eq!(json, r#"{"desc":"Alarm","code":"A","notes":""}"#);
    }
}
