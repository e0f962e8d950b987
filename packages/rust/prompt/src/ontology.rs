//! Loading and serializing guidance for the `### Ontology Codes` section.
//!
//! The serialized text is part of every prompt, so its layout is fixed: keys in
//! stored order, non-ASCII characters written literally, every value on its
//! own line with no indentation.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::debug;

use labelprep_shared::{LabelPrepError, Result};

/// Read a guidance JSON file, keeping object keys in file order.
pub fn load_guidance(path: &Path) -> Result<Value> {
    let content =
        std::fs::read_to_string(path).map_err(|e| LabelPrepError::missing_resource(path, e))?;

    let guidance: Value = serde_json::from_str(&content).map_err(|e| {
        LabelPrepError::malformed_guidance(format!("{} is not valid JSON: {e}", path.display()))
    })?;

    debug!(
        path = %path.display(),
        records = guidance.as_array().map(Vec::len),
        "loaded guidance"
    );
    Ok(guidance)
}

/// Serialize guidance with newline separators and zero indentation.
///
/// `[{"code":"A"}]` becomes `[\n{\n"code": "A"\n}\n]`.
pub fn serialize_guidance<T: Serialize + ?Sized>(guidance: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b""));
    guidance
        .serialize(&mut serializer)
        .map_err(|e| LabelPrepError::malformed_guidance(format!("serialization failed: {e}")))?;

    String::from_utf8(buf)
        .map_err(|e| LabelPrepError::malformed_guidance(format!("serialized text is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelprep_shared::GuidanceRecord;

    #[test]
    fn zero_indent_layout() {
        let guidance: Value = serde_json::from_str(r#"[{"code":"A","desc":"Alert"}]"#).unwrap();
        assert_eq!(
            serialize_guidance(&guidance).unwrap(),
            "[\n{\n\"code\": \"A\",\n\"desc\": \"Alert\"\n}\n]"
        );
    }

    #[test]
    fn keys_keep_stored_order() {
        let guidance: Value = serde_json::from_str(r#"[{"z":"1","a":"2","m":"3"}]"#).unwrap();
        let text = serialize_guidance(&guidance).unwrap();
        let z = text.find("\"z\"").unwrap();
        let a = text.find("\"a\"").unwrap();
        let m = text.find("\"m\"").unwrap();
        assert!(z < a && a < m, "keys reordered: {text}");
    }

    #[test]
    fn non_ascii_written_literally() {
        let guidance: Value =
            serde_json::from_str(r#"[{"code":"B","desc":"Bremse – straße 危险"}]"#).unwrap();
        let text = serialize_guidance(&guidance).unwrap();
        assert!(text.contains("Bremse – straße 危险"));
        assert!(!text.contains("\\u"));
    }

    #[test]
    fn empty_containers_stay_compact() {
        let guidance: Value = serde_json::from_str(r#"[]"#).unwrap();
        assert_eq!(serialize_guidance(&guidance).unwrap(), "[]");
        let nested: Value = serde_json::from_str(r#"[{"k":{}}]"#).unwrap();
        assert_eq!(serialize_guidance(&nested).unwrap(), "[\n{\n\"k\": {}\n}\n]");
    }

    #[test]
    fn typed_records_serialize_like_values() {
        let mut record = GuidanceRecord::new();
        record.insert("code", "A");
        record.insert("desc", "Alert");
        let typed = serialize_guidance(&[record]).unwrap();

        let value: Value = serde_json::from_str(r#"[{"code":"A","desc":"Alert"}]"#).unwrap();
        assert_eq!(typed, serialize_guidance(&value).unwrap());
    }
}
