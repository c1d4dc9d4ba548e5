//! Attachment linker.
//!
//! Client-supplied references are kept only when they carry a non-empty
//! filename, a MIME type and a whole, non-negative byte size. Anything else is
//! dropped without an error reaching the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// A well-formed reference to a previously stored file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub filename: String,
    pub mime: String,
    pub size: i64,
}

impl AttachmentRef {
    pub fn from_value(value: &Value) -> Option<Self> {
        let filename = value.get("filename")?.as_str()?.trim();
        let mime = value.get("mime")?.as_str()?.trim();
        if filename.is_empty() || mime.is_empty() {
            return None;
        }

        let size = whole_bytes(value.get("size")?)?;

        Some(Self {
            filename: filename.to_string(),
            mime: mime.to_string(),
            size,
        })
    }
}

/// Integer byte count. `1024.0` is accepted; fractional, negative or
/// out-of-range numbers are not.
fn whole_bytes(size: &Value) -> Option<i64> {
    if let Some(n) = size.as_i64() {
        return (n >= 0).then_some(n);
    }
    let f = size.as_f64()?;
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < i64::MAX as f64).then(|| f as i64)
}

/// Keep the well-formed references, in order.
pub fn link_refs(raw: &[Value]) -> Vec<AttachmentRef> {
    let kept: Vec<AttachmentRef> = raw.iter().filter_map(AttachmentRef::from_value).collect();
    if kept.len() < raw.len() {
        debug!(
            supplied = raw.len(),
            kept = kept.len(),
            "Dropped malformed attachment references"
        );
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_well_formed_reference_kept() {
        let refs = link_refs(&[json!({"filename": "a.jpg", "mime": "image/jpeg", "size": 1024})]);
        assert_eq!(
            refs,
            vec![AttachmentRef {
                filename: "a.jpg".to_string(),
                mime: "image/jpeg".to_string(),
                size: 1024,
            }]
        );
    }

    #[test]
    fn test_malformed_references_silently_dropped() {
        let refs = link_refs(&[
            json!({"filename": "keep.png", "mime": "image/png", "size": 10}),
            json!({"filename": "", "mime": "image/png", "size": 10}),
            json!({"filename": "nomime.png", "size": 10}),
            json!({"filename": "strsize.png", "mime": "image/png", "size": "10"}),
            json!({"filename": "neg.png", "mime": "image/png", "size": -1}),
            json!("just a string"),
            json!(null),
        ]);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].filename, "keep.png");
    }

    #[test]
    fn test_non_integral_sizes_dropped() {
        let refs = link_refs(&[
            json!({"filename": "frac.jpg", "mime": "image/jpeg", "size": 12.7}),
            json!({"filename": "huge.jpg", "mime": "image/jpeg", "size": 1e30}),
            json!({"filename": "big.jpg", "mime": "image/jpeg", "size": u64::MAX}),
            json!({"filename": "whole.jpg", "mime": "image/jpeg", "size": 2048.0}),
        ]);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].filename, "whole.jpg");
        assert_eq!(refs[0].size, 2048);
    }

    #[test]
    fn test_empty_input() {
        assert!(link_refs(&[]).is_empty());
    }
}
