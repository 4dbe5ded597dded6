use crate::model::{Document, Node, normalize};

/// Key the host stores the serialized children array under.
pub const STORAGE_KEY: &str = "content";

pub fn to_stored_json(doc: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string(&doc.children)
}

/// Rebuilds a document from its stored form. Any malformed or empty payload
/// falls back to the default single-empty-paragraph document; the failure is
/// recorded, never surfaced.
pub fn hydrate(raw: &str) -> Document {
    match serde_json::from_str::<Vec<Node>>(raw) {
        Ok(children) if !children.is_empty() => {
            let mut doc = Document { children };
            normalize(&mut doc);
            doc
        }
        Ok(_) => {
            tracing::warn!("stored document was empty, using the default document");
            Document::default()
        }
        Err(err) => {
            tracing::warn!(%err, "failed to hydrate stored document, using the default document");
            Document::default()
        }
    }
}
