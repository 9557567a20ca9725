use async_trait::async_trait;

use crate::domain::SketchInfo;

/// Chooses which sketches to collect when a backend offers more than one.
///
/// Implemented by the surrounding application (typically a selection dialog).
/// It is only consulted for multi-sketch listings; a single sketch is
/// auto-selected. Returning an empty set cancels the collection.
#[async_trait]
pub trait SketchSelector: Send + Sync {
    async fn choose(&self, sketches: &[SketchInfo]) -> Vec<String>;
}
