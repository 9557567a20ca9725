use std::sync::Arc;

use tracing::{info, warn};

use crate::application::connection::ConnectionManager;
use crate::application::interfaces::SketchSelector;
use crate::domain::{Backend, SketchDocument, SketchInfo};

/// Result of a collect operation.
#[derive(Debug)]
pub enum CollectOutcome {
    /// The backend reported no sketches; no export was attempted.
    NoSketches,
    /// Multiple sketches were offered and the selector chose none.
    NothingSelected,
    /// Exports ran; failed items are listed by name and never abort the rest.
    Collected {
        documents: Vec<SketchDocument>,
        failed: Vec<String>,
    },
}

impl CollectOutcome {
    /// Number of successfully exported documents.
    pub fn collected_count(&self) -> usize {
        match self {
            CollectOutcome::Collected { documents, .. } => documents.len(),
            _ => 0,
        }
    }
}

/// Collects sketches from one backend: list, select, export each
/// independently.
pub struct CollectSketchesUseCase {
    manager: Arc<ConnectionManager>,
}

impl CollectSketchesUseCase {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    /// A single listed sketch is auto-selected; the selector is only
    /// consulted when the backend offers more than one.
    pub async fn execute(
        &self,
        backend: Backend,
        selector: &dyn SketchSelector,
    ) -> CollectOutcome {
        let sketches = self.manager.list_sketches(backend).await;

        if sketches.is_empty() {
            info!(backend = %backend, "no sketches available");
            return CollectOutcome::NoSketches;
        }

        let selected: Vec<SketchInfo> = if sketches.len() == 1 {
            sketches
        } else {
            let names = selector.choose(&sketches).await;
            let selected: Vec<SketchInfo> = sketches
                .into_iter()
                .filter(|s| names.contains(&s.name))
                .collect();
            if selected.is_empty() {
                info!(backend = %backend, "nothing selected");
                return CollectOutcome::NothingSelected;
            }
            selected
        };

        let mut documents = Vec::new();
        let mut failed = Vec::new();
        for sketch in &selected {
            match self.manager.export_sketch(backend, &sketch.name).await {
                Some(doc) => documents.push(doc),
                None => {
                    warn!(backend = %backend, sketch = %sketch.name, "export failed, continuing");
                    failed.push(sketch.name.clone());
                }
            }
        }

        info!(
            backend = %backend,
            collected = documents.len(),
            failed = failed.len(),
            "collect finished"
        );
        CollectOutcome::Collected { documents, failed }
    }
}
