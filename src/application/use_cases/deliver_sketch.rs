use std::sync::Arc;

use tracing::debug;

use crate::application::connection::ConnectionManager;
use crate::domain::{transform_sketch, Backend, SketchDocument, TransformRequest};

/// Delivers a sketch to one backend, transforming it first when the request
/// is not the identity.
pub struct DeliverSketchUseCase {
    manager: Arc<ConnectionManager>,
}

impl DeliverSketchUseCase {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    /// Returns the name of the created sketch, or `None` when the import
    /// failed. The best-effort open-after-import inside the manager never
    /// changes this result.
    pub async fn execute(
        &self,
        backend: Backend,
        doc: &SketchDocument,
        name: Option<&str>,
        plane: Option<&str>,
        request: &TransformRequest,
    ) -> Option<String> {
        let transformed;
        let payload = if request.is_identity() {
            doc
        } else {
            debug!(
                backend = %backend,
                dx = request.dx,
                dy = request.dy,
                angle = request.angle,
                strip_constraints = request.strip_constraints,
                "transforming sketch before delivery"
            );
            transformed = transform_sketch(doc, request);
            &transformed
        };

        self.manager.import_sketch(backend, payload, name, plane).await
    }
}
