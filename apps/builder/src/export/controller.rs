//! Export controller — owns the "generating" flag and runs one export at a
//! time on its own Tokio task.
//!
//! The flag is cleared by a drop guard living inside the task, so it resets
//! after success, failure, or a panic inside the collaborator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::errors::ExportError;
use crate::export::{ExportCollaborator, ExportReceipt, RenderedSnapshot};

struct GeneratingGuard(Arc<AtomicBool>);

impl Drop for GeneratingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// An export in flight.
#[derive(Debug)]
pub struct ExportHandle {
    revision: u64,
    task: JoinHandle<Result<ExportReceipt, ExportError>>,
}

impl ExportHandle {
    /// Revision of the snapshot being exported.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn wait(self) -> Result<ExportReceipt, ExportError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(ExportError::Aborted(e.to_string())),
        }
    }
}

pub struct ExportController {
    collaborator: Arc<dyn ExportCollaborator>,
    generating: Arc<AtomicBool>,
}

impl ExportController {
    pub fn new(collaborator: Arc<dyn ExportCollaborator>) -> Self {
        Self {
            collaborator,
            generating: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    /// Starts exporting `snapshot` on the current Tokio runtime. Rejected with
    /// `InProgress` while another export is running.
    pub fn start(&self, snapshot: RenderedSnapshot) -> Result<ExportHandle, ExportError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ExportError::Aborted(format!("no async runtime: {e}")))?;

        if self
            .generating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ExportError::InProgress);
        }

        let guard = GeneratingGuard(Arc::clone(&self.generating));
        let collaborator = Arc::clone(&self.collaborator);
        let revision = snapshot.revision();
        info!(
            "Export started via {} (revision {revision})",
            collaborator.name()
        );

        let task = runtime.spawn(async move {
            let _guard = guard;
            let result = collaborator.export(snapshot).await;
            match &result {
                Ok(receipt) => info!(
                    "Export finished: {} ({} pages)",
                    receipt.path.display(),
                    receipt.pages
                ),
                Err(e) => error!("Export failed: {e}"),
            }
            result
        });

        Ok(ExportHandle { revision, task })
    }
}
