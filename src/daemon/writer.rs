//! Single-writer queue for history operations.
//!
//! One task owns the [`HistoryStore`] and runs operations strictly in the
//! order they were submitted. Each operation finishes its whole
//! load-modify-store cycle before the next one starts, so concurrent
//! clients cannot overwrite each other's changes.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::history::{HistoryStore, Outcome, Status};
use crate::storage::{KeyValueStore, NewEntry, StorageError};

/// Pending operations beyond this block submitters until the writer
/// catches up.
const QUEUE_DEPTH: usize = 64;

/// A history operation to run on the writer task.
#[derive(Debug, Clone)]
pub enum Operation {
    Insert(NewEntry),
    Delete(Uuid),
    TogglePin(Uuid),
    ClearUnpinned,
    GetAll,
}

struct Job {
    operation: Operation,
    reply: oneshot::Sender<Result<Outcome, StorageError>>,
}

/// Cloneable handle for submitting operations to the writer.
#[derive(Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<Job>,
}

impl WriterHandle {
    /// Queues an operation and waits for its result.
    pub async fn submit(&self, operation: Operation) -> Result<Outcome, StorageError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job { operation, reply })
            .await
            .map_err(|_| StorageError::Unavailable("history writer has stopped".to_string()))?;

        rx.await
            .map_err(|_| StorageError::Unavailable("history writer dropped the request".to_string()))?
    }

    pub async fn insert(&self, entry: NewEntry) -> Result<Outcome, StorageError> {
        self.submit(Operation::Insert(entry)).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<Outcome, StorageError> {
        self.submit(Operation::Delete(id)).await
    }

    pub async fn toggle_pin(&self, id: Uuid) -> Result<Outcome, StorageError> {
        self.submit(Operation::TogglePin(id)).await
    }

    pub async fn clear_unpinned(&self) -> Result<Outcome, StorageError> {
        self.submit(Operation::ClearUnpinned).await
    }

    pub async fn get_all(&self) -> Result<Outcome, StorageError> {
        self.submit(Operation::GetAll).await
    }
}

/// Starts the writer task.
///
/// The task exits once every [`WriterHandle`] has been dropped.
pub fn spawn<S>(store: HistoryStore<S>) -> (WriterHandle, JoinHandle<()>)
where
    S: KeyValueStore + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Job>(QUEUE_DEPTH);

    let handle = tokio::spawn(async move {
        tracing::debug!("History writer started");
        while let Some(job) = rx.recv().await {
            let result = run(&store, job.operation);
            if let Err(ref e) = result {
                tracing::warn!("History operation failed: {}", e);
            }
            // The submitter may have given up waiting; nothing to do then.
            let _ = job.reply.send(result);
        }
        tracing::debug!("History writer stopped");
    });

    (WriterHandle { tx }, handle)
}

fn run<S: KeyValueStore>(
    store: &HistoryStore<S>,
    operation: Operation,
) -> Result<Outcome, StorageError> {
    match operation {
        Operation::Insert(entry) => store.insert(entry),
        Operation::Delete(id) => store.delete_by_id(&id),
        Operation::TogglePin(id) => store.toggle_pin(&id),
        Operation::ClearUnpinned => store.clear_unpinned(),
        Operation::GetAll => Ok(Outcome {
            history: store.get_all()?,
            status: Status::Unchanged,
        }),
    }
}
