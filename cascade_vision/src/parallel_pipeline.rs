// THEORY:
// The classifier itself is a pure function, so parallelism is plain fan-out. A
// single dispatcher task receives every `ClassificationTask` and hands them to the
// workers round-robin over per-worker unbounded channels. Each worker runs the
// synchronous cascade on tokio's blocking pool and answers through the task's
// oneshot channel. There is no shared mutable state; every worker holds its own
// copy of the (`Copy`) classifier, which only points at the static domain profile.

use crate::core_modules::domain::Domain;
use crate::error::{ClassifyError, ClassifyResult};
use crate::pipeline::{CascadeClassifier, ClassificationResult};
use futures::future::join_all;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct ClassificationTask {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub result_sender: oneshot::Sender<ClassificationResult>,
}

pub struct ClassifierPool {
    classifier: CascadeClassifier,
    task_sender: mpsc::UnboundedSender<ClassificationTask>,
    dispatcher: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
}

impl ClassifierPool {
    /// Spawns the dispatcher and `worker_count` workers (at least one).
    /// Must be called from inside a tokio runtime.
    pub fn new(domain: Domain, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let classifier = CascadeClassifier::new(domain);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<ClassificationTask>();

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<ClassificationTask>())
            .unzip();

        // Dispatcher: round-robin until the pool's sender is dropped.
        let dispatcher = tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                if let Err(returned) = worker_senders[worker_idx].send(task) {
                    warn!(worker = worker_idx, filename = %returned.0.filename, "worker channel closed");
                }
                worker_idx = (worker_idx + 1) % worker_count;
            }
        });

        let workers = worker_receivers
            .into_iter()
            .enumerate()
            .map(|(id, mut worker_receiver)| {
                tokio::spawn(async move {
                    while let Some(task) = worker_receiver.recv().await {
                        Self::run_task(id, classifier, task).await;
                    }
                    debug!(worker = id, "worker drained");
                })
            })
            .collect();

        Self {
            classifier,
            task_sender,
            dispatcher,
            workers,
        }
    }

    /// One worker per logical CPU.
    pub fn with_default_workers(domain: Domain) -> Self {
        Self::new(domain, num_cpus::get())
    }

    pub fn domain(&self) -> Domain {
        self.classifier.domain()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    async fn run_task(worker: usize, classifier: CascadeClassifier, task: ClassificationTask) {
        let ClassificationTask {
            bytes,
            filename,
            result_sender,
        } = task;
        let outcome = tokio::task::spawn_blocking(move || classifier.classify(&bytes, &filename)).await;
        match outcome {
            Ok(result) => {
                // The caller may have stopped waiting; nothing to do then.
                let _ = result_sender.send(result);
            }
            Err(err) => warn!(worker, error = %err, "classification task panicked"),
        }
    }

    pub async fn classify(&self, bytes: Vec<u8>, filename: impl Into<String>) -> ClassifyResult<ClassificationResult> {
        let (result_sender, result_receiver) = oneshot::channel();

        let task = ClassificationTask {
            bytes,
            filename: filename.into(),
            result_sender,
        };

        self.task_sender.send(task).map_err(|_| ClassifyError::PoolClosed)?;

        result_receiver.await.map_err(|_| ClassifyError::WorkerDropped)
    }

    /// Classifies every `(filename, bytes)` pair concurrently; results keep input order.
    pub async fn classify_batch<I>(&self, items: I) -> Vec<ClassifyResult<ClassificationResult>>
    where
        I: IntoIterator<Item = (String, Vec<u8>)>,
    {
        join_all(items.into_iter().map(|(filename, bytes)| self.classify(bytes, filename))).await
    }

    /// Closes the queue and waits for in-flight tasks to finish.
    pub async fn shutdown(self) {
        let Self {
            task_sender,
            dispatcher,
            workers,
            ..
        } = self;
        drop(task_sender);
        if let Err(err) = dispatcher.await {
            warn!(error = %err, "dispatcher ended abnormally");
        }
        for result in join_all(workers).await {
            if let Err(err) = result {
                warn!(error = %err, "worker ended abnormally");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::pixel::pixel::ColorSample;
    use crate::core_modules::utils::image_helper::image_helper::{encode_png, solid};

    fn png(color: ColorSample) -> Vec<u8> {
        encode_png(&solid(90, 90, color)).expect("encodable")
    }

    #[tokio::test]
    async fn pool_matches_the_direct_classifier() {
        let pool = ClassifierPool::new(Domain::Shield, 3);
        assert_eq!(pool.worker_count(), 3);
        let bytes = png(ColorSample::new(20, 20, 200));
        let direct = CascadeClassifier::new(Domain::Shield).classify(&bytes, "blue.png");
        let pooled = pool.classify(bytes, "blue.png").await.expect("pool is open");
        assert!(pooled.same_outcome(&direct));
        assert_eq!(pooled.label, "PSG");
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn batch_keeps_input_order() {
        let pool = ClassifierPool::new(Domain::Expression, 2);
        let items = vec![
            ("happy.png".to_string(), png(ColorSample::new(250, 230, 40))),
            ("broken.png".to_string(), b"garbage".to_vec()),
            ("sad.png".to_string(), png(ColorSample::new(10, 10, 200))),
        ];
        let results: Vec<_> = pool
            .classify_batch(items)
            .await
            .into_iter()
            .map(|r| r.expect("pool is open"))
            .collect();
        let labels: Vec<_> = results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["happy", "error", "sad"]);
        assert_eq!(results[1].filename, "broken.png");
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn zero_workers_still_gets_one() {
        let pool = ClassifierPool::new(Domain::Shield, 0);
        assert_eq!(pool.worker_count(), 1);
        pool.shutdown().await;
    }
}
