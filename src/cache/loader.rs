//! Background load worker.

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Condvar, Mutex};

use crate::assets::Asset;
use crate::cache::AssetCache;
use crate::error::AssetError;
use crate::events::CacheEvent;

struct LoadTask {
    key: String,
    load: Box<dyn FnOnce() -> Result<Asset, AssetError> + Send>,
}

/// Pending-task counter, independent of the cache lock so enqueueing is
/// never blocked by cache contention.
#[derive(Default)]
struct PendingLoads {
    count: Mutex<usize>,
    idle: Condvar,
}

impl PendingLoads {
    fn add_one(&self) {
        *self.count.lock() += 1;
    }

    fn finish_one(&self) {
        let mut count = self.count.lock();
        *count -= 1;
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.idle.wait(&mut count);
        }
    }

    fn current(&self) -> usize {
        *self.count.lock()
    }
}

/// Single background thread executing load tasks in submission order and
/// publishing results into an [`AssetCache`].
///
/// Task construction runs entirely off the cache lock; results enter the
/// cache through [`AssetCache::insert`]. A failed task is logged, reported
/// through the cache's event hub, and dropped — it is never retried and
/// never surfaces to a caller.
///
/// Dropping the worker closes the queue, lets the thread drain every task
/// already enqueued, and joins it, so no accepted task is silently lost.
pub struct AsyncLoadWorker {
    queue: Option<Sender<LoadTask>>,
    pending: Arc<PendingLoads>,
    thread: Option<JoinHandle<()>>,
}

impl AsyncLoadWorker {
    /// Spawn the worker thread writing into `cache`.
    pub fn spawn(cache: Arc<AssetCache>) -> Self {
        let (queue, tasks) = unbounded();
        let pending = Arc::new(PendingLoads::default());
        let thread = {
            let pending = pending.clone();
            std::thread::Builder::new()
                .name("asset-loader".into())
                .spawn(move || worker_loop(tasks, cache, pending))
                .expect("failed to spawn asset loader thread")
        };
        Self {
            queue: Some(queue),
            pending,
            thread: Some(thread),
        }
    }

    /// Append a load task for `key`. Non-blocking.
    pub fn enqueue<F>(&self, key: impl Into<String>, load: F)
    where
        F: FnOnce() -> Result<Asset, AssetError> + Send + 'static,
    {
        let key = key.into();
        self.pending.add_one();
        let task = LoadTask {
            key,
            load: Box::new(load),
        };
        if let Some(queue) = &self.queue {
            if queue.send(task).is_ok() {
                return;
            }
        }
        // Queue already closed; the task was never accepted.
        self.pending.finish_one();
        log::warn!("async load enqueued after worker shutdown; task dropped");
    }

    /// Block until the pending-task count reaches zero.
    ///
    /// Loads may be enqueued concurrently, so this only guarantees that no
    /// task was pending at some instant during the call. Callers needing a
    /// strict snapshot must stop enqueueing first.
    pub fn wait_for_all_loads(&self) {
        self.pending.wait_idle();
    }

    /// Number of tasks accepted but not yet finished.
    pub fn pending_loads(&self) -> usize {
        self.pending.current()
    }
}

impl Drop for AsyncLoadWorker {
    fn drop(&mut self) {
        // Closing the channel is the shutdown signal; the thread drains the
        // remaining queue before exiting.
        self.queue.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("asset loader thread panicked during shutdown");
            }
        }
    }
}

fn worker_loop(tasks: Receiver<LoadTask>, cache: Arc<AssetCache>, pending: Arc<PendingLoads>) {
    // recv blocks until a task arrives or every sender is gone; once the
    // owning worker handle drops its sender, the loop drains what is left
    // and exits.
    while let Ok(task) = tasks.recv() {
        match (task.load)() {
            Ok(asset) => {
                cache.insert(&task.key, asset);
                log::trace!("async load of {:?} completed", task.key);
            }
            Err(cause) => {
                cache.events().emit(CacheEvent::AsyncLoadFailed {
                    key: task.key.clone(),
                    error: cause.to_string(),
                });
                let failure = AssetError::AsyncTaskFailed {
                    key: task.key,
                    source: Box::new(cause),
                };
                log::warn!("dropping failed load task: {failure}");
            }
        }
        pending.finish_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetPayload, MaterialAsset, MaterialDescriptor};
    use parking_lot::Mutex;
    use std::time::Duration;

    fn dummy_asset(key: &str) -> Asset {
        Asset::new(
            key,
            AssetPayload::Material(MaterialAsset::master(MaterialDescriptor::default())),
        )
    }

    #[test]
    fn wait_for_all_loads_applies_every_task() {
        let cache = Arc::new(AssetCache::new());
        let worker = AsyncLoadWorker::spawn(cache.clone());

        for i in 0..5 {
            let key = format!("asset-{i}");
            let loaded = key.clone();
            worker.enqueue(key, move || Ok(dummy_asset(&loaded)));
        }
        worker.wait_for_all_loads();

        assert_eq!(worker.pending_loads(), 0);
        for i in 0..5 {
            assert!(cache.contains(&format!("asset-{i}")));
        }
    }

    #[test]
    fn tasks_run_in_submission_order() {
        let cache = Arc::new(AssetCache::new());
        let worker = AsyncLoadWorker::spawn(cache.clone());
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..4 {
            let order = order.clone();
            worker.enqueue(format!("k{i}"), move || {
                order.lock().push(i);
                Ok(dummy_asset("k"))
            });
        }
        worker.wait_for_all_loads();
        assert_eq!(*order.lock(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn failed_task_reports_only_through_events() {
        let cache = Arc::new(AssetCache::new());
        let events = cache.events().subscribe();
        let worker = AsyncLoadWorker::spawn(cache.clone());

        worker.enqueue("good", || Ok(dummy_asset("good")));
        worker.enqueue("bad", || {
            Err(AssetError::NotFound {
                path: "missing.png".into(),
            })
        });
        // A failure must not wedge the pending counter.
        worker.wait_for_all_loads();

        assert!(cache.contains("good"));
        assert!(!cache.contains("bad"));
        let event = events
            .recv_timeout(Duration::from_secs(1))
            .expect("failure event");
        match event {
            CacheEvent::AsyncLoadFailed { key, error } => {
                assert_eq!(key, "bad");
                assert!(error.contains("missing.png"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn wait_blocks_until_slow_task_lands() {
        let cache = Arc::new(AssetCache::new());
        let worker = AsyncLoadWorker::spawn(cache.clone());

        worker.enqueue("slow", || {
            std::thread::sleep(Duration::from_millis(50));
            Ok(dummy_asset("slow"))
        });
        worker.wait_for_all_loads();
        // Visible in the cache the moment the wait returns.
        assert!(cache.contains("slow"));
    }

    #[test]
    fn drop_drains_accepted_tasks() {
        let cache = Arc::new(AssetCache::new());
        let worker = AsyncLoadWorker::spawn(cache.clone());

        for i in 0..10 {
            let key = format!("drain-{i}");
            let loaded = key.clone();
            worker.enqueue(key, move || Ok(dummy_asset(&loaded)));
        }
        drop(worker);

        for i in 0..10 {
            assert!(cache.contains(&format!("drain-{i}")));
        }
    }

    #[test]
    fn async_and_sync_loads_converge_on_one_instance() {
        let cache = Arc::new(AssetCache::new());
        let worker = AsyncLoadWorker::spawn(cache.clone());

        let sync = cache
            .get_or_load("both", || Ok(dummy_asset("both")))
            .unwrap();
        worker.enqueue("both", || Ok(dummy_asset("both")));
        worker.wait_for_all_loads();

        let cached = cache.get("both").expect("still cached");
        assert!(Arc::ptr_eq(&sync, &cached));
    }
}
