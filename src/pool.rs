//! Bounded close-once job queue and the fixed worker pool that drives
//! per-partition clustering.
//!
//! The queue is the only structure shared between workers; every job owns
//! its partition outright, so no label mutation ever crosses a thread
//! boundary. Joining the pool is the completion barrier: once it returns,
//! every partition has been clustered.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

use geo::Rect;
use log::{debug, info};

use crate::cluster::cluster_partition;
use crate::error::Result;
use crate::outcome::{ClusterOutcome, PartitionResult};
use crate::partition::{Partition, partition_points};
use crate::types::{ClusterParams, LabelledPoint};

/// One unit of work: a partition plus its clustering parameters.
#[derive(Debug)]
pub struct Job {
    pub partition: Partition,
    pub min_pts: usize,
    pub eps: f64,
}

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Bounded, blocking, close-once multi-producer/multi-consumer queue.
///
/// `push` blocks while the queue is full; `pop` blocks until an item is
/// available or the queue has been closed and drained. Closing is
/// idempotent and wakes every waiter. There is no cancellation: a run
/// always drains to completion.
pub struct JobQueue<T> {
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> JobQueue<T> {
    /// Create a queue holding at most `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn bounded(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be greater than zero");
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    /// Enqueue an item, blocking while the queue is full.
    ///
    /// Returns `false` if the queue was closed before the item could be
    /// accepted; the item is dropped in that case.
    pub fn push(&self, item: T) -> bool {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return false;
            }
            if state.items.len() < self.capacity {
                break;
            }
            self.not_full.wait(&mut state);
        }
        state.items.push_back(item);
        self.not_empty.notify_one();
        true
    }

    /// Dequeue an item, blocking until one is available.
    ///
    /// Returns `None` once the queue is closed and drained, which is the
    /// signal for a worker to exit.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                self.not_full.notify_one();
                return Some(item);
            }
            if state.closed {
                return None;
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Close the queue: no further items will be accepted. Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fixed-size pool of clustering workers pulling from a shared [`JobQueue`].
pub struct WorkerPool {
    handles: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` threads, each repeatedly dequeuing a job, running
    /// the partition clusterer on it, and appending the result to the
    /// shared sink until the queue closes.
    pub fn spawn(
        workers: usize,
        queue: Arc<JobQueue<Job>>,
        results: Arc<Mutex<Vec<PartitionResult>>>,
    ) -> Result<Self> {
        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let queue = Arc::clone(&queue);
            let results = Arc::clone(&results);
            let handle = thread::Builder::new()
                .name(format!("gridscan-worker-{worker}"))
                .spawn(move || {
                    while let Some(mut job) = queue.pop() {
                        let cell = job.partition.cell;
                        let point_count = job.partition.len();
                        let cluster_count = cluster_partition(
                            &mut job.partition.points,
                            cell,
                            job.min_pts,
                            job.eps,
                        );
                        debug!(
                            "worker {}: cell {} -> {} clusters over {} points",
                            worker, cell, cluster_count, point_count
                        );
                        results.lock().push(PartitionResult {
                            cell,
                            cluster_count,
                            points: job.partition.points,
                        });
                    }
                })?;
            handles.push(handle);
        }
        Ok(Self { handles })
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Block until every worker has observed queue closure and exited.
    ///
    /// Propagates a worker panic to the caller.
    pub fn join(self) {
        for handle in self.handles {
            if let Err(panic) = handle.join() {
                std::panic::resume_unwind(panic);
            }
        }
    }
}

/// Cluster `points` over `bounds` with the full pipeline: validate the
/// parameters, partition into an N×N grid, distribute the partitions to a
/// fixed worker pool, and collect the per-partition results in row-major
/// cell order.
///
/// The input points are never mutated; each partition clusters its own
/// copies. Results are deterministic for a fixed input and parameters,
/// independent of worker count and scheduling, because cluster identifiers
/// derive from grid coordinates.
///
/// # Examples
///
/// ```rust
/// use geo::Point;
/// use gridscan::{ClusterParams, cluster_grid, ingest};
///
/// let coords = vec![
///     Point::new(-73.9800, 40.7500),
///     Point::new(-73.9801, 40.7501),
///     Point::new(-73.9802, 40.7500),
/// ];
/// let points = ingest::labelled_points(&coords);
/// let bounds = ingest::bounding_rect(&points).unwrap();
///
/// let params = ClusterParams::default()
///     .with_eps(0.001)
///     .with_min_pts(2)
///     .with_grid_resolution(1);
/// let outcome = cluster_grid(&points, &bounds, &params)?;
/// assert_eq!(outcome.total_clusters(), 1);
/// # Ok::<(), gridscan::GridscanError>(())
/// ```
pub fn cluster_grid(
    points: &[LabelledPoint],
    bounds: &Rect,
    params: &ClusterParams,
) -> Result<ClusterOutcome> {
    params.validate()?;

    let partitions = partition_points(points, bounds, params.grid_resolution, params.eps)?;
    let job_count = partitions.len();

    let queue = Arc::new(JobQueue::bounded(job_count));
    let results = Arc::new(Mutex::new(Vec::with_capacity(job_count)));
    let pool = WorkerPool::spawn(params.workers, Arc::clone(&queue), Arc::clone(&results))?;

    for partition in partitions {
        queue.push(Job {
            partition,
            min_pts: params.min_pts,
            eps: params.eps,
        });
    }
    queue.close();
    pool.join();

    let mut collected: Vec<PartitionResult> = results.lock().drain(..).collect();
    collected.sort_by_key(|r| r.cell);

    let outcome = ClusterOutcome::new(collected);
    info!(
        "clustered {} points into {} clusters across {} partitions ({} workers)",
        points.len(),
        outcome.total_clusters(),
        job_count,
        params.workers
    );
    Ok(outcome)
}
