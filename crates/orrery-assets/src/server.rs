//! Worker pool that decodes asset files off the main thread.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use crate::error::AssetLoadError;
use crate::mesh::MeshData;
use crate::model::load_obj;
use crate::texture::{TextureData, load_texture};

/// What a request should decode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Texture,
    Model,
}

/// A file to decode, tagged with the id its result should be filed under.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub id: u64,
    pub path: PathBuf,
    pub kind: AssetKind,
}

#[derive(Debug)]
pub enum LoadedAsset {
    Texture(TextureData),
    Model(MeshData),
}

#[derive(Debug)]
pub struct LoadResult {
    pub id: u64,
    pub path: PathBuf,
    pub asset: Result<LoadedAsset, AssetLoadError>,
}

/// Decodes [`LoadRequest`]s on worker threads.
///
/// Results are collected on the main thread with
/// [`drain_results`](Self::drain_results); nothing here ever blocks the
/// caller.
pub struct AssetServer {
    task_sender: Option<crossbeam_channel::Sender<LoadRequest>>,
    result_receiver: crossbeam_channel::Receiver<LoadResult>,
    worker_handles: Vec<JoinHandle<()>>,
    in_flight: Arc<AtomicUsize>,
}

impl AssetServer {
    /// Spawn `worker_count` decoder threads with room for `queue_capacity`
    /// queued requests.
    pub fn new(worker_count: usize, queue_capacity: usize) -> Self {
        let (task_tx, task_rx) = crossbeam_channel::bounded::<LoadRequest>(queue_capacity.max(1));
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let rx = task_rx.clone();
            let tx = result_tx.clone();
            let flight = Arc::clone(&in_flight);

            let spawned = std::thread::Builder::new()
                .name(format!("asset-worker-{index}"))
                .spawn(move || {
                    while let Ok(request) = rx.recv() {
                        let asset = match request.kind {
                            AssetKind::Texture => load_texture(&request.path).map(LoadedAsset::Texture),
                            AssetKind::Model => load_obj(&request.path).map(LoadedAsset::Model),
                        };
                        flight.fetch_sub(1, Ordering::Relaxed);
                        let _ = tx.send(LoadResult {
                            id: request.id,
                            path: request.path,
                            asset,
                        });
                    }
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => log::error!("Failed to spawn asset worker {index}: {e}"),
            }
        }

        // Without workers nothing would ever drain the queue.
        let task_sender = if handles.is_empty() {
            None
        } else {
            Some(task_tx)
        };

        Self {
            task_sender,
            result_receiver: result_rx,
            worker_handles: handles,
            in_flight,
        }
    }

    /// Queue a request. Fails if the queue is full or the pool is shut down.
    pub fn submit(&self, request: LoadRequest) -> Result<(), AssetLoadError> {
        let sender = self
            .task_sender
            .as_ref()
            .ok_or(AssetLoadError::WorkerUnavailable)?;
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        if sender.try_send(request).is_err() {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            return Err(AssetLoadError::WorkerUnavailable);
        }
        Ok(())
    }

    /// Drain all completed results. Called once per frame on the main thread.
    pub fn drain_results(&self) -> Vec<LoadResult> {
        self.result_receiver.try_iter().collect()
    }

    /// Requests queued or being decoded.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn worker_count(&self) -> usize {
        self.worker_handles.len()
    }

    /// Stop accepting work and join the workers once the queue drains.
    pub fn shutdown(&mut self) {
        self.task_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for AssetServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(server: &AssetServer, count: usize) -> Vec<LoadResult> {
        let mut received = Vec::new();
        let start = Instant::now();
        while received.len() < count {
            received.extend(server.drain_results());
            assert!(start.elapsed() < Duration::from_secs(5), "timed out");
            std::thread::sleep(Duration::from_millis(1));
        }
        received
    }

    #[test]
    fn test_texture_request_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        image::RgbaImage::new(2, 2).save(&path).unwrap();

        let server = AssetServer::new(2, 8);
        server
            .submit(LoadRequest {
                id: 7,
                path,
                kind: AssetKind::Texture,
            })
            .unwrap();

        let results = wait_for(&server, 1);
        assert_eq!(results[0].id, 7);
        assert!(matches!(results[0].asset, Ok(LoadedAsset::Texture(_))));
        assert_eq!(server.in_flight_count(), 0);
    }

    #[test]
    fn test_failure_is_reported_not_dropped() {
        let server = AssetServer::new(1, 8);
        server
            .submit(LoadRequest {
                id: 1,
                path: PathBuf::from("/definitely/not/here.obj"),
                kind: AssetKind::Model,
            })
            .unwrap();
        let results = wait_for(&server, 1);
        assert!(matches!(results[0].asset, Err(AssetLoadError::Io { .. })));
    }

    #[test]
    fn test_many_requests_all_arrive() {
        let server = AssetServer::new(3, 16);
        for id in 0..10 {
            server
                .submit(LoadRequest {
                    id,
                    path: PathBuf::from(format!("/missing/{id}.png")),
                    kind: AssetKind::Texture,
                })
                .unwrap();
        }
        let mut ids: Vec<u64> = wait_for(&server, 10).iter().map(|r| r.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_submit_after_shutdown_fails() {
        let mut server = AssetServer::new(1, 4);
        server.shutdown();
        let err = server
            .submit(LoadRequest {
                id: 0,
                path: PathBuf::from("x.png"),
                kind: AssetKind::Texture,
            })
            .unwrap_err();
        assert!(matches!(err, AssetLoadError::WorkerUnavailable));
    }

    #[test]
    fn test_zero_workers_rejects_work() {
        let server = AssetServer::new(0, 4);
        assert_eq!(server.worker_count(), 0);
        assert!(
            server
                .submit(LoadRequest {
                    id: 0,
                    path: PathBuf::from("x.png"),
                    kind: AssetKind::Texture,
                })
                .is_err()
        );
    }
}
