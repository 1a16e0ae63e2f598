//! Background column generation.
//!
//! A single worker thread receives batches of chunk coordinates, generates
//! them in parallel with rayon and sends the column data back. The caller
//! polls for results without blocking; each batch carries the dimension
//! epoch it was submitted under so stale results can be dropped after a
//! dimension switch.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use strata_core::{ChunkPos, Result};

use crate::chunk::ColumnData;
use crate::dimension::DimensionConfig;
use crate::generation::TerrainGenerator;

/// Maximum batches waiting for the worker.
const REQUEST_QUEUE: usize = 16;
/// Maximum finished chunks waiting for the caller.
const RESULT_QUEUE: usize = 256;

/// Work request sent to the background worker thread.
#[derive(Debug)]
pub enum GenerationRequest {
    /// Generate columns for the given positions.
    Generate {
        epoch: u64,
        dimension: Arc<DimensionConfig>,
        positions: Vec<ChunkPos>,
    },
    /// Signal worker thread to shut down.
    Shutdown,
}

/// Column data produced by the worker for one chunk.
pub struct GeneratedColumns {
    pub pos: ChunkPos,
    /// Dimension epoch the request was submitted under.
    pub epoch: u64,
    pub columns: ColumnData,
}

impl std::fmt::Debug for GeneratedColumns {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedColumns")
            .field("pos", &self.pos)
            .field("epoch", &self.epoch)
            .field("columns", &"<ColumnData>")
            .finish()
    }
}

/// Handle to the background generation thread.
pub struct GenerationWorker {
    request_tx: Sender<GenerationRequest>,
    result_rx: Receiver<GeneratedColumns>,
    thread: Option<JoinHandle<()>>,
}

impl GenerationWorker {
    /// Spawn a worker thread owning a copy of the generator.
    pub fn spawn(generator: TerrainGenerator) -> Result<Self> {
        let (request_tx, request_rx) = channel::bounded::<GenerationRequest>(REQUEST_QUEUE);
        let (result_tx, result_rx) = channel::bounded::<GeneratedColumns>(RESULT_QUEUE);

        let thread = thread::Builder::new()
            .name("strata-generation".to_string())
            .spawn(move || Self::worker_loop(&generator, &request_rx, &result_tx))?;

        tracing::debug!("Spawned background generation worker");

        Ok(Self {
            request_tx,
            result_rx,
            thread: Some(thread),
        })
    }

    fn worker_loop(
        generator: &TerrainGenerator,
        request_rx: &Receiver<GenerationRequest>,
        result_tx: &Sender<GeneratedColumns>,
    ) {
        loop {
            match request_rx.recv() {
                Ok(GenerationRequest::Generate {
                    epoch,
                    dimension,
                    positions,
                }) => {
                    let generated = generator.generate_chunks_parallel(&positions, &dimension);
                    for (pos, columns) in generated {
                        // Blocks when the caller falls behind.
                        if result_tx
                            .send(GeneratedColumns {
                                pos,
                                epoch,
                                columns,
                            })
                            .is_err()
                        {
                            return;
                        }
                    }
                }
                Ok(GenerationRequest::Shutdown) | Err(_) => return,
            }
        }
    }

    /// Queue a batch without blocking. Hands the positions back when the
    /// request queue is full.
    pub fn submit(
        &self,
        epoch: u64,
        dimension: Arc<DimensionConfig>,
        positions: Vec<ChunkPos>,
    ) -> std::result::Result<(), Vec<ChunkPos>> {
        self.request_tx
            .try_send(GenerationRequest::Generate {
                epoch,
                dimension,
                positions,
            })
            .map_err(|err| match err.into_inner() {
                GenerationRequest::Generate { positions, .. } => positions,
                GenerationRequest::Shutdown => Vec::new(),
            })
    }

    /// Try to receive a finished chunk (non-blocking).
    pub fn try_recv(&self) -> Option<GeneratedColumns> {
        self.result_rx.try_recv().ok()
    }

    fn shutdown(&mut self) {
        let _ = self.request_tx.try_send(GenerationRequest::Shutdown);

        // Disconnect the result channel so a worker blocked on a full
        // result queue wakes up and exits.
        let (_, closed) = channel::bounded(0);
        drop(std::mem::replace(&mut self.result_rx, closed));

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("Background generation worker panicked");
            }
        }
    }
}

impl Drop for GenerationWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn collect(worker: &GenerationWorker, expected: usize) -> Vec<GeneratedColumns> {
        let mut results = Vec::new();
        for _ in 0..200 {
            while let Some(result) = worker.try_recv() {
                results.push(result);
            }
            if results.len() >= expected {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        results
    }

    #[test]
    fn worker_generates_submitted_chunks() {
        let generator = TerrainGenerator::with_seed(7);
        let worker = GenerationWorker::spawn(generator.clone()).unwrap();
        let dimension = Arc::new(DimensionConfig::forest());
        let positions = vec![ChunkPos::new(0, 0), ChunkPos::new(1, -1), ChunkPos::new(-3, 2)];

        worker.submit(4, Arc::clone(&dimension), positions.clone()).unwrap();
        let results = collect(&worker, positions.len());

        assert_eq!(results.len(), positions.len());
        for result in results {
            assert!(positions.contains(&result.pos));
            assert_eq!(result.epoch, 4);
            let expected = generator.generate_columns(result.pos, &dimension);
            assert_eq!(result.columns.heights.values(), expected.heights.values());
        }
    }

    #[test]
    fn drop_joins_idle_worker() {
        let worker = GenerationWorker::spawn(TerrainGenerator::with_seed(1)).unwrap();
        drop(worker);
    }

    #[test]
    fn drop_with_undrained_results() {
        let worker = GenerationWorker::spawn(TerrainGenerator::with_seed(1)).unwrap();
        let dimension = Arc::new(DimensionConfig::default());
        let positions: Vec<_> = (0..8).map(|x| ChunkPos::new(x, 0)).collect();
        worker.submit(0, dimension, positions).unwrap();
        drop(worker);
    }
}
