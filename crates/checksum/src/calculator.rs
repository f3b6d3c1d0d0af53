//! Content checksums over files and directory trees.
//!
//! Regular files are discovered with `walkdir` and pushed onto a bounded
//! work channel. A fixed pool of worker threads hashes each file and posts
//! the result back. Once every result has arrived they are sorted by path
//! and the per-file digests are folded into one SHA-256.

use crate::{Error, Result};
use crossbeam_channel::{bounded, unbounded};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::thread;
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Work items queued per worker before discovery blocks.
const QUEUE_DEPTH_PER_WORKER: usize = 4;

/// Digest of a single file as reported by a worker.
#[derive(Debug)]
struct FileDigest {
    path: PathBuf,
    digest: Result<Vec<u8>>,
}

/// Computes a single checksum over many paths.
#[derive(Debug, Clone, Copy)]
pub struct ChecksumCalculator {
    workers: usize,
}

impl Default for ChecksumCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChecksumCalculator {
    /// Create a calculator with one worker per available CPU.
    #[must_use]
    pub fn new() -> Self {
        let workers = thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1);
        Self { workers }
    }

    /// Create a calculator with a fixed number of workers (at least one).
    #[must_use]
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Number of worker threads used per call.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Hex SHA-256 over `paths`.
    ///
    /// A single regular file hashes to the digest of its content. Anything
    /// else hashes every regular file beneath the given paths and folds the
    /// per-file digests in path order.
    pub fn sum<P: AsRef<Path>>(&self, paths: &[P]) -> Result<String> {
        if let [single] = paths {
            let single = single.as_ref();
            if single.is_file() {
                return hash_file(single).map(hex::encode);
            }
        }

        let mut results = self.hash_all(paths)?;
        results.sort_by(|a, b| a.path.cmp(&b.path));

        let mut folded = Sha256::new();
        for result in results {
            let digest = result.digest?;
            folded.update(&digest);
        }
        Ok(hex::encode(folded.finalize()))
    }

    fn hash_all<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<FileDigest>> {
        let (work_tx, work_rx) = bounded::<PathBuf>(self.workers * QUEUE_DEPTH_PER_WORKER);
        let (result_tx, result_rx) = unbounded::<FileDigest>();

        thread::scope(|scope| {
            for _ in 0..self.workers {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for path in work_rx {
                        trace!(?path, "Hashing file");
                        let digest = hash_file(&path);
                        if result_tx.send(FileDigest { path, digest }).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);

            let discovered = discover(paths, |file| {
                work_tx
                    .send(file)
                    .map_err(|_| Error::worker("all workers exited early"))
            });
            drop(work_tx);
            let expected = discovered?;

            let results: Vec<FileDigest> = result_rx.iter().take(expected).collect();
            if results.len() != expected {
                return Err(Error::worker(format!(
                    "expected {expected} results, received {}",
                    results.len()
                )));
            }
            debug!(files = expected, workers = self.workers, "Hashed files");
            Ok(results)
        })
    }
}

/// Walk `paths`, handing every regular file to `emit`. Returns the count.
fn discover<P: AsRef<Path>>(
    paths: &[P],
    mut emit: impl FnMut(PathBuf) -> Result<()>,
) -> Result<usize> {
    let mut count = 0;
    for root in paths {
        let root = root.as_ref();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                Error::io(e.into(), path, "walk")
            })?;
            if entry.file_type().is_file() {
                emit(entry.into_path())?;
                count += 1;
            }
        }
    }
    Ok(count)
}

fn hash_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|e| Error::io(e, path, "open"))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| Error::io(e, path, "read"))?;
    Ok(hasher.finalize().to_vec())
}
