use crate::{
    error::{Error, Result},
    file::{ContentRecord, PathEntry, EMPTY_DIRECTORY_MARKER},
};
use std::path::Path;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, trace, warn};

/// Default number of paths loaded at the same time.
pub const DEFAULT_MAX_CONCURRENCY: usize = 100;

/// Reads the contents of discovered paths with bounded concurrency.
///
/// Every path gets its own task; a semaphore caps how many of them touch
/// the filesystem at once. Results are sent back to the caller, which is
/// the only writer of the resulting [`ContentRecord`].
#[derive(Debug, Clone)]
pub struct ContentLoader {
    max_concurrency: usize,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl ContentLoader {
    /// Creates a loader running at most `max_concurrency` reads at once.
    ///
    /// A limit of `0` is raised to `1`; limits above what a semaphore can
    /// hold are lowered to that maximum.
    #[must_use]
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.clamp(1, Semaphore::MAX_PERMITS),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The concurrency limit in effect.
    #[must_use]
    pub const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Highest number of simultaneously active reads seen so far.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Loads the content of every entry.
    ///
    /// Regular files are read in full; bytes that are not valid UTF-8 are
    /// replaced. A directory gets [`EMPTY_DIRECTORY_MARKER`] when it has no
    /// entries and nothing otherwise. Other file types are ignored.
    ///
    /// All tasks run to completion before this returns, even after a
    /// failure.
    ///
    /// # Errors
    ///
    /// If any task fails, returns the [`Error::Io`] whose relative path
    /// sorts first. No partial record is returned.
    pub async fn load(&self, entries: &[PathEntry]) -> Result<ContentRecord> {
        debug!(
            "Loading {} paths with concurrency limit {}",
            entries.len(),
            self.max_concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for entry in entries {
            let semaphore = Arc::clone(&semaphore);
            let in_flight = Arc::clone(&self.in_flight);
            let peak = Arc::clone(&self.peak_in_flight);
            let key = entry.relative_path.clone();
            let path = entry.absolute_path.clone();

            tasks.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        let active = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(active, Ordering::SeqCst);
                        let outcome = load_one(&path).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        outcome
                    }
                    Err(_) => Err(Error::io(
                        &path,
                        std::io::Error::other("loader semaphore closed"),
                    )),
                };
                (key, outcome)
            });
        }

        let mut record = ContentRecord::new();
        let mut errors: Vec<(String, Error)> = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            let (key, outcome) = match joined {
                Ok(result) => result,
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => {
                    warn!("Load task cancelled: {}", e);
                    continue;
                }
            };

            match outcome {
                Ok(Some(content)) => {
                    trace!("Loaded {}", key);
                    record.insert(key, content);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Failed to load {}: {}", key, e);
                    errors.push((key, e));
                }
            }
        }

        if let Some((key, err)) = errors.into_iter().min_by(|a, b| a.0.cmp(&b.0)) {
            debug!("Reporting load failure for {}", key);
            return Err(err);
        }

        debug!("Loaded {} content entries", record.len());
        Ok(record)
    }
}

impl Default for ContentLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENCY)
    }
}

/// Loads `entries` with at most `max_concurrency` reads in flight.
///
/// # Errors
///
/// See [`ContentLoader::load`].
pub async fn load_contents(entries: &[PathEntry], max_concurrency: usize) -> Result<ContentRecord> {
    ContentLoader::new(max_concurrency).load(entries).await
}

async fn load_one(path: &Path) -> Result<Option<String>> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| Error::io(path, e))?;

    if metadata.is_file() {
        let bytes = tokio::fs::read(path).await.map_err(|e| Error::io(path, e))?;
        let content = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        return Ok(Some(content));
    }

    if metadata.is_dir() {
        let mut dir = tokio::fs::read_dir(path)
            .await
            .map_err(|e| Error::io(path, e))?;
        let first = dir.next_entry().await.map_err(|e| Error::io(path, e))?;
        return Ok(first.is_none().then(|| EMPTY_DIRECTORY_MARKER.to_string()));
    }

    Ok(None)
}
