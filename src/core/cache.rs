use crate::core::error::{LoadError, Result};
use crate::core::repository::ContractRepository;
use log::{debug, error};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Slot = Arc<Mutex<Option<Arc<ContractRepository>>>>;

/// Result of [`RepositoryCache::load_or_empty`].
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub repository: Arc<ContractRepository>,
    /// Why the repository is empty, when the load failed.
    pub error: Option<Arc<LoadError>>,
}

/// Parsed repositories keyed by source path.
///
/// Each path is parsed at most once for the lifetime of the cache; entries
/// are never invalidated. Every path owns its own slot lock, so two callers
/// asking for the same path wait on a single parse while other paths load
/// independently. Failed loads release their slot and are retried on the
/// next request.
///
/// # Examples
///
/// ```no_run
/// use debt_portfolio::core::cache::RepositoryCache;
///
/// let cache = RepositoryCache::new();
/// let first = cache.load("dados.json").unwrap();
/// let second = cache.load("dados.json").unwrap();
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.parse_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RepositoryCache {
    slots: Mutex<HashMap<PathBuf, Slot>>,
    parses: AtomicUsize,
}

impl RepositoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached repository for `path`, reading and parsing the
    /// file on a miss.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<ContractRepository>> {
        let path = path.as_ref();
        let slot = self.slot_for(path);
        let mut entry = lock(&slot);

        if let Some(repo) = entry.as_ref() {
            debug!("cache hit for {}", path.display());
            return Ok(Arc::clone(repo));
        }

        debug!("cache miss for {}, parsing", path.display());
        self.parses.fetch_add(1, Ordering::SeqCst);
        match parse_file(path) {
            Ok(repo) => {
                let repo = Arc::new(repo);
                *entry = Some(Arc::clone(&repo));
                Ok(repo)
            }
            Err(e) => {
                drop(entry);
                self.release_slot(path, slot);
                Err(e)
            }
        }
    }

    /// Like [`load`](Self::load), but a failure yields an empty repository
    /// alongside the classified error.
    pub fn load_or_empty(&self, path: impl AsRef<Path>) -> LoadOutcome {
        match self.load(path.as_ref()) {
            Ok(repository) => LoadOutcome {
                repository,
                error: None,
            },
            Err(e) => {
                error!("{}", e);
                LoadOutcome {
                    repository: Arc::new(ContractRepository::empty()),
                    error: Some(Arc::new(e)),
                }
            }
        }
    }

    /// Whether a parsed repository is cached for `path`.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        let slots = lock(&self.slots);
        slots
            .get(path.as_ref())
            .map(|slot| lock(slot).is_some())
            .unwrap_or(false)
    }

    /// Number of parse attempts made so far, successful or not.
    pub fn parse_count(&self) -> usize {
        self.parses.load(Ordering::SeqCst)
    }

    fn slot_for(&self, path: &Path) -> Slot {
        let mut slots = lock(&self.slots);
        Arc::clone(slots.entry(path.to_path_buf()).or_default())
    }

    /// Drop the empty slot left by a failed parse. A slot another caller
    /// still holds stays, so that caller retries in the same slot.
    fn release_slot(&self, path: &Path, slot: Slot) {
        let mut slots = lock(&self.slots);
        let unshared = slots
            .get(path)
            .map(|existing| Arc::ptr_eq(existing, &slot) && Arc::strong_count(&slot) == 2)
            .unwrap_or(false);
        if unshared {
            slots.remove(path);
        }
    }
}

fn parse_file(path: &Path) -> Result<ContractRepository> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    ContractRepository::from_json_str(&content)
}

/// Slots are written only after a successful parse, so a poisoned lock
/// still guards consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
