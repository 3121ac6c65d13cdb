use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use steeple_logging::{steeple_debug, steeple_warn};
use tempfile::NamedTempFile;
use url::Url;

use crate::cache_key;
use crate::error::{StoreError, TransportError};
use crate::sniff::{Image, ImageDecoder, SniffingDecoder};
use crate::transport::{ImageTransport, ReqwestTransport, TransportSettings};

/// Callback receiving the eventual result of a fetch: the decoded image, or
/// `None` when the URL could not be fetched or its bytes could not be
/// decoded.
pub type Completion = Box<dyn FnOnce(Option<Image>) + Send + 'static>;

/// Tuning knobs for an [`ImageStore`].
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Downloads allowed to run at once. More simultaneous downloads slow
    /// every transfer during a burst; fewer let one large image clog the
    /// queue.
    pub max_simultaneous_downloads: usize,
    /// After a failed fetch, requests for the same URL resolve to "no
    /// image" without a network call until this much time has passed.
    pub refetch_cooldown: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_simultaneous_downloads: 3,
            refetch_cooldown: Duration::from_secs(120),
        }
    }
}

/// Fetches images over HTTP and caches them on the local filesystem.
///
/// Construct one per process and share it by cloning; all queue and cache
/// bookkeeping is serialized behind a single lock.
#[derive(Clone)]
pub struct ImageStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    cache_dir: PathBuf,
    settings: StoreSettings,
    transport: Arc<dyn ImageTransport>,
    decoder: Arc<dyn ImageDecoder>,
    runtime: tokio::runtime::Handle,
    state: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    /// Cache keys of recently failed fetches, with the time of failure.
    failed: HashMap<String, Instant>,
    /// Coalesced completions per in-flight URL. Presence of a key means a
    /// download is queued or running for that URL.
    callbacks: HashMap<String, Vec<Completion>>,
    /// URLs waiting for download capacity, oldest first.
    pending: VecDeque<String>,
    active: usize,
}

impl ImageStore {
    /// Creates a store that caches under `cache_dir`, downloading through
    /// `transport` and decoding through `decoder`.
    ///
    /// Must be called from within a tokio runtime; downloads are spawned
    /// onto the runtime that was current at construction.
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        settings: StoreSettings,
        transport: Arc<dyn ImageTransport>,
        decoder: Arc<dyn ImageDecoder>,
    ) -> Result<Self, StoreError> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir).map_err(|err| StoreError::CacheDir(err.to_string()))?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| StoreError::Runtime(err.to_string()))?;

        Ok(Self {
            inner: Arc::new(StoreInner {
                cache_dir,
                settings,
                transport,
                decoder,
                runtime,
                state: Mutex::new(StoreState::default()),
            }),
        })
    }

    /// Creates a store with the reqwest transport and the sniffing decoder.
    pub fn with_defaults(cache_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let transport = ReqwestTransport::new(TransportSettings::default())?;
        Self::new(
            cache_dir,
            StoreSettings::default(),
            Arc::new(transport),
            Arc::new(SniffingDecoder),
        )
    }

    /// Fetches the image at `url`, delivering it through `completion`.
    ///
    /// A previously cached image completes without network access, as does
    /// a URL still inside the failure cooldown (with "no image"). Repeated
    /// requests for a URL already being downloaded are coalesced onto the
    /// in-flight download. Otherwise the download is queued, starting
    /// immediately if fewer than `max_simultaneous_downloads` are running.
    ///
    /// Returns `true` when the request resolved without a network fetch; it
    /// says nothing about whether an image was available.
    pub fn fetch(&self, url: &str, completion: impl FnOnce(Option<Image>) + Send + 'static) -> bool {
        self.fetch_inner(url, Some(Box::new(completion)))
    }

    /// Like [`fetch`](Self::fetch) but with no interest in the result;
    /// useful for warming the cache ahead of display.
    pub fn prefetch(&self, url: &str) -> bool {
        self.fetch_inner(url, None)
    }

    fn fetch_inner(&self, url: &str, completion: Option<Completion>) -> bool {
        if Url::parse(url).is_err() {
            if let Some(completion) = completion {
                completion(None);
            }
            return true;
        }

        if let Some(image) = self.cached_image(url) {
            if let Some(completion) = completion {
                completion(Some(image));
            }
            return true;
        }

        let key = cache_key::sanitize(url);
        let mut state = self.inner.state();

        // Negative cache: answer "no image" without a network call until
        // the cooldown has elapsed, then forget the failure and retry.
        if let Some(failed_at) = state.failed.get(&key) {
            if failed_at.elapsed() < self.inner.settings.refetch_cooldown {
                drop(state);
                if let Some(completion) = completion {
                    completion(None);
                }
                return true;
            }
            state.failed.remove(&key);
        }

        if let Some(existing) = state.callbacks.get_mut(url) {
            if let Some(completion) = completion {
                existing.push(completion);
            }
            return false;
        }

        state
            .callbacks
            .insert(url.to_string(), completion.into_iter().collect());
        state.pending.push_back(url.to_string());
        self.inner.dequeue_locked(&mut state);
        false
    }

    /// Returns the cached image for `url`, or `None` if nothing is cached
    /// or the cached bytes no longer decode. Never touches the network.
    pub fn cached_image(&self, url: &str) -> Option<Image> {
        let path = self.inner.cache_path(url);
        let bytes = fs::read(path).ok()?;
        self.inner.decoder.decode(&bytes)
    }

    /// Deletes every cached file. In-flight downloads and the negative
    /// cache are left untouched.
    pub fn clear_cache(&self) -> Result<(), StoreError> {
        fs::remove_dir_all(&self.inner.cache_dir)?;
        fs::create_dir_all(&self.inner.cache_dir)?;
        Ok(())
    }
}

impl StoreInner {
    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("image store state poisoned")
    }

    fn cache_path(&self, url: &str) -> PathBuf {
        self.cache_dir.join(cache_key::sanitize(url))
    }

    /// Starts at most one pending download if a slot is free. Callers hold
    /// the state lock, which keeps `active` within the configured bound.
    fn dequeue_locked(self: &Arc<Self>, state: &mut StoreState) {
        if state.active < self.settings.max_simultaneous_downloads {
            if let Some(url) = state.pending.pop_front() {
                state.active += 1;
                let inner = Arc::clone(self);
                self.runtime.spawn(run_download(inner, url));
            }
        }
    }
}

async fn run_download(inner: Arc<StoreInner>, url: String) {
    let key = cache_key::sanitize(&url);
    let path = inner.cache_dir.join(&key);

    let image = match download_and_persist(&inner, &url, &path).await {
        Ok(image) => {
            steeple_debug!("cached image for {url} at {path:?}");
            Some(image)
        }
        Err(err) => {
            steeple_warn!("image fetch for {url} failed: {err}");
            None
        }
    };

    let completions = {
        let mut state = inner.state();
        if image.is_some() {
            state.failed.remove(&key);
        } else {
            state.failed.insert(key, Instant::now());
        }
        state.active -= 1;
        let completions = state.callbacks.remove(&url).unwrap_or_default();
        inner.dequeue_locked(&mut state);
        completions
    };

    for completion in completions {
        completion(image.clone());
    }
}

#[derive(Debug, thiserror::Error)]
enum FetchFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("downloaded bytes are not a decodable image")]
    Undecodable,
}

async fn download_and_persist(
    inner: &StoreInner,
    url: &str,
    path: &Path,
) -> Result<Image, FetchFailure> {
    let parsed = Url::parse(url).map_err(|err| TransportError::InvalidUrl(err.to_string()))?;
    let bytes = inner.transport.download(&parsed).await?;
    persist_bytes(path, &bytes)?;
    inner.decoder.decode(&bytes).ok_or(FetchFailure::Undecodable)
}

/// Writes bytes to a temp file in the cache directory, then renames over
/// the target so a stale file is replaced in one step.
fn persist_bytes(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    let dir = path
        .parent()
        .ok_or_else(|| std::io::Error::other("cache path has no parent directory"))?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;

    if path.exists() {
        fs::remove_file(path)?;
    }
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
