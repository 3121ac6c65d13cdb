use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use bytes::Bytes;
use pretty_assertions::assert_eq;
use steeple_store::{
    Image, ImageFormat, ImageStore, ImageTransport, SniffingDecoder, StoreSettings, TransportError,
};
use tempfile::TempDir;
use tokio::sync::{oneshot, Semaphore};
use url::Url;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(steeple_logging::initialize_for_tests);
}

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfakepixels";

/// Serves one canned response for every URL and counts requests.
struct StaticTransport {
    response: Result<Bytes, TransportError>,
    hits: AtomicUsize,
}

impl StaticTransport {
    fn ok(bytes: &'static [u8]) -> Self {
        Self {
            response: Ok(Bytes::from_static(bytes)),
            hits: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            response: Err(TransportError::HttpStatus(404)),
            hits: AtomicUsize::new(0),
        }
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ImageTransport for StaticTransport {
    async fn download(&self, _url: &Url) -> Result<Bytes, TransportError> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

/// Blocks every download on a semaphore so tests control completion order,
/// recording start order and peak concurrency.
struct GatedTransport {
    started: Mutex<Vec<String>>,
    running: AtomicUsize,
    peak: AtomicUsize,
    gate: Semaphore,
}

impl GatedTransport {
    fn new() -> Self {
        Self {
            started: Mutex::new(Vec::new()),
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            gate: Semaphore::new(0),
        }
    }

    fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    fn release(&self, count: usize) {
        self.gate.add_permits(count);
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ImageTransport for GatedTransport {
    async fn download(&self, url: &Url) -> Result<Bytes, TransportError> {
        self.started.lock().unwrap().push(url.to_string());
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);

        let permit = self.gate.acquire().await.expect("gate closed");
        permit.forget();

        self.running.fetch_sub(1, Ordering::SeqCst);
        Ok(Bytes::from_static(PNG_BYTES))
    }
}

fn store_with(
    temp: &TempDir,
    settings: StoreSettings,
    transport: Arc<dyn ImageTransport>,
) -> ImageStore {
    ImageStore::new(
        temp.path().join("imagecache"),
        settings,
        transport,
        Arc::new(SniffingDecoder),
    )
    .expect("store construction")
}

fn fetch(store: &ImageStore, url: &str) -> (bool, oneshot::Receiver<Option<Image>>) {
    let (tx, rx) = oneshot::channel();
    let resolved = store.fetch(url, move |image| {
        let _ = tx.send(image);
    });
    (resolved, rx)
}

async fn wait_for<F: Fn() -> bool>(condition: F) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

#[tokio::test(flavor = "multi_thread")]
async fn downloaded_image_is_persisted_and_served_from_cache() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(StaticTransport::ok(PNG_BYTES));
    let store = store_with(&temp, StoreSettings::default(), transport.clone());

    let url = "https://img.example.org/photos/revival.png";
    let (resolved, rx) = fetch(&store, url);
    assert!(!resolved);
    let image = rx.await.unwrap().expect("image should decode");
    assert_eq!(image.format, ImageFormat::Png);
    assert_eq!(transport.hits(), 1);

    // Second fetch resolves from disk without another request.
    let (resolved, rx) = fetch(&store, url);
    assert!(resolved);
    assert!(rx.await.unwrap().is_some());
    assert_eq!(transport.hits(), 1);

    assert!(store.cached_image(url).is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_requests_for_one_url_share_a_single_download() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(GatedTransport::new());
    let store = store_with(&temp, StoreSettings::default(), transport.clone());

    let url = "https://img.example.org/photos/choir.png";
    let (first_resolved, first_rx) = fetch(&store, url);
    wait_for(|| transport.started().len() == 1).await;
    let (second_resolved, second_rx) = fetch(&store, url);

    assert!(!first_resolved);
    assert!(!second_resolved);

    transport.release(1);
    assert!(first_rx.await.unwrap().is_some());
    assert!(second_rx.await.unwrap().is_some());
    assert_eq!(transport.started().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_fetch_is_negatively_cached_until_the_cooldown_elapses() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(StaticTransport::failing());
    let settings = StoreSettings {
        refetch_cooldown: Duration::from_millis(200),
        ..StoreSettings::default()
    };
    let store = store_with(&temp, settings, transport.clone());

    let url = "https://img.example.org/photos/missing.png";
    let (resolved, rx) = fetch(&store, url);
    assert!(!resolved);
    assert!(rx.await.unwrap().is_none());
    assert_eq!(transport.hits(), 1);

    // Inside the cooldown: resolved immediately, no network call.
    let (resolved, rx) = fetch(&store, url);
    assert!(resolved);
    assert!(rx.await.unwrap().is_none());
    assert_eq!(transport.hits(), 1);

    tokio::time::sleep(Duration::from_millis(250)).await;

    // Cooldown over: a fresh attempt goes out.
    let (resolved, rx) = fetch(&store, url);
    assert!(!resolved);
    assert!(rx.await.unwrap().is_none());
    assert_eq!(transport.hits(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn downloads_are_throttled_and_started_in_fifo_order() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(GatedTransport::new());
    let settings = StoreSettings {
        max_simultaneous_downloads: 2,
        ..StoreSettings::default()
    };
    let store = store_with(&temp, settings, transport.clone());

    let urls: Vec<String> = (1..=4)
        .map(|n| format!("https://img.example.org/photos/{n}.png"))
        .collect();
    let receivers: Vec<_> = urls.iter().map(|url| fetch(&store, url).1).collect();

    // Only the first two may run; the rest wait for capacity.
    wait_for(|| transport.started().len() == 2).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(transport.started(), urls[..2].to_vec());

    transport.release(4);
    for rx in receivers {
        assert!(rx.await.unwrap().is_some());
    }

    assert_eq!(transport.started(), urls);
    assert!(transport.peak() <= 2, "peak was {}", transport.peak());
}

#[tokio::test(flavor = "multi_thread")]
async fn undecodable_bytes_complete_with_no_image_and_are_negatively_cached() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(StaticTransport::ok(b"<html>not an image</html>"));
    let store = store_with(&temp, StoreSettings::default(), transport.clone());

    let url = "https://img.example.org/photos/broken.png";
    let (_, rx) = fetch(&store, url);
    assert!(rx.await.unwrap().is_none());
    assert!(store.cached_image(url).is_none());

    let (resolved, rx) = fetch(&store, url);
    assert!(resolved);
    assert!(rx.await.unwrap().is_none());
    assert_eq!(transport.hits(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn unparsable_url_completes_immediately_with_no_image() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(StaticTransport::ok(PNG_BYTES));
    let store = store_with(&temp, StoreSettings::default(), transport.clone());

    let (resolved, rx) = fetch(&store, "not a url at all");
    assert!(resolved);
    assert!(rx.await.unwrap().is_none());
    assert_eq!(transport.hits(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn clear_cache_deletes_files_but_keeps_the_directory() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(StaticTransport::ok(PNG_BYTES));
    let store = store_with(&temp, StoreSettings::default(), transport.clone());

    let url = "https://img.example.org/photos/revival.png";
    let (_, rx) = fetch(&store, url);
    assert!(rx.await.unwrap().is_some());
    assert!(store.cached_image(url).is_some());

    store.clear_cache().unwrap();
    assert!(store.cached_image(url).is_none());
    assert!(temp.path().join("imagecache").is_dir());

    // A refetch repopulates the cache.
    let (resolved, rx) = fetch(&store, url);
    assert!(!resolved);
    assert!(rx.await.unwrap().is_some());
    assert_eq!(transport.hits(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn prefetch_warms_the_cache_without_a_callback() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let transport = Arc::new(StaticTransport::ok(PNG_BYTES));
    let store = store_with(&temp, StoreSettings::default(), transport.clone());

    let url = "https://img.example.org/photos/banner.png";
    assert!(!store.prefetch(url));
    wait_for(|| store.cached_image(url).is_some()).await;
    assert_eq!(transport.hits(), 1);
}
