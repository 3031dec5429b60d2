#![allow(dead_code)]

pub mod mock_fetcher;
pub mod mock_host;

pub use mock_fetcher::MockFetcher;
pub use mock_host::MockHost;

use std::sync::Arc;

use http::StatusCode;
use outpost::{Worker, WorkerConfig};
use outpost_moka::MokaStore;
use url::Url;

pub const ORIGIN: &str = "https://shop.example";

pub fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

pub const ASSETS: &[&str] = &["/", "/offline.html", "/style.css", "/app.js"];

pub fn config(version: &str) -> WorkerConfig {
    WorkerConfig::builder("novashop", version, Url::parse(ORIGIN).unwrap())
        .precache(ASSETS.iter().copied())
        .build()
        .unwrap()
}

/// Fetcher answering every critical asset with `200`.
pub fn storefront() -> MockFetcher {
    let fetcher = MockFetcher::new();
    fetcher.respond(&url("/"), StatusCode::OK, "<html>home</html>");
    fetcher.respond(&url("/offline.html"), StatusCode::OK, "<html>offline</html>");
    fetcher.respond(&url("/style.css"), StatusCode::OK, "body { color: red }");
    fetcher.respond(&url("/app.js"), StatusCode::OK, "console.log('v1')");
    fetcher
}

pub fn store() -> MokaStore {
    MokaStore::builder().max_entries(64).build()
}

pub type TestWorker = Worker<MokaStore, MockFetcher, Arc<MockHost>>;

pub fn worker(config: WorkerConfig, store: MokaStore, fetcher: MockFetcher) -> (TestWorker, Arc<MockHost>) {
    let host = Arc::new(MockHost::default());
    let worker = Worker::new(config, store, fetcher, host.clone()).unwrap();
    (worker, host)
}

/// Installed and activated worker for `version` over `fetcher`.
pub async fn active_worker(version: &str, fetcher: MockFetcher) -> (TestWorker, Arc<MockHost>) {
    active_worker_with(config(version), fetcher).await
}

pub async fn active_worker_with(
    config: WorkerConfig,
    fetcher: MockFetcher,
) -> (TestWorker, Arc<MockHost>) {
    let (worker, host) = worker(config, store(), fetcher);
    worker.install().await.unwrap();
    worker.activate().await.unwrap();
    (worker, host)
}
