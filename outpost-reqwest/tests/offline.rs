//! A worker over the real network stack keeps serving after the site goes down.

use outpost::{Interception, NoopHost, RequestDescriptor, ResponseSource, Worker, WorkerConfig};
use outpost_moka::MokaStore;
use outpost_reqwest::ReqwestFetcher;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(server: &MockServer, p: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(p))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn installed_site_survives_going_offline() {
    let server = MockServer::start().await;
    serve(&server, "/", "<html>home</html>").await;
    serve(&server, "/offline.html", "<html>offline</html>").await;
    serve(&server, "/style.css", "body {}").await;
    let origin = Url::parse(&server.uri()).unwrap();

    let config = WorkerConfig::builder("novashop", "v4", origin.clone())
        .precache(["/", "/offline.html", "/style.css"])
        .build()
        .unwrap();
    let fetcher = ReqwestFetcher::new(reqwest::Client::new(), origin.clone());
    let store = MokaStore::builder().max_entries(32).build();
    let worker = Worker::new(config, store, fetcher, NoopHost).unwrap();

    worker.install().await.unwrap();
    worker.activate().await.unwrap();
    drop(server);

    let Interception::Respond(Ok(page)) = worker
        .fetch(&RequestDescriptor::navigate(origin.join("/products").unwrap()))
        .await
    else {
        panic!("navigation should be answered from the fallback chain");
    };
    assert_eq!(
        page.source,
        ResponseSource::Fallback {
            url: origin.join("/").unwrap()
        }
    );
    assert_eq!(page.response.body().as_ref(), b"<html>home</html>");
}
