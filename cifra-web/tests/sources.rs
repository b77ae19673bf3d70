use cifra_common::CifraError;
use cifra_extract::{CleanOptions, extract};
use cifra_web::{
    DirectFetch, DuckDuckGoHtml, MarkupSource, SearchChain, SearchResolved, SongRequest,
};
use std::time::Duration;
use url::Url;

mod common;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<html><body>
<h1 class="t1">Tempo Perdido</h1>
<h2 class="t3"><a href="/legiao-urbana/">Legião Urbana</a></h2>
<span id="cifra_tom">Tom: <a>C</a></span>
<div class="cifra_cnt"><pre><b>C</b>         <b>Am</b>
Todos os dias quando acordo
e|--3--3--|
</pre></div></body></html>"#;

fn direct() -> DirectFetch {
    DirectFetch::new(Duration::from_secs(5), 0, None).unwrap()
}

#[tokio::test]
async fn direct_fetch_returns_markup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/legiao-urbana/tempo-perdido/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/legiao-urbana/tempo-perdido/", server.uri())).unwrap();
    let page = direct().acquire(&SongRequest::Url(url.clone())).await.unwrap();
    assert_eq!(page.url, url.as_str());

    let sheet = extract(&page.markup, &page.url, &CleanOptions::default())
        .into_sheet()
        .unwrap();
    assert_eq!(sheet.artist(), "Legião Urbana");
    assert_eq!(sheet.content, "C         Am\nTodos os dias quando acordo\n");
}

#[tokio::test]
async fn direct_fetch_failure_is_source_unavailable() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/x/y/", server.uri())).unwrap();
    let err = direct().acquire(&SongRequest::Url(url)).await.unwrap_err();
    assert!(err.is_source_unavailable());
}

#[tokio::test]
async fn direct_fetch_rejects_queries() {
    let err = direct()
        .acquire(&SongRequest::Query("tempo perdido".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, CifraError::Unsupported(_)));
}

#[tokio::test]
async fn search_resolved_fetches_top_candidate() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let song_url = format!("{}/legiao-urbana/tempo-perdido/", server.uri());
    Mock::given(method("GET"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<a class="result__a" href="{0}letra/">Letra</a>
               <a class="result__a" href="{0}">Tempo Perdido</a>"#,
            song_url
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/legiao-urbana/tempo-perdido/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let chain = SearchChain::new("127.0.0.1", 5)
        .with_engine(DuckDuckGoHtml::new(&format!("{}/html/", server.uri())).unwrap());
    let source = SearchResolved::new(chain, direct());

    let page = source
        .acquire(&SongRequest::Query("tempo perdido".into()))
        .await
        .unwrap();
    assert_eq!(page.url, song_url);
    assert!(page.markup.as_str().contains("Tempo Perdido"));

    let err = source.acquire_nth("tempo perdido", 3).await.unwrap_err();
    assert!(matches!(err, CifraError::Unsupported(_)));
}

#[tokio::test]
async fn search_resolved_without_candidates_reports_no_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let chain = SearchChain::new("cifraclub.com.br", 5)
        .with_engine(DuckDuckGoHtml::new(&format!("{}/html/", server.uri())).unwrap());
    let err = SearchResolved::new(chain, direct())
        .acquire(&SongRequest::Query("nothing".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, CifraError::NoResults(_)));
}
