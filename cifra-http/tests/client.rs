use cifra_http::{Auth, HttpClient, HttpError, RequestOpts};
use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use std::borrow::Cow;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpClient {
    HttpClient::new(&format!("{}/", server.uri()))
        .unwrap()
        .with_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn get_text_returns_body_and_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oasis/wonderwall/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<pre>Em7 G</pre>"))
        .expect(1)
        .mount(&server)
        .await;

    let body = client(&server)
        .get_text("oasis/wonderwall/", RequestOpts::default())
        .await
        .unwrap();
    assert_eq!(body, "<pre>Em7 G</pre>");

    // The `header` matcher splits values on commas, which the browser UA contains.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let ua = requests[0].headers.get("user-agent").unwrap().to_str().unwrap();
    assert_eq!(ua, cifra_http::DEFAULT_USER_AGENT);
}

#[tokio::test]
async fn retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let body = client(&server)
        .get_text("flaky", RequestOpts::default())
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn not_found_is_an_api_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .get_text("missing", RequestOpts::default())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
    assert!(matches!(err, HttpError::Api { ref message, .. } if message == "nope"));
}

#[derive(Debug, Deserialize)]
struct Payload {
    results: Vec<String>,
}

#[tokio::test]
async fn get_json_with_header_auth_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/res/v1/web/search"))
        .and(query_param("q", "wonderwall"))
        .and(header("x-subscription-token", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"results":["a","b"]}"#))
        .mount(&server)
        .await;

    let opts = RequestOpts {
        auth: Some(Auth::Header {
            name: HeaderName::from_static("x-subscription-token"),
            value: HeaderValue::from_static("abc"),
        }),
        query: Some(vec![("q", Cow::Borrowed("wonderwall"))]),
        ..Default::default()
    };
    let payload: Payload = client(&server)
        .get_json("res/v1/web/search", opts)
        .await
        .unwrap();
    assert_eq!(payload.results, vec!["a", "b"]);
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_json::<Payload>("x", RequestOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::Decode(_, ref snip) if snip == "<html>"));
}

#[tokio::test]
async fn absolute_urls_ignore_the_base() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200).set_body_string("there"))
        .mount(&server)
        .await;

    let other = HttpClient::new("https://unreachable.invalid/").unwrap();
    let body = other
        .get_text(&format!("{}/elsewhere", server.uri()), RequestOpts::absolute())
        .await
        .unwrap();
    assert_eq!(body, "there");
}
