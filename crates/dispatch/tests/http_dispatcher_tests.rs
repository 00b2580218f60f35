// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for `HttpDispatcher`
//!
//! These tests use wiremock to stand in for the visual recognition service and
//! check how descriptors are put on the wire.

use std::{
    io::{self, Cursor, Read},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use dispatch::{
    DispatchError, Dispatcher, HttpDispatcher, ServiceConfig, TimeoutSeconds,
    VERSION_DATE_2016_05_20,
};
use request_types::{
    ByteSource, EncodedField, HttpMethod, MemorySource, MultipartField, RequestDescriptor,
    StreamHandle,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path, query_param},
};

const TEST_API_KEY: &str = "test-api-key";

/// Create a test `ServiceConfig` pointing at the mock server
fn create_test_config(base_url: &str) -> ServiceConfig {
    ServiceConfig::new(VERSION_DATE_2016_05_20)
        .unwrap()
        .with_base_url(base_url)
        .unwrap()
        .with_api_key(TEST_API_KEY)
        .with_timeout(TimeoutSeconds::new(5).unwrap())
}

fn classify_by_url() -> RequestDescriptor {
    let mut descriptor = RequestDescriptor::new(HttpMethod::Get, "/v3/classify");
    descriptor
        .query_params
        .insert("url".to_string(), json!("http://x/dog.jpg"));
    descriptor
        .query_params
        .insert("owners".to_string(), json!(["me", "IBM"]));
    descriptor
        .headers
        .insert("accept".to_string(), "application/json".to_string());
    descriptor
}

/// Test GET requests carry the default and descriptor query parameters
#[tokio::test]
async fn get_request_injects_default_query() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let dispatcher = HttpDispatcher::new(&config).unwrap();

    Mock::given(method("GET"))
        .and(path("/v3/classify"))
        .and(query_param("version", VERSION_DATE_2016_05_20))
        .and(query_param("api_key", TEST_API_KEY))
        .and(query_param("url", "http://x/dog.jpg"))
        .and(query_param("owners", "me,IBM"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"images": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = dispatcher
        .dispatch(classify_by_url(), &config)
        .await
        .unwrap();

    assert_eq!(result, json!({"images": []}));
}

/// Test multipart POST bodies carry the stream and the JSON side-channel
#[tokio::test]
async fn post_request_sends_multipart_body() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let dispatcher = HttpDispatcher::new(&config).unwrap();

    let mut descriptor = RequestDescriptor::new(HttpMethod::Post, "/v3/classify");
    descriptor.multipart_fields.insert(
        "images_file".to_string(),
        MultipartField::Stream(StreamHandle::new(
            MemorySource::new(b"fake-jpeg-bytes".to_vec()).with_file_name("dog.jpg"),
        )),
    );
    descriptor.multipart_fields.insert(
        "parameters".to_string(),
        MultipartField::Encoded(EncodedField::json(&json!({"owners": ["me", "IBM"]}))),
    );

    Mock::given(method("POST"))
        .and(path("/v3/classify"))
        .and(query_param("version", VERSION_DATE_2016_05_20))
        .and(body_string_contains("fake-jpeg-bytes"))
        .and(body_string_contains(r#"filename="dog.jpg""#))
        .and(body_string_contains(r#"{"owners":["me","IBM"]}"#))
        .and(body_string_contains("application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"images_processed": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = dispatcher.dispatch(descriptor, &config).await.unwrap();

    assert_eq!(result["images_processed"], 1);
}

/// Test DELETE requests fill and encode the path template
#[tokio::test]
async fn delete_request_fills_path() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let dispatcher = HttpDispatcher::new(&config).unwrap();

    let mut descriptor =
        RequestDescriptor::new(HttpMethod::Delete, "/v3/classifiers/{classifier_id}");
    descriptor
        .path_params
        .insert("classifier_id".to_string(), "dogs_1234".to_string());

    Mock::given(method("DELETE"))
        .and(path("/v3/classifiers/dogs_1234"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = dispatcher.dispatch(descriptor, &config).await.unwrap();

    assert!(result.is_null());
}

/// Test authentication failure
#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let dispatcher = HttpDispatcher::new(&config).unwrap();

    Mock::given(method("GET"))
        .and(path("/v3/classify"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&mock_server)
        .await;

    let result = dispatcher.dispatch(classify_by_url(), &config).await;

    match result.unwrap_err() {
        DispatchError::Authentication { message } => assert_eq!(message, "invalid api key"),
        other => panic!("Expected Authentication error, got: {other:?}"),
    }
}

/// Test rate limiting
#[tokio::test]
async fn too_many_requests_maps_to_rate_limit() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let dispatcher = HttpDispatcher::new(&config).unwrap();

    Mock::given(method("GET"))
        .and(path("/v3/classify"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let error = dispatcher
        .dispatch(classify_by_url(), &config)
        .await
        .unwrap_err();

    assert!(matches!(error, DispatchError::RateLimitExceeded));
}

/// Test server errors keep status and body
#[tokio::test]
async fn server_error_keeps_status_and_body() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let dispatcher = HttpDispatcher::new(&config).unwrap();

    Mock::given(method("GET"))
        .and(path("/v3/classify"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let result = dispatcher.dispatch(classify_by_url(), &config).await;

    match result.unwrap_err() {
        DispatchError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal Server Error");
        }
        other => panic!("Expected Api error, got: {other:?}"),
    }
}

/// Test non-JSON success bodies
#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let dispatcher = HttpDispatcher::new(&config).unwrap();

    Mock::given(method("GET"))
        .and(path("/v3/classify"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let result = dispatcher.dispatch(classify_by_url(), &config).await;

    assert!(matches!(
        result,
        Err(DispatchError::InvalidResponse { .. })
    ));
}

/// Byte source whose `open` blocks the calling thread for a while
#[derive(Debug)]
struct SlowSource {
    delay: Duration,
}

impl ByteSource for SlowSource {
    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        thread::sleep(self.delay);
        Ok(Box::new(Cursor::new(b"slow-archive".to_vec())))
    }

    fn file_name(&self) -> Option<String> {
        Some("slow.zip".to_string())
    }
}

/// Byte source that cannot be opened
#[derive(Debug)]
struct MissingSource;

impl ByteSource for MissingSource {
    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        Err(io::Error::new(io::ErrorKind::NotFound, "gone"))
    }
}

fn training_descriptor(source: impl ByteSource + 'static) -> RequestDescriptor {
    let mut descriptor = RequestDescriptor::new(HttpMethod::Post, "/v3/classifiers");
    descriptor.multipart_fields.insert(
        "dogs_positive_examples".to_string(),
        MultipartField::Stream(StreamHandle::new(source)),
    );
    descriptor
}

/// Test slow byte sources are read without stalling a current-thread runtime
#[tokio::test(flavor = "current_thread")]
async fn slow_stream_does_not_block_runtime() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let dispatcher = HttpDispatcher::new(&config).unwrap();

    Mock::given(method("POST"))
        .and(path("/v3/classifiers"))
        .and(body_string_contains("slow-archive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "training"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = tokio::spawn({
        let ticks = Arc::clone(&ticks);
        async move {
            let mut interval = tokio::time::interval(Duration::from_millis(10));
            loop {
                interval.tick().await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        }
    });

    let descriptor = training_descriptor(SlowSource {
        delay: Duration::from_millis(300),
    });
    let result = dispatcher.dispatch(descriptor, &config).await.unwrap();
    ticker.abort();

    assert_eq!(result["status"], "training");
    let ticks = ticks.load(Ordering::SeqCst);
    assert!(ticks >= 10, "runtime stalled while reading the stream: {ticks} ticks");
}

/// Test unreadable byte sources fail before anything is sent
#[tokio::test]
async fn unreadable_stream_is_stream_error() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server.uri());
    let dispatcher = HttpDispatcher::new(&config).unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let error = dispatcher
        .dispatch(training_descriptor(MissingSource), &config)
        .await
        .unwrap_err();

    match error {
        DispatchError::Stream { field, source } => {
            assert_eq!(field, "dogs_positive_examples");
            assert_eq!(source.kind(), io::ErrorKind::NotFound);
        }
        other => panic!("Expected Stream error, got: {other:?}"),
    }
}
