//! IPFS client tests against a mock HTTP API

use std::time::Duration;

use registry_sync::content::{ContentStore, IpfsClient};
use registry_sync::Error;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> IpfsClient {
    IpfsClient::new(&format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_cat_strips_scheme_and_padding() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/cat"))
        .and(query_param("arg", "QmOrgMetadata"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"{\"org_name\":\"SNET\"}".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let bytes = client.get_file("ipfs://QmOrgMetadata\0\0\0").await.unwrap();
    assert_eq!(bytes, b"{\"org_name\":\"SNET\"}");
}

#[tokio::test]
async fn test_cat_bare_hash() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/cat"))
        .and(query_param("arg", "QmBundle"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x50, 0x4b, 0x03, 0x04]))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.get_file("QmBundle").await.unwrap(), vec![0x50, 0x4b, 0x03, 0x04]);
}

#[tokio::test]
async fn test_server_error_is_content_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/cat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("merkledag: not found"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.get_file("QmMissing").await;
    match result {
        Err(Error::Content(message)) => assert!(message.contains("QmMissing")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_locator_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.get_file("\0\0\0").await;
    assert!(matches!(result, Err(Error::Content(_))));
}
