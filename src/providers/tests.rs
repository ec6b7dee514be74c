//! Provider and resolver tests with HTTP mocking.

#[cfg(test)]
mod cloudflare_tests {
    use crate::error::DdnsError;
    use crate::providers::{CloudflareClient, FetchOutcome, RecordClient, RecordUpdate};
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RECORDS_PATH: &str = "/client/v4/zones/zone-123/dns_records";

    fn client(server: &MockServer) -> CloudflareClient {
        CloudflareClient::with_base_url(
            "test-token",
            format!("{}/client/v4", server.uri()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn listing() -> serde_json::Value {
        serde_json::json!({
            "success": true,
            "errors": [],
            "result": [
                {
                    "id": "rec-1",
                    "type": "A",
                    "name": "a.example.com",
                    "content": "203.0.113.5",
                    "proxied": false,
                    "ttl": 1
                },
                {
                    "id": "rec-2",
                    "type": "A",
                    "name": "b.example.com",
                    "content": "203.0.113.9",
                    "proxied": true,
                    "ttl": 1
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_fetch_by_name_scans_listing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RECORDS_PATH))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client(&mock_server)
            .fetch_by_name("zone-123", "b.example.com")
            .await
            .unwrap();

        match outcome {
            FetchOutcome::Found(record) => {
                assert_eq!(record.id, "rec-2");
                assert_eq!(record.content, "203.0.113.9");
                assert!(record.proxied);
            }
            FetchOutcome::NotFound => panic!("record should be found"),
        }
    }

    #[tokio::test]
    async fn test_fetch_by_name_filters_listing_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RECORDS_PATH))
            .and(query_param("type", "A"))
            .and(query_param("name", "b.example.com"))
            .and(query_param("per_page", "5000000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let outcome = client(&mock_server)
            .fetch_by_name("zone-123", "b.example.com")
            .await
            .unwrap();

        assert!(matches!(outcome, FetchOutcome::Found(record) if record.id == "rec-2"));
    }

    #[tokio::test]
    async fn test_fetch_by_name_ignores_other_record_types() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RECORDS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "errors": [],
                "result": [
                    {
                        "id": "txt-1",
                        "type": "TXT",
                        "name": "example.com",
                        "content": "v=spf1 -all",
                        "proxied": false
                    },
                    {
                        "id": "aaaa-1",
                        "type": "AAAA",
                        "name": "example.com",
                        "content": "2001:db8::1",
                        "proxied": false
                    },
                    {
                        "id": "a-1",
                        "type": "A",
                        "name": "example.com",
                        "content": "203.0.113.5",
                        "proxied": false
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let outcome = client(&mock_server)
            .fetch_by_name("zone-123", "example.com")
            .await
            .unwrap();

        match outcome {
            FetchOutcome::Found(record) => {
                assert_eq!(record.id, "a-1");
                assert_eq!(record.record_type, "A");
                assert_eq!(record.content, "203.0.113.5");
            }
            FetchOutcome::NotFound => panic!("A record should be found"),
        }
    }

    #[tokio::test]
    async fn test_fetch_by_name_without_a_record_is_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RECORDS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "errors": [],
                "result": [
                    {
                        "id": "mx-1",
                        "type": "MX",
                        "name": "example.com",
                        "content": "mail.example.com",
                        "proxied": false
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let outcome = client(&mock_server)
            .fetch_by_name("zone-123", "example.com")
            .await
            .unwrap();

        assert_eq!(outcome, FetchOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_by_name_absent_is_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RECORDS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .mount(&mock_server)
            .await;

        let outcome = client(&mock_server)
            .fetch_by_name("zone-123", "nonexistent.example.com")
            .await
            .unwrap();

        assert_eq!(outcome, FetchOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_by_name_malformed_body_is_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RECORDS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let outcome = client(&mock_server)
            .fetch_by_name("zone-123", "a.example.com")
            .await
            .unwrap();

        assert_eq!(outcome, FetchOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_fetch_by_name_auth_error_is_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RECORDS_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                r#"{"success":false,"result":null,"errors":[{"code":9109,"message":"Invalid access token"}]}"#,
            ))
            .mount(&mock_server)
            .await;

        let result = client(&mock_server)
            .fetch_by_name("zone-123", "a.example.com")
            .await;

        match result {
            Err(DdnsError::Provider { provider, message }) => {
                assert_eq!(provider, "cloudflare");
                assert!(message.contains("403"));
                assert!(message.contains("Invalid access token"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_by_name_transport_error_is_failure() {
        // Nothing listens on port 1.
        let client = CloudflareClient::with_base_url(
            "test-token",
            "http://127.0.0.1:1/client/v4",
            Duration::from_secs(2),
        )
        .unwrap();

        let result = client.fetch_by_name("zone-123", "a.example.com").await;
        assert!(matches!(result, Err(DdnsError::Network(_))));
    }

    #[tokio::test]
    async fn test_update_puts_full_record() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(format!("{}/rec-1", RECORDS_PATH)))
            .and(header("Authorization", "Bearer test-token"))
            .and(body_json(serde_json::json!({
                "type": "A",
                "name": "a.example.com",
                "content": "203.0.113.9",
                "ttl": 1,
                "proxied": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "errors": [],
                "result": {"id": "rec-1", "name": "a.example.com", "content": "203.0.113.9"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let update = RecordUpdate {
            name: "a.example.com".to_string(),
            content: "203.0.113.9".to_string(),
            proxied: false,
        };

        let result = client(&mock_server)
            .update("zone-123", "rec-1", &update)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_rejected_status_is_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(format!("{}/rec-1", RECORDS_PATH)))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"success":false,"errors":[{"code":9005,"message":"Content for A record is invalid"}]}"#,
            ))
            .mount(&mock_server)
            .await;

        let update = RecordUpdate {
            name: "a.example.com".to_string(),
            content: "not-an-ip".to_string(),
            proxied: true,
        };

        let result = client(&mock_server)
            .update("zone-123", "rec-1", &update)
            .await;

        match result {
            Err(DdnsError::Provider { message, .. }) => {
                assert!(message.contains("400"));
                assert!(message.contains("Content for A record is invalid"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

#[cfg(test)]
mod resolver_tests {
    use crate::detector::{AddressResolver, HttpAddressResolver};
    use crate::error::DdnsError;
    use std::net::Ipv4Addr;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver(server: &MockServer) -> HttpAddressResolver {
        HttpAddressResolver::new(format!("{}/?format=json", server.uri()), Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_reads_ip_field() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("format", "json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ip": "203.0.113.9"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let address = resolver(&mock_server).resolve().await.unwrap();
        assert_eq!(address, Ipv4Addr::new(203, 0, 113, 9));
    }

    #[tokio::test]
    async fn test_resolve_non_success_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let result = resolver(&mock_server).resolve().await;
        assert!(matches!(result, Err(DdnsError::IpDetection(_))));
    }

    #[tokio::test]
    async fn test_resolve_unparsable_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.9"))
            .mount(&mock_server)
            .await;

        let result = resolver(&mock_server).resolve().await;
        assert!(matches!(result, Err(DdnsError::IpDetection(_))));
    }

    #[tokio::test]
    async fn test_resolve_rejects_ipv6() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"ip": "2001:db8::1"})),
            )
            .mount(&mock_server)
            .await;

        let result = resolver(&mock_server).resolve().await;
        assert!(matches!(result, Err(DdnsError::IpDetection(_))));
    }
}
