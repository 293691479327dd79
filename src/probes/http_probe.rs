use async_trait::async_trait;
use log::debug;
use reqwest::{header, redirect, Client, ClientBuilder};
use std::time::{Duration, Instant};
use url::Url;

use super::probe::{elapsed_ms, Measurement, PageMetrics, Probe, ProbeError, ProbeResult};
use crate::core::{CollectorConfig, CollectorError, CollectorResult};
use crate::parser::{count_subresources, looks_like_html};

/// Times a single GET of the page itself.
#[derive(Clone)]
pub struct HttpProbe {
    client: Client,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new() -> CollectorResult<Self> {
        Self::from_config(&CollectorConfig::default())
    }

    pub fn from_config(config: &CollectorConfig) -> CollectorResult<Self> {
        let timeout = config.effective_timeout();
        let client = build_client(config, timeout)?;
        Ok(Self { client, timeout })
    }
}

pub(crate) fn build_client(config: &CollectorConfig, timeout: Duration) -> CollectorResult<Client> {
    let mut header_map = header::HeaderMap::new();
    for (key, value) in &config.headers {
        let name = header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            CollectorError::Config(format!("invalid header name {:?}: {}", key, e))
        })?;
        let value = header::HeaderValue::from_str(value).map_err(|e| {
            CollectorError::Config(format!("invalid value for header {}: {}", key, e))
        })?;
        header_map.insert(name, value);
    }

    let client = ClientBuilder::new()
        .user_agent(config.user_agent.as_str())
        .default_headers(header_map)
        .timeout(timeout)
        .redirect(redirect::Policy::limited(config.max_redirects))
        .build()?;
    Ok(client)
}

#[async_trait]
impl Probe for HttpProbe {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn probe(&self, url: &Url) -> ProbeResult<Measurement> {
        let start = Instant::now();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(e, self.timeout))?;
        let ttfb_ms = elapsed_ms(start);

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| ProbeError::from_reqwest(e, self.timeout))?;
        let response_time_ms = elapsed_ms(start);

        let text = String::from_utf8_lossy(&body);
        let resource_count = if looks_like_html(content_type.as_deref(), &text) {
            count_subresources(&text)
        } else {
            None
        };

        debug!(
            "Probed {}: status={}, ttfb={:.1}ms, total={:.1}ms, body_length={}",
            url,
            status_code,
            ttfb_ms,
            response_time_ms,
            body.len()
        );

        Ok(Measurement {
            status_code,
            response_time_ms,
            ttfb_ms: Some(ttfb_ms),
            final_url: Some(final_url),
            content_length: Some(body.len() as u64),
            metrics: PageMetrics {
                resource_count,
                ..PageMetrics::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (HttpProbe, MockServer) {
        let server = MockServer::start().await;
        let probe = HttpProbe::new().unwrap();
        (probe, server)
    }

    fn url_for(server: &MockServer, route: &str) -> Url {
        Url::parse(&server.uri()).unwrap().join(route).unwrap()
    }

    #[tokio::test]
    async fn test_get_html_page() {
        let (probe, mock_server) = setup().await;
        let body = concat!(
            r#"<html><head><script src="/a.js"></script></head>"#,
            r#"<body><img src="/b.png"></body></html>"#,
        );

        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .insert_header("content-type", "text/html"),
            )
            .mount(&mock_server)
            .await;

        let m = probe.probe(&url_for(&mock_server, "/page")).await.unwrap();

        assert_eq!(m.status_code, 200);
        assert_eq!(m.content_length, Some(body.len() as u64));
        assert_eq!(m.metrics.resource_count, Some(2));
        assert!(m.response_time_ms >= m.ttfb_ms.unwrap());
        assert!(m.final_url.unwrap().ends_with("/page"));
    }

    #[tokio::test]
    async fn test_non_html_skips_resource_count() {
        let (probe, mock_server) = setup().await;

        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{\"ok\":true}")
                    .insert_header("content-type", "application/json"),
            )
            .mount(&mock_server)
            .await;

        let m = probe.probe(&url_for(&mock_server, "/data")).await.unwrap();
        assert_eq!(m.status_code, 200);
        assert_eq!(m.metrics.resource_count, None);
    }

    #[tokio::test]
    async fn test_error_status_is_a_measurement() {
        let (probe, mock_server) = setup().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&mock_server)
            .await;

        let m = probe.probe(&url_for(&mock_server, "/missing")).await.unwrap();
        assert_eq!(m.status_code, 404);
        assert_eq!(m.content_length, Some(9));
    }

    #[tokio::test]
    async fn test_follows_redirects() {
        let (probe, mock_server) = setup().await;

        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
            .mount(&mock_server)
            .await;

        let m = probe.probe(&url_for(&mock_server, "/old")).await.unwrap();
        assert_eq!(m.status_code, 200);
        assert!(m.final_url.unwrap().ends_with("/new"));
    }

    #[tokio::test]
    async fn test_redirect_limit() {
        let mock_server = MockServer::start().await;
        let config = CollectorConfig::default().with_max_redirects(1);
        let probe = HttpProbe::from_config(&config).unwrap();

        Mock::given(method("GET"))
            .and(path("/hop1"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/hop2"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/hop2"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/hop3"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/hop3"))
            .respond_with(ResponseTemplate::new(200).set_body_string("end"))
            .mount(&mock_server)
            .await;

        match probe.probe(&url_for(&mock_server, "/hop1")).await {
            Err(ProbeError::Network(_)) => {}
            other => panic!("expected redirect failure, got {:?}", other),
        }

        let m = HttpProbe::new()
            .unwrap()
            .probe(&url_for(&mock_server, "/hop1"))
            .await
            .unwrap();
        assert!(m.final_url.unwrap().ends_with("/hop3"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let mock_server = MockServer::start().await;
        let probe = HttpProbe::from_config(
            &CollectorConfig::default().with_timeout(Duration::from_millis(100)),
        )
        .unwrap();

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let err = probe.probe(&url_for(&mock_server, "/slow")).await.unwrap_err();
        assert_eq!(err, ProbeError::Timeout(Duration::from_millis(100)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let probe = HttpProbe::new().unwrap();
        // Port 9 (discard) on loopback is not expected to be listening.
        let url = Url::parse("http://127.0.0.1:9/").unwrap();

        match probe.probe(&url).await {
            Err(ProbeError::Network(_)) => {}
            other => panic!("expected network error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_custom_headers() {
        let mock_server = MockServer::start().await;
        let config = CollectorConfig::default()
            .with_user_agent("CustomBot/1.0")
            .with_headers(vec![("x-bench", "1")]);
        let probe = HttpProbe::from_config(&config).unwrap();

        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", "CustomBot/1.0"))
            .and(header("x-bench", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;

        let m = probe.probe(&Url::parse(&mock_server.uri()).unwrap()).await.unwrap();
        assert_eq!(m.status_code, 200);
    }

    #[test]
    fn test_invalid_headers() {
        let config = CollectorConfig::default().with_headers(vec![("invalid\0header", "value")]);
        assert!(matches!(
            HttpProbe::from_config(&config),
            Err(CollectorError::Config(_))
        ));
    }
}
