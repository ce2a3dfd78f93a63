use crate::core::rates::{RatesProvider, RatesResponse};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, instrument};

/// Client for the rates service's `GET /rates` endpoint.
pub struct HttpRatesProvider {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRatesProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("yafx/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpRatesProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn rates_url(&self, date: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/rates", self.base_url))
            .with_context(|| format!("Invalid rates service URL: {}", self.base_url))?;
        if let Some(date) = date {
            url.query_pairs_mut().append_pair("date", date);
        }
        Ok(url)
    }
}

#[async_trait]
impl RatesProvider for HttpRatesProvider {
    #[instrument(name = "RatesFetch", skip(self))]
    async fn fetch_rates(&self, date: Option<&str>) -> Result<RatesResponse> {
        let url = self.rates_url(date)?;
        debug!("Requesting rates from {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} URL: {}", e, url))?;

        debug!(status = %response.status(), "Received rates response");

        let response = response
            .error_for_status()
            .with_context(|| format!("Rates service rejected request for {url}"))?;

        let data = response
            .json::<RatesResponse>()
            .await
            .context("Failed to parse rates response")?;

        debug!(date = %data.date, count = data.rates.len(), "Parsed rates");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MOCK_JSON: &str = r#"{
        "date": "2023-07-01",
        "rates": [
            {"currency": "AUD", "name": "Australian Dollar", "rate": 1.25},
            {"currency": "CNY", "name": "Chinese Yuan", "rate": 6.25},
            {"currency": "EUR", "name": "Euro", "rate": 0.81}
        ]
    }"#;

    #[tokio::test]
    async fn test_fetch_rates_for_date() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rates"))
            .and(query_param("date", "2023-07-01"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_JSON))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = HttpRatesProvider::new(&mock_server.uri()).unwrap();
        let result = provider.fetch_rates(Some("2023-07-01")).await.unwrap();

        assert_eq!(result.date, "2023-07-01");
        assert_eq!(result.rates.len(), 3);
        assert_eq!(result.rates[0].currency, "AUD");
        assert_eq!(result.rates[1].rate, 6.25);
        assert_eq!(result.rates[2].name, "Euro");
    }

    #[tokio::test]
    async fn test_fetch_latest_has_no_date_filter() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rates"))
            .and(query_param_is_missing("date"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"date": "2025-11-15", "rates": []}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        // Trailing slash on the configured URL is tolerated
        let provider = HttpRatesProvider::new(&format!("{}/", mock_server.uri())).unwrap();
        let result = provider.fetch_rates(None).await.unwrap();

        assert_eq!(result.date, "2025-11-15");
        assert!(result.rates.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rates"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_string(r#"{"error": "date must be in YYYY-MM-DD format"}"#),
            )
            .mount(&mock_server)
            .await;

        let provider = HttpRatesProvider::new(&mock_server.uri()).unwrap();
        let result = provider.fetch_rates(Some("not-a-date")).await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("rejected"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rates"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let provider = HttpRatesProvider::new(&mock_server.uri()).unwrap();
        let result = provider.fetch_rates(None).await;

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse rates response")
        );
    }

    #[tokio::test]
    async fn test_unreachable_service_is_failure() {
        // Port 9 (discard) is not expected to serve HTTP
        let provider = HttpRatesProvider::new("http://127.0.0.1:9").unwrap();
        let result = provider.fetch_rates(None).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Request error"));
    }
}
