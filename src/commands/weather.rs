//! Current weather lookup (Visual Crossing timeline API)

use std::time::Duration;

use serde::Deserialize;

use crate::config::WeatherConfig;
use crate::{Error, Result};

const NO_KEY_REPLY: &str = "ขออภัยค่ะ ไม่สามารถดึงข้อมูลสภาพอากาศได้ เนื่องจากไม่มี API key";
const FAILED_REPLY: &str = "ขออภัยค่ะ ไม่สามารถดึงข้อมูลสภาพอากาศได้";

/// Today's temperature and conditions
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    /// Temperature in °C
    pub temp: f64,
    /// Conditions summary as returned by the API
    pub conditions: String,
}

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    days: Vec<TimelineDay>,
}

#[derive(Debug, Deserialize)]
struct TimelineDay {
    temp: f64,
    conditions: String,
}

/// Weather API client
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    api_url: String,
    location: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl WeatherClient {
    /// Create a client from configuration and an optional API key
    #[must_use]
    pub fn new(config: &WeatherConfig, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            location: config.default_location.clone(),
            api_key,
            timeout: config.timeout,
        }
    }

    /// Fetch today's weather for the configured location
    ///
    /// # Errors
    ///
    /// Returns error if no key is configured, the request fails, or the
    /// response has no days
    pub async fn fetch(&self) -> Result<CurrentWeather> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Weather("no weather API key".to_string()))?;

        let url = format!("{}/{}", self.api_url, urlencoding::encode(&self.location));
        let response = self
            .client
            .get(&url)
            .query(&[
                ("unitGroup", "metric"),
                ("include", "days"),
                ("key", key),
                ("contentType", "json"),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        let response = response.error_for_status().map_err(Error::Http)?;
        let timeline: TimelineResponse = response.json().await?;

        timeline
            .days
            .into_iter()
            .next()
            .map(|day| CurrentWeather {
                temp: day.temp,
                conditions: day.conditions,
            })
            .ok_or_else(|| Error::Weather("response contained no days".to_string()))
    }

    /// Spoken weather report; failures become apologies
    pub async fn report(&self) -> String {
        if self.api_key.is_none() {
            return NO_KEY_REPLY.to_string();
        }

        match self.fetch().await {
            Ok(weather) => format!(
                "อุณหภูมิปัจจุบันในประเทศไทยคือ {} องศาเซลเซียส และสภาพอากาศ {} ค่ะ",
                weather.temp, weather.conditions
            ),
            Err(e) => {
                tracing::warn!(location = %self.location, error = %e, "weather lookup failed");
                FAILED_REPLY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer, key: Option<&str>) -> WeatherClient {
        let config = WeatherConfig {
            api_url: format!("{}/timeline/", server.uri()),
            default_location: "Thailand".to_string(),
            timeout: Duration::from_secs(2),
        };
        WeatherClient::new(&config, key.map(ToString::to_string))
    }

    #[tokio::test]
    async fn test_report_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/timeline/Thailand"))
            .and(query_param("unitGroup", "metric"))
            .and(query_param("key", "wk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "days": [{"temp": 31.5, "conditions": "Partially cloudy"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(&server, Some("wk-test")).report().await;
        assert_eq!(
            reply,
            "อุณหภูมิปัจจุบันในประเทศไทยคือ 31.5 องศาเซลเซียส และสภาพอากาศ Partially cloudy ค่ะ"
        );
    }

    #[tokio::test]
    async fn test_report_without_key_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        assert_eq!(client(&server, None).report().await, NO_KEY_REPLY);
    }

    #[tokio::test]
    async fn test_report_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;
        assert_eq!(client(&server, Some("wrong")).report().await, FAILED_REPLY);

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"days": []})))
            .mount(&server)
            .await;
        let weather_client = client(&server, Some("wk"));
        assert!(matches!(weather_client.fetch().await, Err(Error::Weather(_))));
        assert_eq!(weather_client.report().await, FAILED_REPLY);
    }
}
