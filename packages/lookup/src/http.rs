//! `reqwest` implementation of [`ZoningApi`].

use landscope_models::{
    AddressPointRecord, ApiEnvelope, IntersectResult, NearbyAnalysis, PoiCollection,
};
use serde::de::DeserializeOwned;

use crate::{LookupError, LookupQuery, ZoningApi, poi_geojson};

/// HTTP client for a landscope-compatible backend.
pub struct HttpLookupClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLookupClient {
    /// Creates a client against `base_url` (e.g. `http://localhost:8000`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn read_body(resp: reqwest::Response) -> Result<(u16, serde_json::Value), LookupError> {
        let code = resp.status().as_u16();
        let text = resp.text().await?;
        // Error pages are not always JSON; the status code alone is
        // still worth surfacing.
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);
        Ok((code, body))
    }
}

#[async_trait::async_trait]
impl ZoningApi for HttpLookupClient {
    async fn intersect(&self, query: &LookupQuery) -> Result<IntersectResult, LookupError> {
        let url = match query {
            LookupQuery::Address(address) => {
                format!("{}/api/intersect/{address}", self.base_url)
            }
            LookupQuery::Coordinates { lat, lng } => {
                format!(
                    "{}/api/intersect/{lat},{lng}?use_coordinates=true",
                    self.base_url
                )
            }
        };
        log::debug!("GET {url}");
        let resp = self.client.get(&url).send().await?;
        let (code, body) = Self::read_body(resp).await?;
        unwrap_envelope(code, &body)
    }

    async fn nearby_poi(&self, lat: f64, lng: f64) -> Result<PoiCollection, LookupError> {
        let url = format!("{}/api/nearby-poi/{lat},{lng}", self.base_url);
        log::debug!("GET {url}");
        let resp = self.client.get(&url).send().await?;
        let (code, body) = Self::read_body(resp).await?;
        unwrap_poi(code, &body)
    }

    async fn nearby_analysis(
        &self,
        record: &AddressPointRecord,
    ) -> Result<NearbyAnalysis, LookupError> {
        let url = format!("{}/api/nearby-analysis", self.base_url);
        log::debug!("POST {url}");
        let resp = self.client.post(&url).json(record).send().await?;
        let (code, body) = Self::read_body(resp).await?;
        unwrap_envelope(code, &body)
    }

    async fn compare_points(&self, records: &[AddressPointRecord]) -> Result<String, LookupError> {
        let url = format!("{}/api/compare-points", self.base_url);
        log::debug!("POST {url} ({} records)", records.len());
        let resp = self.client.post(&url).json(records).send().await?;
        let (code, body) = Self::read_body(resp).await?;
        unwrap_envelope(code, &body)
    }
}

/// Extracts the server message from an envelope-shaped body, if any.
fn server_message(body: &serde_json::Value) -> Option<String> {
    body.get("message")
        .and_then(serde_json::Value::as_str)
        .map(String::from)
}

/// Unwraps `data` out of the response envelope, mapping non-2xx statuses
/// to [`LookupError::Status`] with the server message attached.
fn unwrap_envelope<T: DeserializeOwned>(
    code: u16,
    body: &serde_json::Value,
) -> Result<T, LookupError> {
    if !(200..300).contains(&code) {
        return Err(LookupError::Status {
            code,
            message: server_message(body),
        });
    }
    let envelope: ApiEnvelope<T> =
        serde_json::from_value(body.clone()).map_err(|e| LookupError::Parse {
            message: format!("malformed response envelope: {e}"),
        })?;
    envelope.data.ok_or_else(|| LookupError::Parse {
        message: "response envelope has no data".to_string(),
    })
}

/// POI variant of [`unwrap_envelope`]: the server answers 404 when the
/// area has no POIs at all, which is a valid empty outcome here, not an
/// error.
fn unwrap_poi(code: u16, body: &serde_json::Value) -> Result<PoiCollection, LookupError> {
    if code == 404 {
        return Ok(PoiCollection::empty());
    }
    if !(200..300).contains(&code) {
        return Err(LookupError::Status {
            code,
            message: server_message(body),
        });
    }
    let envelope: ApiEnvelope<serde_json::Value> =
        serde_json::from_value(body.clone()).map_err(|e| LookupError::Parse {
            message: format!("malformed response envelope: {e}"),
        })?;
    match envelope.data {
        Some(data) => poi_geojson::decode(&data),
        None => Ok(PoiCollection::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwrap_envelope_surfaces_status_and_message() {
        let body = serde_json::json!({ "data": null, "message": "無法找到該地址，請檢查地址是否正確。" });
        let err = unwrap_envelope::<IntersectResult>(404, &body).unwrap_err();
        match err {
            LookupError::Status { code, message } => {
                assert_eq!(code, 404);
                assert_eq!(message.as_deref(), Some("無法找到該地址，請檢查地址是否正確。"));
                // The user-facing text combines both.
                let shown = LookupError::Status {
                    code,
                    message,
                }
                .to_string();
                assert!(shown.contains("404"));
                assert!(shown.contains("無法找到該地址"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unwrap_envelope_without_message_still_carries_code() {
        let err = unwrap_envelope::<IntersectResult>(500, &serde_json::Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "server returned status 500");
    }

    #[test]
    fn unwrap_envelope_requires_data() {
        let body = serde_json::json!({ "data": null, "message": null });
        let err = unwrap_envelope::<IntersectResult>(200, &body).unwrap_err();
        assert!(matches!(err, LookupError::Parse { .. }));
    }

    #[test]
    fn poi_404_is_an_empty_collection() {
        let body = serde_json::json!({ "message": "查無該地址附近的POI資訊。" });
        let pois = unwrap_poi(404, &body).unwrap();
        assert!(pois.is_empty());
    }

    #[test]
    fn poi_other_failures_are_errors() {
        let err = unwrap_poi(502, &serde_json::Value::Null).unwrap_err();
        assert!(matches!(err, LookupError::Status { code: 502, .. }));
    }

    #[test]
    fn poi_success_decodes_geojson_payload() {
        let body = serde_json::json!({
            "data": { "type": "FeatureCollection", "features": [] },
            "message": "成功獲取POI資訊。"
        });
        let pois = unwrap_poi(200, &body).unwrap();
        assert!(pois.is_empty());
    }
}
