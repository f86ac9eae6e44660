//! GeoJSON decoding for the nearby-POI endpoint.
//!
//! The server returns a GeoJSON feature collection (sometimes doubly
//! encoded as a JSON string inside the envelope). Features carry their
//! category in `poi_type`, the display name in `name`, the address in
//! `addr:full`, and the distance from the looked-up point in `distance`.

use geojson::FeatureCollection;
use landscope_models::{PoiCategory, PoiCollection, PoiFeature};

use crate::LookupError;

/// Fallback name for unnamed features.
const UNNAMED: &str = "未命名";
/// Fallback when a feature has no usable address.
const NO_ADDRESS: &str = "無地址";

/// Decodes the envelope's `data` payload into a [`PoiCollection`].
///
/// Accepts either a GeoJSON object or a string containing one.
///
/// # Errors
///
/// Returns [`LookupError::Parse`] when the payload is neither.
pub fn decode(data: &serde_json::Value) -> Result<PoiCollection, LookupError> {
    let collection: FeatureCollection = match data {
        serde_json::Value::String(inner) => {
            serde_json::from_str(inner).map_err(|e| LookupError::Parse {
                message: format!("POI payload is not GeoJSON: {e}"),
            })?
        }
        other => serde_json::from_value(other.clone()).map_err(|e| LookupError::Parse {
            message: format!("POI payload is not GeoJSON: {e}"),
        })?,
    };

    let features = collection
        .features
        .into_iter()
        .filter_map(|feature| {
            // GeoJSON positions are [lng, lat].
            let (lng, lat) = match feature.geometry.as_ref().map(|g| &g.value) {
                Some(geojson::Value::Point(position)) if position.len() >= 2 => {
                    (position[0], position[1])
                }
                _ => return None,
            };

            let prop_str = |key: &str| {
                feature
                    .properties
                    .as_ref()
                    .and_then(|p| p.get(key))
                    .and_then(serde_json::Value::as_str)
                    .map(String::from)
            };

            let category = prop_str("poi_type")
                .map_or(PoiCategory::Other, |tag| PoiCategory::parse_lossy(&tag));
            let distance = feature
                .properties
                .as_ref()
                .and_then(|p| p.get("distance"))
                .and_then(serde_json::Value::as_f64)
                .unwrap_or(0.0);

            Some(PoiFeature {
                category,
                name: prop_str("name").unwrap_or_else(|| UNNAMED.to_string()),
                address: prop_str("addr:full").unwrap_or_else(|| NO_ADDRESS.to_string()),
                distance,
                lat,
                lng,
            })
        })
        .collect();

    Ok(PoiCollection { features })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> serde_json::Value {
        serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [121.512, 25.041] },
                    "properties": {
                        "poi_type": "food",
                        "name": "阿宗麵線",
                        "addr:full": "台北市萬華區峨眉街8之1號",
                        "distance": 230.5
                    }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [121.515, 25.043] },
                    "properties": { "poi_type": "worship" }
                }
            ]
        })
    }

    #[test]
    fn decodes_features_with_fallbacks() {
        let pois = decode(&sample()).unwrap();
        assert_eq!(pois.len(), 2);

        let first = &pois.features[0];
        assert_eq!(first.category, PoiCategory::Food);
        assert_eq!(first.name, "阿宗麵線");
        assert!((first.distance - 230.5).abs() < 1e-9);
        assert!((first.lat - 25.041).abs() < 1e-9);
        assert!((first.lng - 121.512).abs() < 1e-9);

        // Unknown category and missing properties fall back.
        let second = &pois.features[1];
        assert_eq!(second.category, PoiCategory::Other);
        assert_eq!(second.name, UNNAMED);
        assert_eq!(second.address, NO_ADDRESS);
        assert!((second.distance - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn decodes_string_encoded_payload() {
        let doubly_encoded = serde_json::Value::String(sample().to_string());
        let pois = decode(&doubly_encoded).unwrap();
        assert_eq!(pois.len(), 2);
    }

    #[test]
    fn empty_collection_is_ok() {
        let empty = serde_json::json!({ "type": "FeatureCollection", "features": [] });
        let pois = decode(&empty).unwrap();
        assert!(pois.is_empty());
    }

    #[test]
    fn non_geojson_payload_is_a_parse_error() {
        let err = decode(&serde_json::json!(42)).unwrap_err();
        assert!(matches!(err, LookupError::Parse { .. }));
    }
}
