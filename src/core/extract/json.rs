use crate::core::extract::normalize_key;
use crate::core::lookup;
use crate::domain::model::ChartResult;
use crate::domain::ports::Extractor;
use crate::utils::error::{ChartError, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Parses the calculation API's JSON payload (also produced by the browser
/// strategy's sniffed background responses) into a `ChartResult`.
///
/// Numeric enum codes are mapped to labels via the fixed lookup tables;
/// activation records are synthesized as `"{Planet} {gate}.{line} {▲|▼}"`
/// with the arrow encoding the alignment flag.
pub struct ApiJsonExtractor;

impl ApiJsonExtractor {
    fn map_coded_properties(payload: &Value, properties: &mut BTreeMap<String, String>) {
        if let Some(code) = payload.get("type").and_then(Value::as_u64) {
            if let Some(label) = lookup::type_label(code as u32) {
                properties.insert("type".to_string(), label.to_string());
            }
        }
        if let Some(code) = payload.get("authority").and_then(Value::as_u64) {
            if let Some(label) = lookup::authority_label(code as u32) {
                properties.insert("authority".to_string(), label.to_string());
            }
        }
        if let Some(code) = payload.get("definition").and_then(Value::as_u64) {
            if let Some(label) = lookup::definition_label(code as u32) {
                properties.insert("definition".to_string(), label.to_string());
            }
        }
        if let Some(code) = payload.get("profile").and_then(Value::as_u64) {
            properties.insert("profile".to_string(), lookup::format_profile(code as u32));
        }
    }

    /// String fields the API passes through verbatim, e.g. strategy or the
    /// incarnation cross name.
    fn copy_string_properties(payload: &Value, properties: &mut BTreeMap<String, String>) {
        let Some(extra) = payload.get("properties").and_then(Value::as_object) else {
            return;
        };
        for (key, value) in extra {
            if let Some(text) = value.as_str() {
                let key = normalize_key(key);
                if !key.is_empty() && !text.trim().is_empty() {
                    properties.entry(key).or_insert_with(|| text.trim().to_string());
                }
            }
        }
    }

    fn collect_activations(payload: &Value) -> (Vec<String>, Vec<String>) {
        let mut design = Vec::new();
        let mut personality = Vec::new();

        let Some(records) = payload.get("activations").and_then(Value::as_array) else {
            return (design, personality);
        };

        for record in records {
            let Some(planet_code) = record.get("planet").and_then(Value::as_u64) else {
                continue;
            };
            let Some(planet) = lookup::planet_label(planet_code as u32) else {
                tracing::warn!("Skipping activation with unknown planet code {}", planet_code);
                continue;
            };
            let (Some(gate), Some(line)) = (
                record.get("gate").and_then(Value::as_u64),
                record.get("line").and_then(Value::as_u64),
            ) else {
                continue;
            };

            let aligned = record
                .get("aligned")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let arrow = if aligned { "▲" } else { "▼" };
            let entry = format!("{} {}.{} {}", planet, gate, line, arrow);

            // Activation-type flag: 0 = design (prenatal), 1 = personality.
            match record.get("activation").and_then(Value::as_u64) {
                Some(1) => personality.push(entry),
                _ => design.push(entry),
            }
        }

        (design, personality)
    }
}

impl Extractor for ApiJsonExtractor {
    fn extract(&self, raw: &str) -> Result<ChartResult> {
        let parsed: Value = serde_json::from_str(raw)?;

        // API-level failures arrive as a 200 with an error envelope.
        if let Some(error) = parsed.get("error") {
            let message = error
                .as_str()
                .map(str::to_string)
                .or_else(|| {
                    error
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| error.to_string());
            return Err(ChartError::Extraction {
                message: format!("API returned error: {}", message),
            });
        }

        // Accept both the bare payload and a { "chart": ... } wrapper.
        let payload = parsed.get("chart").unwrap_or(&parsed);

        let mut properties = BTreeMap::new();
        Self::map_coded_properties(payload, &mut properties);
        Self::copy_string_properties(payload, &mut properties);

        let (design_activations, personality_activations) = Self::collect_activations(payload);

        let chart_image_url = payload
            .get("chart_image_url")
            .or_else(|| payload.get("image_url"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let download_token = payload
            .get("download_token")
            .or_else(|| payload.get("token"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(ChartResult {
            properties,
            design_activations,
            personality_activations,
            chart_image_url,
            download_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "type": 4,
        "authority": 2,
        "definition": 2,
        "profile": 24,
        "properties": {"Strategy": "To Respond", "Incarnation Cross": "Right Angle Cross of Planning"},
        "activations": [
            {"planet": 1, "gate": 34, "line": 2, "activation": 0, "aligned": true},
            {"planet": 2, "gate": 20, "line": 2, "activation": 0, "aligned": false},
            {"planet": 1, "gate": 45, "line": 1, "activation": 1, "aligned": true}
        ],
        "chart_image_url": "https://charts.example.com/render/xyz.png",
        "download_token": "dG9rZW4="
    }"#;

    #[test]
    fn numeric_codes_map_to_labels() {
        let result = ApiJsonExtractor.extract(FIXTURE).unwrap();
        assert_eq!(result.properties.get("type").unwrap(), "Manifesting Generator");
        assert_eq!(result.properties.get("authority").unwrap(), "Sacral");
        assert_eq!(result.properties.get("definition").unwrap(), "Split Definition");
        assert_eq!(result.properties.get("profile").unwrap(), "2/4");
    }

    #[test]
    fn string_properties_pass_through_with_normalized_keys() {
        let result = ApiJsonExtractor.extract(FIXTURE).unwrap();
        assert_eq!(result.properties.get("strategy").unwrap(), "To Respond");
        assert_eq!(
            result.properties.get("incarnation_cross").unwrap(),
            "Right Angle Cross of Planning"
        );
    }

    #[test]
    fn activations_are_bucketed_and_formatted() {
        let result = ApiJsonExtractor.extract(FIXTURE).unwrap();
        assert_eq!(result.design_activations, vec!["Sun 34.2 ▲", "Earth 20.2 ▼"]);
        assert_eq!(result.personality_activations, vec!["Sun 45.1 ▲"]);
    }

    #[test]
    fn image_url_and_token_pass_through() {
        let result = ApiJsonExtractor.extract(FIXTURE).unwrap();
        assert_eq!(
            result.chart_image_url.as_deref(),
            Some("https://charts.example.com/render/xyz.png")
        );
        assert_eq!(result.download_token.as_deref(), Some("dG9rZW4="));
    }

    #[test]
    fn chart_wrapper_envelope_is_accepted() {
        let wrapped = format!(r#"{{"chart": {}}}"#, FIXTURE);
        let result = ApiJsonExtractor.extract(&wrapped).unwrap();
        assert_eq!(result.properties.get("profile").unwrap(), "2/4");
    }

    #[test]
    fn error_envelope_is_a_hard_extraction_error() {
        let raw = r#"{"error": {"message": "invalid birth data"}}"#;
        let err = ApiJsonExtractor.extract(raw).unwrap_err();
        assert!(matches!(err, ChartError::Extraction { .. }));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = ApiJsonExtractor.extract("not json").unwrap_err();
        assert!(matches!(err, ChartError::Serialization(_)));
    }

    #[test]
    fn extraction_is_idempotent() {
        let first = ApiJsonExtractor.extract(FIXTURE).unwrap();
        let second = ApiJsonExtractor.extract(FIXTURE).unwrap();
        assert_eq!(first, second);
    }
}
