use serde::{Deserialize, Serialize};

use crate::domain::{Feature, Verdict};

pub const PREDICT_ROUTE: &str = "/api/predict";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub inbound_rate: f64,
    pub outbound_rate: f64,
    pub inbound_util: f64,
    pub outbound_util: f64,
}

impl PredictionRequest {
    pub fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::InboundRate => self.inbound_rate,
            Feature::OutboundRate => self.outbound_rate,
            Feature::InboundUtil => self.inbound_util,
            Feature::OutboundUtil => self.outbound_util,
        }
    }

    pub fn from_values(values: [f64; 4]) -> Self {
        let [inbound_rate, outbound_rate, inbound_util, outbound_util] = values;
        Self {
            inbound_rate,
            outbound_rate,
            inbound_util,
            outbound_util,
        }
    }
}

/// Body of a 2xx response from the prediction endpoint. `prediction` is any
/// JSON number, so `1` and `1.0` decode alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSuccess {
    pub prediction: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl PredictionSuccess {
    pub fn verdict(&self) -> Verdict {
        Verdict::from_prediction(self.prediction)
    }
}

/// Decoded prediction ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub verdict: Verdict,
    /// The number the service answered with, kept for scoring.
    pub prediction: f64,
}

impl Prediction {
    pub fn new(prediction: f64, label: Option<String>) -> Self {
        let verdict = Verdict::from_prediction(prediction);
        let label = label.unwrap_or_else(|| verdict.name().to_string());
        Self {
            label,
            verdict,
            prediction,
        }
    }
}

impl From<PredictionSuccess> for Prediction {
    fn from(body: PredictionSuccess) -> Self {
        Self::new(body.prediction, body.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_feature_keys() {
        let request = PredictionRequest::from_values([100.0, 50.0, 0.8, 0.3]);
        let value = serde_json::to_value(request).expect("json");
        let object = value.as_object().expect("object");

        assert_eq!(object.len(), 4);
        for feature in Feature::ALL {
            assert_eq!(object[feature.key()], request.value(feature));
        }
    }

    #[test]
    fn only_prediction_one_is_anomaly() {
        let anomaly: PredictionSuccess =
            serde_json::from_str(r#"{"prediction":1,"label":"High anomaly risk"}"#).expect("json");
        let prediction = Prediction::from(anomaly);
        assert_eq!(prediction.label, "High anomaly risk");
        assert_eq!(prediction.verdict.style_class(), "anomaly");
        assert_eq!(prediction.verdict.detail(), "Prediction: Anomaly (1)");

        for raw in [0.0, 2.0, -1.0, 0.5] {
            assert_eq!(Verdict::from_prediction(raw), Verdict::Normal);
        }
    }

    #[test]
    fn integral_float_prediction_decodes_as_anomaly() {
        let body: PredictionSuccess =
            serde_json::from_str(r#"{"prediction":1.0}"#).expect("json");
        let prediction = Prediction::from(body);

        assert_eq!(prediction.verdict, Verdict::Anomaly);
        assert_eq!(prediction.label, "Anomaly");
        assert_eq!(prediction.prediction, 1.0);
    }
}
