use serde::{Deserialize, Serialize};

/// The four traffic measurements a prediction is made from, in model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    InboundRate,
    OutboundRate,
    InboundUtil,
    OutboundUtil,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::InboundRate,
        Feature::OutboundRate,
        Feature::InboundUtil,
        Feature::OutboundUtil,
    ];

    /// JSON key used on the wire.
    pub fn key(self) -> &'static str {
        match self {
            Feature::InboundRate => "inbound_rate",
            Feature::OutboundRate => "outbound_rate",
            Feature::InboundUtil => "inbound_util",
            Feature::OutboundUtil => "outbound_util",
        }
    }

    /// Column header in the labelled dataset.
    pub fn dataset_column(self) -> &'static str {
        match self {
            Feature::InboundRate => "Inbound Rate(bit/s)",
            Feature::OutboundRate => "Outbound Rate(bit/s)",
            Feature::InboundUtil => "Inbound Bandwidth Utilization(%)",
            Feature::OutboundUtil => "Outbound Bandwidth Utilization(%)",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Feature::InboundRate => "Inbound rate (bit/s)",
            Feature::OutboundRate => "Outbound rate (bit/s)",
            Feature::InboundUtil => "Inbound utilization (%)",
            Feature::OutboundUtil => "Outbound utilization (%)",
        }
    }
}

pub const LABEL_COLUMN: &str = "Label";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Normal,
    Anomaly,
}

impl Verdict {
    /// Only a prediction of exactly 1 is an anomaly.
    pub fn from_prediction(prediction: f64) -> Self {
        if prediction == 1.0 {
            Verdict::Anomaly
        } else {
            Verdict::Normal
        }
    }

    pub fn is_anomaly(self) -> bool {
        self == Verdict::Anomaly
    }

    pub fn name(self) -> &'static str {
        match self {
            Verdict::Normal => "Normal",
            Verdict::Anomaly => "Anomaly",
        }
    }

    /// Style class of the result label.
    pub fn style_class(self) -> &'static str {
        match self {
            Verdict::Normal => "normal",
            Verdict::Anomaly => "anomaly",
        }
    }

    pub fn detail(self) -> &'static str {
        match self {
            Verdict::Normal => "Prediction: Normal (0)",
            Verdict::Anomaly => "Prediction: Anomaly (1)",
        }
    }
}
