// Measurement domain models
use serde::{Deserialize, Serialize};

/// First iPerf3 port; stream `i` of a dataset is measured on `BASE_PORT + i`.
pub const BASE_PORT: usize = 5201;

/// Wire form of a row: `[timestamp, send_bps, receive_bps, label]`.
type WireRow = (Option<f64>, Option<f64>, Option<f64>, Option<String>);

/// One measurement stream as reported by the server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "WireRow", into = "WireRow")]
pub struct MeasurementRow {
    pub timestamp_secs: Option<f64>,
    pub send_rate_bps: Option<f64>,
    pub receive_rate_bps: Option<f64>,
    pub label: String,
}

/// Ordered, index-significant sequence of rows.
pub type Dataset = Vec<MeasurementRow>;

/// Which fields take part in deciding whether a row changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDetection {
    /// Timestamp and both rates; labels are descriptive only.
    #[default]
    Readings,
    ReadingsAndLabel,
}

impl MeasurementRow {
    pub fn new(
        timestamp_secs: Option<f64>,
        send_rate_bps: Option<f64>,
        receive_rate_bps: Option<f64>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            timestamp_secs,
            send_rate_bps,
            receive_rate_bps,
            label: label.into(),
        }
    }

    /// Positional comparison against the row previously shown at the same index.
    pub fn same_as(&self, other: &MeasurementRow, detection: ChangeDetection) -> bool {
        let readings_equal = self.timestamp_secs == other.timestamp_secs
            && self.send_rate_bps == other.send_rate_bps
            && self.receive_rate_bps == other.receive_rate_bps;

        match detection {
            ChangeDetection::Readings => readings_equal,
            ChangeDetection::ReadingsAndLabel => readings_equal && self.label == other.label,
        }
    }
}

impl From<WireRow> for MeasurementRow {
    fn from((timestamp_secs, send_rate_bps, receive_rate_bps, label): WireRow) -> Self {
        Self {
            timestamp_secs,
            send_rate_bps,
            receive_rate_bps,
            label: label.unwrap_or_default(),
        }
    }
}

impl From<MeasurementRow> for WireRow {
    fn from(row: MeasurementRow) -> Self {
        (
            row.timestamp_secs,
            row.send_rate_bps,
            row.receive_rate_bps,
            Some(row.label),
        )
    }
}

/// Port of the iPerf3 server that produced the row at `index`.
pub fn port_for(index: usize) -> usize {
    BASE_PORT + index
}

/// Flag every row of `fresh` that differs from `prior` at the same index.
/// Rows beyond the end of `prior` are always flagged.
pub fn changed_rows(prior: &[MeasurementRow], fresh: &[MeasurementRow], detection: ChangeDetection) -> Vec<bool> {
    fresh
        .iter()
        .enumerate()
        .map(|(index, row)| match prior.get(index) {
            Some(previous) => !row.same_as(previous, detection),
            None => true,
        })
        .collect()
}
