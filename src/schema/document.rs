//! Event-log document model
//!
//! Typed view of the per-participant JSON export of an XDF recording. A
//! document holds named streams; marker streams carry one text token per
//! sample. Only the fields this crate needs are modelled, unknown fields are
//! ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ReconcileError;

/// Stream carrying the `condition_advance|...` latency markers
pub const LATENCY_STREAM: &str = "LatencyMarkers";

/// Stream carrying the box-and-block task markers
pub const EXPERIMENT_STREAM: &str = "ExpMarkers";

/// A parsed event-log document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLogDocument {
    pub streams: Vec<Stream>,
}

/// One recorded stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stream {
    pub info: StreamInfo,
    /// One sample per entry; for marker streams a sample is an array whose
    /// first slot is the token. Other streams are kept as recorded.
    #[serde(default)]
    pub time_series: Vec<Value>,
    #[serde(default)]
    pub time_stamps: Vec<Value>,
}

/// Stream metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamInfo {
    #[serde(deserialize_with = "text_or_singleton")]
    pub name: String,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "optional_text_or_singleton",
        skip_serializing_if = "Option::is_none"
    )]
    pub stream_type: Option<String>,
}

/// A single marker: its text token and, when recorded, its timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub token: String,
    pub timestamp: Option<f64>,
}

impl Marker {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            timestamp: None,
        }
    }
}

/// A validated marker stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStream {
    pub name: String,
    pub markers: Vec<Marker>,
}

impl MarkerStream {
    /// Build a stream from bare tokens (no timestamps)
    pub fn from_tokens<I, S>(name: &str, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            markers: tokens.into_iter().map(Marker::new).collect(),
        }
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(|m| m.token.as_str())
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl EventLogDocument {
    /// Parse a document from JSON, attributing failures to `participant`
    pub fn from_json(json: &str, participant: u32) -> Result<Self, ReconcileError> {
        serde_json::from_str(json).map_err(|e| ReconcileError::DocumentParseError {
            participant,
            message: e.to_string(),
        })
    }

    /// First stream with the given name. Later streams with the same name are
    /// never consulted.
    pub fn find_stream(&self, name: &str) -> Option<&Stream> {
        self.streams.iter().find(|s| s.info.name == name)
    }

    /// Number of streams sharing `name`
    pub fn stream_count(&self, name: &str) -> usize {
        self.streams.iter().filter(|s| s.info.name == name).count()
    }

    /// Resolve a required marker stream.
    ///
    /// Fails with `MissingStream` when no stream has that name and with
    /// `DocumentParseError` when a sample does not start with a text token.
    pub fn marker_stream(
        &self,
        name: &str,
        participant: u32,
    ) -> Result<MarkerStream, ReconcileError> {
        let stream = self
            .find_stream(name)
            .ok_or_else(|| ReconcileError::MissingStream {
                participant,
                stream: name.to_string(),
            })?;

        self.log_duplicates(name, participant);
        stream.to_marker_stream(participant)
    }

    /// Resolve the latency and experiment streams together.
    ///
    /// Both streams are validated before either is reported missing, so a
    /// malformed marker fails with `DocumentParseError` even when the other
    /// stream is absent.
    pub fn required_marker_streams(
        &self,
        participant: u32,
    ) -> Result<(MarkerStream, MarkerStream), ReconcileError> {
        let latency = self.present_marker_stream(LATENCY_STREAM, participant)?;
        let experiment = self.present_marker_stream(EXPERIMENT_STREAM, participant)?;

        let missing = |stream: &str| ReconcileError::MissingStream {
            participant,
            stream: stream.to_string(),
        };
        Ok((
            latency.ok_or_else(|| missing(LATENCY_STREAM))?,
            experiment.ok_or_else(|| missing(EXPERIMENT_STREAM))?,
        ))
    }

    /// Validated marker stream, or `None` when no stream has that name
    fn present_marker_stream(
        &self,
        name: &str,
        participant: u32,
    ) -> Result<Option<MarkerStream>, ReconcileError> {
        self.log_duplicates(name, participant);
        self.find_stream(name)
            .map(|stream| stream.to_marker_stream(participant))
            .transpose()
    }

    fn log_duplicates(&self, name: &str, participant: u32) {
        let duplicates = self.stream_count(name).saturating_sub(1);
        if duplicates > 0 {
            tracing::debug!(participant, stream = name, duplicates, "ignoring duplicate streams");
        }
    }
}

impl Stream {
    fn to_marker_stream(&self, participant: u32) -> Result<MarkerStream, ReconcileError> {
        let mut markers = Vec::with_capacity(self.time_series.len());

        for (index, sample) in self.time_series.iter().enumerate() {
            let token = sample
                .as_array()
                .and_then(|values| values.first())
                .and_then(Value::as_str)
                .ok_or_else(|| ReconcileError::DocumentParseError {
                    participant,
                    message: format!(
                        "stream `{}` sample {} does not start with a text token",
                        self.info.name, index
                    ),
                })?;

            markers.push(Marker {
                token: token.to_string(),
                timestamp: self.time_stamps.get(index).and_then(Value::as_f64),
            });
        }

        Ok(MarkerStream {
            name: self.info.name.clone(),
            markers,
        })
    }
}

/// XDF exporters write info fields either as `"x"` or as `["x"]`
#[derive(Deserialize)]
#[serde(untagged)]
enum InfoText {
    Plain(String),
    Wrapped(Vec<String>),
}

impl InfoText {
    fn into_text(self) -> Option<String> {
        match self {
            InfoText::Plain(s) => Some(s),
            InfoText::Wrapped(v) if v.len() == 1 => v.into_iter().next(),
            InfoText::Wrapped(_) => None,
        }
    }
}

fn text_or_singleton<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    InfoText::deserialize(deserializer)?
        .into_text()
        .ok_or_else(|| serde::de::Error::custom("expected a string or a single-element string array"))
}

fn optional_text_or_singleton<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<InfoText>::deserialize(deserializer)?.and_then(InfoText::into_text))
}
