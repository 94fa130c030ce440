//! Records decoded from chat-completion replies.
//!
//! Deserialization expects keys already normalized by [`crate::decode`]
//! (lower-case, separators removed). Serialization uses snake_case, and
//! snake_case keys are accepted back as aliases.

use serde::{Deserialize, Deserializer, Serialize};

// ── SQL generation ────────────────────────────────────────────────

/// The model's answer to "write SQL for this question".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SqlResponse {
    /// The part of the schema the model considered relevant.
    pub schema: String,
    /// Whether (and how) the data can answer the question.
    pub applicability: String,
    /// The generated query. Empty when the model declined.
    pub sql: String,
    /// What data would be needed if the question can't be answered.
    #[serde(rename(deserialize = "missingdata"), alias = "missing_data")]
    pub missing_data: String,
}

impl SqlResponse {
    /// True when the model produced a non-blank query.
    pub fn has_query(&self) -> bool {
        !self.sql.trim().is_empty()
    }
}

// ── Chart selection ───────────────────────────────────────────────

/// The model's choice of chart for a data table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartSelectResponse {
    pub chart: String,
    pub title: String,
    pub data: Vec<DataEntry>,
    #[serde(rename(deserialize = "valueiscurrency"), alias = "value_is_currency")]
    pub value_is_currency: bool,
}

impl ChartSelectResponse {
    /// Classify the free-text `chart` field.
    pub fn chart_type(&self) -> ChartType {
        ChartType::from_name(&self.chart)
    }
}

/// One labelled value in a chart series.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataEntry {
    pub name: String,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub value: f64,
}

/// Chart kinds the renderer knows how to draw.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Unknown,
    Bar,
    Line,
    Pie,
    Scatter,
}

impl ChartType {
    /// Case-insensitive match on the chart name. Unrecognized names map to `Unknown`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "bar" => Self::Bar,
            "line" => Self::Line,
            "pie" => Self::Pie,
            "scatter" => Self::Scatter,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
            Self::Scatter => "scatter",
        };
        f.write_str(s)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Models sometimes quote numbers, occasionally with currency formatting.
/// `null` reads as zero.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(NumberOrString::Number(n)) => Ok(n),
        Some(NumberOrString::Text(s)) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !matches!(c, '$' | ','))
                .collect();
            cleaned
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("not a number: {s:?}")))
        }
    }
}
