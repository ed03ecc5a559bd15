use serde::Deserialize;

/// Aggregation interval reported by the upstream along with the data.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[display("hour")]
    Hour,

    #[display("day")]
    Day,

    #[display("month")]
    Month,

    #[display("year")]
    Year,

    /// Anything else, kept verbatim for the error message.
    #[serde(untagged)]
    #[display("{_0}")]
    Other(String),
}
