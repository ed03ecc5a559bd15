use chrono::NaiveDate;

/// Fold two samples of the same day into one.
pub trait Merge: Sized {
    #[must_use]
    fn merge(self, other: Self) -> Self;
}

/// Anything the normalizer can bucket by calendar day.
pub trait Sample: Merge {
    fn day(&self) -> NaiveDate;
}

/// Sentinel for metadata that differs between merged samples.
pub const MULTIPLE: &str = "multiple";

/// Keep the label when both sides agree, otherwise mark it as [`MULTIPLE`].
pub fn merge_labels(lhs: String, rhs: String) -> String {
    if lhs == rhs { lhs } else { MULTIPLE.to_owned() }
}
