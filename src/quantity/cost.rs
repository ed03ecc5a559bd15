//! Cost as reported by the tariff configured in Shelly Cloud.
//!
//! The currency is whatever the account is set up with, so no symbol is attached.

quantity!(Cost);

impl ::std::fmt::Display for Cost {
    fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        write!(formatter, "{:.2}", self.0)
    }
}

impl ::std::fmt::Debug for Cost {
    fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        write!(formatter, "{:.4}", self.0)
    }
}
