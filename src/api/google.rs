mod auth;
mod sheets;

pub use self::{auth::ServiceAccountKey, sheets::Sheets};
