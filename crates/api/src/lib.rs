pub mod client;
pub mod records;

pub use client::RecordClient;
pub use records::{BASE_URL, RecordType};
