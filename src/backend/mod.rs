pub mod client;

pub use client::{BackendClient, REQUEST_TIMEOUT_HEADER, USER_AGENT};
