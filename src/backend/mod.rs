pub use client::{BackendClient, REQUEST_ID_HEADER};
pub use envelope::{normalize, BackendEnvelope, Operation, RawResponse};

mod client;
mod envelope;
