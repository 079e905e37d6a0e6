pub mod client;
pub mod models;

pub use client::{AdvisorApi, ApiClient};
pub use models::{
    CreateSessionResponse, ScrapeResponse, SendMessageResponse, SessionSnapshot, SnapshotMessage,
};
