//! # bcast-core
//!
//! Core types and traits for the broadcast bot: [`BroadcastTransport`], [`SubscriberDirectory`],
//! [`JobStore`], draft/job/report types, and tracing initialization. Transport- and
//! storage-agnostic; implemented by the storage and broadcast-bot crates.

pub mod directory;
pub mod error;
pub mod jobs;
pub mod logger;
pub mod transport;
pub mod types;

pub use directory::SubscriberDirectory;
pub use error::{BcastError, Result};
pub use jobs::JobStore;
pub use logger::init_tracing;
pub use transport::{BroadcastTransport, Membership, SendError};
pub use types::{
    BroadcastDraft, Button, ContentRef, DispatchMode, DispatchReport, ScheduledJob, Subscriber,
};
