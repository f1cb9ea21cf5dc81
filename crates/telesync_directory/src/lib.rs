//! telesync_directory — read side of the roster: where categories and channels come from.
//!
//! ## Architecture
//!
//! ```text
//!   RuntimeBridge (messaging side)
//!          │  SnapshotRequest + oneshot reply
//!          ▼
//!   ┌──────────────────────────────┐
//!   │ DirectoryClient (own runtime) │── periodic sync ──▶ dyn DirectorySource
//!   │   SnapshotCache               │                      ├─ DiscordDirectory
//!   └──────────────────────────────┘                      └─ StaticDirectory
//! ```
//!
//! The client owns the cache; other runtimes only ever see snapshots handed
//! back through a request's reply channel.

pub mod client;
pub mod discord;
pub mod source;

pub use client::{ClientConfig, DirectoryClient, SnapshotCache, SnapshotReply, SnapshotRequest};
pub use discord::{DiscordConfig, DiscordDirectory};
pub use source::{DirectorySource, StaticDirectory};
