//! Synchronization with the remote work authority

mod client;
pub mod wire;

pub use client::{SyncClient, WorkAuthority};

#[cfg(test)]
pub(crate) use client::MockWorkAuthority;
