//! 学习任务跟踪：作业、考试、项目三类条目的本地优先同步

pub mod app_config;
pub mod assignment;
pub mod client;
pub mod db;
pub mod exam;
pub mod presentation;
pub mod project;
pub mod remote;
pub mod repository;
pub mod sheets;
pub mod state;
pub mod store;
pub mod types;
pub mod usecase;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{ClientConfig, TrackerClient};
pub use repository::SyncRepository;
pub use types::{ItemKind, TrackedItem};
