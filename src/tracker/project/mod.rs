//! 项目模块

pub mod dao;
pub mod models;
pub mod service;

pub use dao::{ProjectDao, ProjectStore};
pub use models::{Project, MAX_PROGRESS};
pub use service::ProjectRepository;
