//! 作业模块

pub mod dao;
pub mod models;
pub mod service;

pub use dao::{AssignmentDao, AssignmentStore};
pub use models::Assignment;
pub use service::AssignmentRepository;
