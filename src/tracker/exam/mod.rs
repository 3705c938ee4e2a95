//! 考试模块（仅使用通用同步仓库的操作）

pub mod dao;
pub mod models;

pub use dao::ExamDao;
pub use models::Exam;

pub type ExamRepository = crate::tracker::repository::SyncRepository<Exam>;
