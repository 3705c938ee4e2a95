//! Google Sheets 配置模块

pub mod dao;
pub mod models;
pub mod service;

pub use dao::AppConfigDao;
pub use models::AppConfig;
pub use service::AppConfigRepository;
