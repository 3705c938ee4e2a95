pub mod tracker;

// 重新导出常用类型，方便外部使用
pub use tracker::{
    client::{ClientConfig, TrackerClient},
    repository::SyncRepository,
    types::{ItemKind, TrackedItem},
};
