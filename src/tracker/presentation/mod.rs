//! 表现层状态：把仓库的响应式字段投影为界面可直接渲染的三态

pub mod dashboard;
pub mod detail;
pub mod list;
pub mod scope;
pub mod state;

pub use dashboard::{DashboardStateHolder, DashboardView};
pub use detail::DetailStateHolder;
pub use list::ListStateHolder;
pub use scope::ViewScope;
pub use state::{project_state, UiState};
