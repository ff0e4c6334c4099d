//! Shatter Notify - 带粒子破碎效果的桌面通知动画引擎
//!
//! 核心是通知生命周期引擎（入口队列、动画状态机、粒子模拟、堆叠调度），
//! `cli` 和 `tui` 是脱离合成器运行时的宿主程序。

pub mod cli;
pub mod config;
pub mod notification;
pub mod tui;

pub use config::{ConfigError, EngineConfig};
pub use notification::{
    AnimationManager, CloseReason, DrawEntry, DrawList, IntakeError, IntakeEvent, IntakeHandle,
    IntakeQueue, NotificationId, NotificationRequest, Phase, ShowRequest, Urgency,
    WindowSuppressor,
};
