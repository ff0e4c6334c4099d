//! 通知生命周期引擎
//!
//! # 数据流
//! 入口事件 → `IntakeQueue` → `AnimationManager`（每个 tick 取一次）
//! → 创建/更新 `LiveNotification` → 推进各自的 `ParticlePool`
//! → 生成有序的 `DrawList` → 外部渲染器绘制
//!
//! # 使用示例
//! ```
//! use shatter_notify::notification::{intake, AnimationManager, ShowRequest, Urgency};
//! use shatter_notify::EngineConfig;
//! use std::time::Duration;
//!
//! let (handle, queue) = intake::channel();
//! let mut manager = AnimationManager::new(EngineConfig::default(), queue);
//!
//! let id = handle.submit(ShowRequest::new("Build finished", Urgency::Normal)).unwrap();
//! let frame = manager.tick(Duration::from_millis(16));
//! assert_eq!(frame.entries[0].id, id);
//! ```

pub mod animation;
pub mod draw;
pub mod easing;
pub mod geometry;
pub mod intake;
pub mod manager;
pub mod particle;
pub mod request;
pub mod suppress;
pub mod urgency;

pub use animation::{CloseReason, LiveNotification, Phase};
pub use draw::{DrawEntry, DrawList, ParticleSprite};
pub use geometry::{CardSize, MonitorGeometry, StackLayout, Vec2};
pub use intake::{IntakeEvent, IntakeHandle, IntakeQueue};
pub use manager::AnimationManager;
pub use particle::{EmitterConfig, Particle, ParticlePool};
pub use request::{Action, Expiry, IntakeError, NotificationId, NotificationRequest, ShowRequest};
pub use suppress::{LogSuppressor, RecordingSuppressor, SuppressionSignal, WindowSuppressor};
pub use urgency::{Urgency, UrgencyTable, UrgencyTiming};
