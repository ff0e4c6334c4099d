//! 原生通知窗口屏蔽 - 与窗口隐藏协作方之间的接口
//!
//! 每个被接纳的通知恰好产生一次 `suppress` 和一次 `release`。

use tracing::info;

use super::animation::CloseReason;
use super::request::NotificationId;

/// 窗口屏蔽协作方 trait
pub trait WindowSuppressor: Send {
    /// 协作方名称（用于日志）
    fn name(&self) -> &str;

    /// 通知被接纳：隐藏守护进程的原生窗口
    fn suppress(&mut self, id: NotificationId);

    /// 通知已结束并被移除：释放屏蔽，附带关闭原因
    fn release(&mut self, id: NotificationId, reason: &CloseReason);
}

/// 默认实现：只记录日志
#[derive(Debug, Default)]
pub struct LogSuppressor;

impl WindowSuppressor for LogSuppressor {
    fn name(&self) -> &str {
        "log"
    }

    fn suppress(&mut self, id: NotificationId) {
        info!(id = %id, "Suppress native notification window");
    }

    fn release(&mut self, id: NotificationId, reason: &CloseReason) {
        info!(id = %id, reason = ?reason, "Release native notification window");
    }
}

/// 屏蔽信号（用于记录/回放）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressionSignal {
    Suppress(NotificationId),
    Release(NotificationId, CloseReason),
}

/// 把信号记录到共享列表里，方便宿主轮询或测试断言
#[derive(Debug, Clone, Default)]
pub struct RecordingSuppressor {
    signals: std::sync::Arc<std::sync::Mutex<Vec<SuppressionSignal>>>,
}

impl RecordingSuppressor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取走已记录的信号
    pub fn take(&self) -> Vec<SuppressionSignal> {
        match self.signals.lock() {
            Ok(mut signals) => std::mem::take(&mut *signals),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    fn record(&self, signal: SuppressionSignal) {
        match self.signals.lock() {
            Ok(mut signals) => signals.push(signal),
            Err(poisoned) => poisoned.into_inner().push(signal),
        }
    }
}

impl WindowSuppressor for RecordingSuppressor {
    fn name(&self) -> &str {
        "recording"
    }

    fn suppress(&mut self, id: NotificationId) {
        self.record(SuppressionSignal::Suppress(id));
    }

    fn release(&mut self, id: NotificationId, reason: &CloseReason) {
        self.record(SuppressionSignal::Release(id, reason.clone()));
    }
}
