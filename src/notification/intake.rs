//! 通知入口队列 - 异步生产者与渲染线程之间唯一的跨线程边界
//!
//! 生产者（通知协议适配层）持有 `IntakeHandle`，可在任意线程/任务中调用，
//! 从不阻塞；消费者（`AnimationManager`）持有 `IntakeQueue`，每个渲染 tick
//! 调用一次 `drain` 取走自上次以来的全部事件，顺序与到达顺序一致。

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::debug;

use super::request::{IntakeError, NotificationId, NotificationRequest, ShowRequest};

/// 入口事件
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeEvent {
    /// 显示（或替换）通知
    Show(NotificationRequest),
    /// 关闭通知
    Close(NotificationId),
    /// 用户触发了通知上的动作
    ActionInvoked(NotificationId, String),
}

impl IntakeEvent {
    pub fn id(&self) -> NotificationId {
        match self {
            IntakeEvent::Show(req) => req.id,
            IntakeEvent::Close(id) | IntakeEvent::ActionInvoked(id, _) => *id,
        }
    }
}

/// 创建一对生产者/消费者
pub fn channel() -> (IntakeHandle, IntakeQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = IntakeHandle {
        tx,
        next_id: Arc::new(AtomicU32::new(1)),
    };
    (handle, IntakeQueue { rx })
}

/// 生产者句柄（可 Clone，可跨线程）
#[derive(Debug, Clone)]
pub struct IntakeHandle {
    tx: mpsc::UnboundedSender<IntakeEvent>,
    next_id: Arc<AtomicU32>,
}

impl IntakeHandle {
    /// 推送事件（不阻塞）；外部生产者只能经由 submit/close/invoke_action
    pub(crate) fn push(&self, event: IntakeEvent) -> Result<(), IntakeError> {
        self.tx.send(event).map_err(|_| IntakeError::Disconnected)
    }

    /// 校验并提交通知，返回最终分配的 ID
    ///
    /// 调用方指定了非 0 的 id 时沿用（替换语义），否则生成新 ID。
    pub fn submit(&self, request: ShowRequest) -> Result<NotificationId, IntakeError> {
        let id = if request.id != 0 {
            NotificationId(request.id)
        } else {
            self.generate_id()
        };

        let request = request.validate(id)?;
        debug!(id = %id, urgency = %request.urgency, "Notification submitted");
        self.push(IntakeEvent::Show(request))?;
        Ok(id)
    }

    /// 请求关闭通知（未知 ID 在管理器侧静默忽略）
    pub fn close(&self, id: NotificationId) -> Result<(), IntakeError> {
        self.push(IntakeEvent::Close(id))
    }

    /// 上报用户触发的动作
    pub fn invoke_action(
        &self,
        id: NotificationId,
        key: impl Into<String>,
    ) -> Result<(), IntakeError> {
        self.push(IntakeEvent::ActionInvoked(id, key.into()))
    }

    /// 消费者是否已经退出
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// 生成新 ID（跳过 0，0 在协议中表示"未指定"）
    fn generate_id(&self) -> NotificationId {
        loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if id != 0 {
                return NotificationId(id);
            }
        }
    }
}

/// 消费者端（只由渲染 tick 访问）
#[derive(Debug)]
pub struct IntakeQueue {
    rx: mpsc::UnboundedReceiver<IntakeEvent>,
}

impl IntakeQueue {
    /// 取走全部待处理事件（非阻塞，保持到达顺序）
    pub fn drain(&mut self) -> Vec<IntakeEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::urgency::Urgency;

    #[test]
    fn test_drain_preserves_arrival_order() {
        let (handle, mut queue) = channel();
        let a = handle.submit(ShowRequest::new("a", Urgency::Normal)).unwrap();
        handle.close(a).unwrap();
        handle.invoke_action(a, "dismiss").unwrap();

        let events = queue.drain();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], IntakeEvent::Show(_)));
        assert_eq!(events[1], IntakeEvent::Close(a));
        assert_eq!(events[2], IntakeEvent::ActionInvoked(a, "dismiss".to_string()));

        // 取走之后队列为空
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_generated_ids_are_unique_and_non_zero() {
        let (handle, _queue) = channel();
        let first = handle.submit(ShowRequest::new("a", Urgency::Low)).unwrap();
        let second = handle.submit(ShowRequest::new("b", Urgency::Low)).unwrap();
        assert_ne!(first, second);
        assert_ne!(first.0, 0);
        assert_ne!(second.0, 0);
    }

    #[test]
    fn test_generator_skips_zero_on_wrap() {
        let (handle, _queue) = channel();
        handle.next_id.store(u32::MAX, Ordering::Relaxed);
        assert_eq!(handle.generate_id(), NotificationId(u32::MAX));
        assert_eq!(handle.generate_id(), NotificationId(1));
    }

    #[test]
    fn test_every_queued_show_is_validated() {
        let (handle, mut queue) = channel();
        handle.submit(ShowRequest::new("ok", Urgency::Low)).unwrap();
        assert!(handle.submit(ShowRequest::new("  ", Urgency::Low)).is_err());
        handle
            .submit(ShowRequest::new("with id", Urgency::Critical).with_id(9))
            .unwrap();

        let events = queue.drain();
        assert_eq!(events.len(), 2);
        for event in events {
            let IntakeEvent::Show(request) = event else {
                panic!("only shows were submitted");
            };
            assert_ne!(request.id.0, 0);
            assert!(!request.summary.trim().is_empty());
        }
    }

    #[test]
    fn test_caller_id_is_kept() {
        let (handle, mut queue) = channel();
        let id = handle
            .submit(ShowRequest::new("a", Urgency::Normal).with_id(42))
            .unwrap();
        assert_eq!(id, NotificationId(42));
        assert_eq!(queue.drain()[0].id(), NotificationId(42));
    }

    #[test]
    fn test_malformed_request_never_reaches_queue() {
        let (handle, mut queue) = channel();
        let err = handle.submit(ShowRequest::new("", Urgency::Normal)).unwrap_err();
        assert_eq!(err, IntakeError::EmptySummary);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_push_after_consumer_dropped() {
        let (handle, queue) = channel();
        drop(queue);
        assert!(handle.is_closed());
        assert_eq!(
            handle.close(NotificationId(1)).unwrap_err(),
            IntakeError::Disconnected
        );
    }

    #[test]
    fn test_concurrent_producers_lose_nothing() {
        let (handle, mut queue) = channel();
        let threads: Vec<_> = (0..4)
            .map(|t| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        handle
                            .submit(ShowRequest::new(format!("{t}-{i}"), Urgency::Low))
                            .unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let events = queue.drain();
        assert_eq!(events.len(), 200);
        let mut ids: Vec<_> = events.iter().map(IntakeEvent::id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }
}
