//! 动画管理器 - 渲染线程上唯一的写者
//!
//! 每个渲染 tick 调用一次 `tick(dt)`：
//! 1. 取走入口队列中的事件（先处理 Close/ActionInvoked，再处理 Show）
//! 2. 执行 N_max 限制（驱逐最旧的非 CRITICAL 展示中通知，或延后接纳）
//! 3. 重新分配堆叠槽位
//! 4. 推进每个通知的状态机和粒子池
//! 5. 移除已结束的通知（释放原生窗口屏蔽）
//! 6. 生成绘制列表快照
//!
//! 管理器不做校验，也不加锁；只有入口队列是跨线程的。

use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::animation::{AnimationContext, CloseReason, LiveNotification, Phase};
use super::draw::{DrawEntry, DrawList};
use super::geometry::StackLayout;
use super::intake::{IntakeEvent, IntakeQueue};
use super::request::{NotificationId, NotificationRequest};
use super::suppress::{LogSuppressor, WindowSuppressor};
use crate::config::EngineConfig;

/// 动画管理器
pub struct AnimationManager {
    config: EngineConfig,
    layout: StackLayout,
    queue: IntakeQueue,
    /// 在场通知，按创建顺序排列
    live: Vec<LiveNotification>,
    /// 等待空槽位的请求（FIFO）
    pending: VecDeque<NotificationRequest>,
    suppressor: Box<dyn WindowSuppressor>,
    /// 单调虚拟时钟（tick 间隔之和）
    clock: Duration,
    next_seq: u64,
}

impl AnimationManager {
    /// 创建管理器（默认使用日志屏蔽器）
    pub fn new(config: EngineConfig, queue: IntakeQueue) -> Self {
        if let Err(e) = config.validate() {
            warn!(error = %e, "Engine config failed validation, ranges will be clamped");
        }
        let layout = config.layout();
        Self {
            config,
            layout,
            queue,
            live: Vec::new(),
            pending: VecDeque::new(),
            suppressor: Box::new(LogSuppressor),
            clock: Duration::ZERO,
            next_seq: 0,
        }
    }

    /// 设置窗口屏蔽协作方
    pub fn with_suppressor(mut self, suppressor: Box<dyn WindowSuppressor>) -> Self {
        self.suppressor = suppressor;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// 推进一个渲染 tick，返回本帧的绘制列表
    pub fn tick(&mut self, dt: Duration) -> DrawList {
        let events = self.queue.drain();
        if !events.is_empty() {
            self.apply_events(events);
        }
        if !self.pending.is_empty() {
            self.admit_pending();
        }

        self.clock += dt;
        self.assign_slots();
        self.advance_all(dt);
        self.remove_finished();
        self.snapshot()
    }

    /// 占用槽位的通知数量（不含正在滑出的）
    pub fn live_count(&self) -> usize {
        self.live.iter().filter(|n| n.phase().occupies_slot()).count()
    }

    /// 在场通知总数（含正在滑出的）
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// 等待接纳的请求数量
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// 没有在场通知也没有等待中的请求
    pub fn is_idle(&self) -> bool {
        self.live.is_empty() && self.pending.is_empty()
    }

    pub fn phase_of(&self, id: NotificationId) -> Option<Phase> {
        self.get(id).map(LiveNotification::phase)
    }

    pub fn get(&self, id: NotificationId) -> Option<&LiveNotification> {
        self.live.iter().find(|n| n.id() == id)
    }

    /// 在场通知（按堆叠顺序）
    pub fn iter(&self) -> impl Iterator<Item = &LiveNotification> {
        self.live.iter()
    }

    /// 宿主退出时调用：释放所有仍在屏蔽中的窗口
    pub fn release_all(&mut self) {
        for n in self.live.drain(..) {
            let reason = n.close_reason().cloned().unwrap_or(CloseReason::Closed);
            self.suppressor.release(n.id(), &reason);
        }
        self.pending.clear();
    }

    /// 应用本 tick 取到的事件：Close/ActionInvoked 先于 Show
    fn apply_events(&mut self, events: Vec<IntakeEvent>) {
        let mut shows = Vec::new();
        for event in events {
            match event {
                IntakeEvent::Show(request) => shows.push(request),
                IntakeEvent::Close(id) => self.close(id, CloseReason::Closed),
                IntakeEvent::ActionInvoked(id, key) => {
                    debug!(id = %id, action = %key, "Action invoked");
                    self.close(id, CloseReason::Dismissed(key));
                }
            }
        }
        for request in shows {
            self.accept_show(request);
        }
    }

    /// 关闭通知；未知 ID 静默忽略
    ///
    /// 在场的实例和等待中的重新显示请求可能同时存在，两者都要处理。
    fn close(&mut self, id: NotificationId, reason: CloseReason) {
        let now = self.clock;
        let mut known = false;

        if let Some(n) = self.live.iter_mut().find(|n| n.id() == id) {
            known = true;
            if !n.force_exit(now, reason) {
                debug!(id = %id, phase = ?n.phase(), "Close ignored, already leaving");
            }
        }

        if let Some(pos) = self.pending.iter().position(|r| r.id == id) {
            known = true;
            self.pending.remove(pos);
            debug!(id = %id, "Closed while waiting for a slot");
        }

        if !known {
            debug!(id = %id, "Close for unknown notification ignored");
        }
    }

    fn accept_show(&mut self, request: NotificationRequest) {
        let id = request.id;
        let timing = self.config.urgency.timing(request.urgency);

        if let Some(pos) = self.live.iter().position(|n| n.id() == id) {
            if self.live[pos].phase().occupies_slot() {
                debug!(id = %id, "Refreshing content in place");
                self.live[pos].refresh(request, timing);
                return;
            }
            // 正在滑出：没有更早的等待请求且能腾出槽位时立即重启，否则排队
            if self.pending.is_empty() && self.make_room() {
                info!(id = %id, "Re-shown while leaving, restarting");
                self.live[pos].restart(request, timing, self.clock);
                return;
            }
        }

        if let Some(waiting) = self.pending.iter_mut().find(|r| r.id == id) {
            debug!(id = %id, "Refreshing pending request");
            *waiting = request;
            return;
        }

        self.pending.push_back(request);
    }

    /// 按 FIFO 接纳等待中的请求，直到没有空槽位
    fn admit_pending(&mut self) {
        while !self.pending.is_empty() {
            if !self.make_room() {
                break;
            }
            if let Some(request) = self.pending.pop_front() {
                self.admit(request);
            }
        }

        if !self.pending.is_empty() {
            debug!(
                pending = self.pending.len(),
                live = self.live_count(),
                "Admission deferred, no evictable slot"
            );
        }

        while self.pending.len() > self.config.max_pending {
            if let Some(dropped) = self.pending.pop_front() {
                warn!(
                    id = %dropped.id,
                    "Pending queue full, dropping oldest deferred notification"
                );
            }
        }
    }

    /// 确保有一个空槽位；必要时驱逐最旧的非 CRITICAL 展示中通知
    fn make_room(&mut self) -> bool {
        if self.live_count() < self.config.max_live {
            return true;
        }

        let now = self.clock;
        let victim = self
            .live
            .iter_mut()
            .find(|n| n.phase() == Phase::Showing && n.request().urgency.is_evictable());
        match victim {
            Some(n) => {
                info!(id = %n.id(), "Evicting oldest showing notification to make room");
                n.force_exit(now, CloseReason::Evicted)
            }
            None => false,
        }
    }

    fn admit(&mut self, request: NotificationRequest) {
        let id = request.id;
        let timing = self.config.urgency.timing(request.urgency);

        // 同 ID 仍在滑出：沿用原来的堆叠顺序和屏蔽
        if let Some(existing) = self.live.iter_mut().find(|n| n.id() == id) {
            existing.restart(request, timing, self.clock);
            return;
        }

        info!(id = %id, urgency = %request.urgency, "Admitting notification");
        let n = LiveNotification::new(
            request,
            timing,
            self.next_seq,
            self.clock,
            self.config.particle_capacity,
            self.config.rng_seed,
        );
        self.next_seq += 1;
        self.suppressor.suppress(id);
        self.live.push(n);
    }

    fn assign_slots(&mut self) {
        for (slot, n) in self
            .live
            .iter_mut()
            .filter(|n| n.phase() != Phase::Finished)
            .enumerate()
        {
            n.set_slot(slot);
        }
    }

    fn advance_all(&mut self, dt: Duration) {
        let ctx = AnimationContext {
            layout: &self.layout,
            emitter: &self.config.particles,
            shake_magnitude: self.config.shake_magnitude,
        };
        let now = self.clock;
        for n in &mut self.live {
            n.advance(now, dt, &ctx);
        }
    }

    fn remove_finished(&mut self) {
        let suppressor = &mut self.suppressor;
        self.live.retain(|n| {
            if n.phase() != Phase::Finished {
                return true;
            }
            let reason = n.close_reason().cloned().unwrap_or(CloseReason::Expired);
            debug!(id = %n.id(), reason = ?reason, "Notification finished");
            suppressor.release(n.id(), &reason);
            false
        });
    }

    fn snapshot(&self) -> DrawList {
        DrawList {
            clock_ms: self.clock.as_millis() as u64,
            entries: self.live.iter().map(DrawEntry::capture).collect(),
        }
    }
}
