use shatter_notify::notification::{
    intake, AnimationManager, CloseReason, DrawList, IntakeHandle, NotificationId, Phase,
    ShowRequest, Urgency, Vec2,
};
use shatter_notify::EngineConfig;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(16);

fn engine(config: EngineConfig) -> (IntakeHandle, AnimationManager) {
    let (handle, queue) = intake::channel();
    (handle, AnimationManager::new(config, queue))
}

fn ticks(manager: &mut AnimationManager, n: u32) -> DrawList {
    let mut list = DrawList::default();
    for _ in 0..n {
        list = manager.tick(TICK);
    }
    list
}

#[test]
fn test_normal_notification_comes_to_rest() {
    let config = EngineConfig::default();
    let rest = config.layout().rest_position(0);
    let (handle, mut manager) = engine(config);

    let id = handle
        .submit(ShowRequest::new("Build finished", Urgency::Normal))
        .unwrap();

    // 400ms 滑入 + 350ms 破碎之后
    let list = ticks(&mut manager, 50);
    let entry = list.get(id).unwrap();
    assert_eq!(entry.phase, Phase::Showing);
    assert!((entry.opacity - 1.0).abs() < 1e-6);
    assert_eq!(entry.position, rest);
    assert_eq!(entry.shake, Vec2::ZERO);
}

#[test]
fn test_full_lifecycle_of_low_notification() {
    let (handle, mut manager) = engine(EngineConfig::default());
    let id = handle
        .submit(ShowRequest::new("low", Urgency::Low).with_expire_timeout_ms(1000))
        .unwrap();

    let mut seen = Vec::new();
    for _ in 0..200 {
        let list = manager.tick(TICK);
        match list.get(id) {
            Some(entry) if seen.last() != Some(&entry.phase) => seen.push(entry.phase),
            Some(_) => {}
            None if !seen.is_empty() => break,
            None => {}
        }
    }

    assert_eq!(
        seen,
        vec![Phase::SlidingIn, Phase::Breaking, Phase::Showing, Phase::SlidingOut]
    );
    assert!(manager.is_idle());
    // 250 + 200 + 1000 + 250 ms
    assert!(manager.clock() >= Duration::from_millis(1700));
    assert!(manager.clock() < Duration::from_millis(1750));
}

#[test]
fn test_six_notifications_with_five_slots() {
    let (handle, mut manager) = engine(EngineConfig::default());
    for id in 1..=6 {
        handle
            .submit(ShowRequest::new(format!("n{id}"), Urgency::Normal).with_id(id))
            .unwrap();
    }

    let mut sixth_admitted = false;
    for _ in 0..120 {
        let list = manager.tick(TICK);
        assert!(manager.live_count() <= 5);
        let occupying = list.iter().filter(|e| e.phase.occupies_slot()).count();
        assert!(occupying <= 5);
        if list.get(NotificationId(6)).is_some() && !sixth_admitted {
            sixth_admitted = true;
            // 为了腾出位置，最早显示的那条被挤出
            let first = manager.get(NotificationId(1)).unwrap();
            assert_eq!(first.phase(), Phase::SlidingOut);
            assert_eq!(first.close_reason(), Some(&CloseReason::Evicted));
        }
    }
    assert!(sixth_admitted);
}

#[test]
fn test_critical_without_timeout_holds() {
    let (handle, mut manager) = engine(EngineConfig::default());
    let id = handle
        .submit(ShowRequest::new("Battery low", Urgency::Critical).with_expire_timeout_ms(0))
        .unwrap();

    // 一分钟后依然在显示
    let list = ticks(&mut manager, 3750);
    assert_eq!(list.get(id).map(|e| e.phase), Some(Phase::Showing));

    handle.close(id).unwrap();
    let list = manager.tick(TICK);
    assert_eq!(list.get(id).map(|e| e.phase), Some(Phase::SlidingOut));
}

#[test]
fn test_action_during_slide_in_exits_from_current_position() {
    let (handle, mut manager) = engine(EngineConfig::default());
    let id = handle
        .submit(
            ShowRequest::new("Update ready", Urgency::Normal).with_action("default", "Install"),
        )
        .unwrap();

    let list = ticks(&mut manager, 10);
    let before = list.get(id).unwrap().clone();
    assert_eq!(before.phase, Phase::SlidingIn);

    handle.invoke_action(id, "default").unwrap();
    let list = manager.tick(TICK);
    let after = list.get(id).unwrap();

    assert_eq!(after.phase, Phase::SlidingOut);
    // 从当前位置开始向左，不会跳回静止位置
    assert!(after.position.x <= before.position.x);
    assert!(before.position.x - after.position.x < 1.0);
    assert!(after.opacity < before.opacity);
    assert_eq!(
        manager.get(id).and_then(|n| n.close_reason().cloned()),
        Some(CloseReason::Dismissed("default".to_string()))
    );
    // 滑入被打断，没有破碎效果
    assert!(after.particles.is_empty());
}

#[test]
fn test_break_emits_particles() {
    let (handle, mut manager) = engine(EngineConfig::default());
    let id = handle.submit(ShowRequest::new("boom", Urgency::Normal)).unwrap();

    // 刚进入破碎阶段
    let list = ticks(&mut manager, 27);
    let entry = list.get(id).unwrap();
    assert_eq!(entry.phase, Phase::Breaking);
    assert!(!entry.particles.is_empty());
    assert!(entry.particles.iter().all(|p| p.alpha > 0.0 && p.alpha <= 1.0));
}

#[test]
fn test_rejected_requests_never_reach_manager() {
    let (handle, mut manager) = engine(EngineConfig::default());
    assert!(handle.submit(ShowRequest::new("", Urgency::Normal)).is_err());
    assert!(handle
        .submit(ShowRequest::new("x", Urgency::Normal).with_expire_timeout_ms(-5))
        .is_err());

    let list = manager.tick(TICK);
    assert!(list.is_empty());
    assert_eq!(manager.pending_count(), 0);
}

#[test]
fn test_producer_on_another_thread() {
    let (handle, mut manager) = engine(EngineConfig::default());
    let producer = {
        let handle = handle.clone();
        std::thread::spawn(move || {
            for i in 0..3 {
                handle
                    .submit(ShowRequest::new(format!("remote {i}"), Urgency::Low))
                    .unwrap();
            }
        })
    };
    producer.join().unwrap();

    let list = manager.tick(TICK);
    assert_eq!(list.len(), 3);
}
