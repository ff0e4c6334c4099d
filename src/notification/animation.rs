//! Per-notification animation state machine.
//!
//! Phases run strictly forward:
//! `SlidingIn -> Breaking -> Showing -> SlidingOut -> Finished`.
//! The only shortcut is `force_exit`, which jumps from any of the first three
//! phases straight to `SlidingOut` starting from wherever the card is now.
//!
//! Phase boundaries are exact: the next phase is stamped with
//! `entered_at + duration` rather than the tick time, so a long tick may
//! cascade through several single-step transitions without drifting.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::f32::consts::TAU;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::easing::Easing;
use super::geometry::{StackLayout, Vec2};
use super::particle::{EmitterConfig, ParticlePool};
use super::request::{Expiry, NotificationId, NotificationRequest};
use super::urgency::UrgencyTiming;

/// Shake oscillation frequency during the break
const SHAKE_HZ: f32 = 24.0;

/// Externally visible animation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    SlidingIn,
    Breaking,
    Showing,
    SlidingOut,
    Finished,
}

impl Phase {
    /// Successor in the fixed phase order (`Finished` is terminal)
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::SlidingIn => Some(Phase::Breaking),
            Phase::Breaking => Some(Phase::Showing),
            Phase::Showing => Some(Phase::SlidingOut),
            Phase::SlidingOut => Some(Phase::Finished),
            Phase::Finished => None,
        }
    }

    /// Whether the notification still holds an admission slot
    pub fn occupies_slot(self) -> bool {
        matches!(self, Phase::SlidingIn | Phase::Breaking | Phase::Showing)
    }
}

/// Why a notification left the screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "action")]
pub enum CloseReason {
    /// Show duration ran out
    Expired,
    /// User invoked an action
    Dismissed(String),
    /// Explicit close request
    Closed,
    /// Forced out to make room for a newer notification
    Evicted,
}

#[derive(Debug, Clone)]
enum AnimationState {
    SlidingIn {
        entered_at: Duration,
    },
    Breaking {
        entered_at: Duration,
    },
    Showing {
        entered_at: Duration,
    },
    SlidingOut {
        entered_at: Duration,
        from_x: f32,
        from_opacity: f32,
        reason: CloseReason,
    },
    Finished {
        reason: CloseReason,
    },
}

impl AnimationState {
    fn phase(&self) -> Phase {
        match self {
            AnimationState::SlidingIn { .. } => Phase::SlidingIn,
            AnimationState::Breaking { .. } => Phase::Breaking,
            AnimationState::Showing { .. } => Phase::Showing,
            AnimationState::SlidingOut { .. } => Phase::SlidingOut,
            AnimationState::Finished { .. } => Phase::Finished,
        }
    }

    fn entered_at(&self) -> Option<Duration> {
        match self {
            AnimationState::SlidingIn { entered_at }
            | AnimationState::Breaking { entered_at }
            | AnimationState::Showing { entered_at }
            | AnimationState::SlidingOut { entered_at, .. } => Some(*entered_at),
            AnimationState::Finished { .. } => None,
        }
    }
}

/// Shared, read-only inputs to `advance`
#[derive(Debug, Clone, Copy)]
pub struct AnimationContext<'a> {
    pub layout: &'a StackLayout,
    pub emitter: &'a EmitterConfig,
    pub shake_magnitude: f32,
}

/// A notification owned by the manager for its on-screen lifetime
#[derive(Debug, Clone)]
pub struct LiveNotification {
    request: Arc<NotificationRequest>,
    timing: UrgencyTiming,
    state: AnimationState,
    /// Creation order; the stacking key
    seq: u64,
    slot: usize,
    position: Vec2,
    opacity: f32,
    shake: Vec2,
    particles: ParticlePool,
    rng: StdRng,
}

impl LiveNotification {
    pub fn new(
        request: NotificationRequest,
        timing: UrgencyTiming,
        seq: u64,
        now: Duration,
        particle_capacity: usize,
        rng_seed: u64,
    ) -> Self {
        let rng = StdRng::seed_from_u64(rng_seed ^ u64::from(request.id.0));
        Self {
            request: Arc::new(request),
            timing,
            state: AnimationState::SlidingIn { entered_at: now },
            seq,
            slot: 0,
            position: Vec2::ZERO,
            opacity: 0.0,
            shake: Vec2::ZERO,
            particles: ParticlePool::new(particle_capacity),
            rng,
        }
    }

    pub fn id(&self) -> NotificationId {
        self.request.id
    }

    pub fn request(&self) -> &Arc<NotificationRequest> {
        &self.request
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn set_slot(&mut self, slot: usize) {
        self.slot = slot;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn shake(&self) -> Vec2 {
        self.shake
    }

    pub fn particles(&self) -> &ParticlePool {
        &self.particles
    }

    /// Reason recorded when the notification started leaving
    pub fn close_reason(&self) -> Option<&CloseReason> {
        match &self.state {
            AnimationState::SlidingOut { reason, .. } | AnimationState::Finished { reason } => {
                Some(reason)
            }
            _ => None,
        }
    }

    /// Time spent in the current phase, `None` once finished
    pub fn elapsed_in_phase(&self, now: Duration) -> Option<Duration> {
        self.state.entered_at().map(|at| now.saturating_sub(at))
    }

    /// Effective show duration; `None` holds until closed
    fn show_duration(&self) -> Option<Duration> {
        match self.request.expiry {
            Expiry::Default => self.timing.show(),
            Expiry::Never => None,
            Expiry::After(d) => Some(d),
        }
    }

    /// Replace content without touching the animation phase or stacking order
    pub fn refresh(&mut self, request: NotificationRequest, timing: UrgencyTiming) {
        self.request = Arc::new(request);
        self.timing = timing;
    }

    /// Replace content and start over from `SlidingIn`
    ///
    /// Used when a re-Show arrives for a notification that is already leaving.
    pub fn restart(&mut self, request: NotificationRequest, timing: UrgencyTiming, now: Duration) {
        self.refresh(request, timing);
        self.state = AnimationState::SlidingIn { entered_at: now };
        self.shake = Vec2::ZERO;
    }

    /// Jump to `SlidingOut` from the current position and opacity.
    ///
    /// Returns false (and changes nothing) when the notification is already
    /// leaving or finished, which makes repeated closes idempotent.
    pub fn force_exit(&mut self, now: Duration, reason: CloseReason) -> bool {
        if !self.phase().occupies_slot() {
            return false;
        }
        debug!(id = %self.id(), from = ?self.phase(), reason = ?reason, "Forcing slide-out");
        self.state = AnimationState::SlidingOut {
            entered_at: now,
            from_x: self.position.x,
            from_opacity: self.opacity,
            reason,
        };
        self.shake = Vec2::ZERO;
        true
    }

    /// Advance particles and the phase machine to `now`, then recompute the
    /// render scalars. `dt` is the tick's elapsed time.
    pub fn advance(&mut self, now: Duration, dt: Duration, ctx: &AnimationContext<'_>) {
        self.particles.step(dt, ctx.emitter.gravity);

        while let Some(next) = self.transition(now, ctx) {
            debug!(id = %self.id(), phase = ?next.phase(), "Phase transition");
            self.state = next;
        }

        self.update_render_state(now, ctx);
    }

    /// The state to move to at `now`, if the current phase has run out
    fn transition(&mut self, now: Duration, ctx: &AnimationContext<'_>) -> Option<AnimationState> {
        let elapsed = self.elapsed_in_phase(now)?;
        match &self.state {
            AnimationState::SlidingIn { entered_at } => {
                let duration = self.timing.slide_in();
                if elapsed < duration {
                    return None;
                }
                let entered_at = *entered_at + duration;
                self.emit_burst(ctx);
                Some(AnimationState::Breaking { entered_at })
            }
            AnimationState::Breaking { entered_at } => {
                let duration = self.timing.break_duration();
                (elapsed >= duration).then(|| AnimationState::Showing {
                    entered_at: *entered_at + duration,
                })
            }
            AnimationState::Showing { entered_at } => {
                let duration = self.show_duration()?;
                (elapsed >= duration).then(|| AnimationState::SlidingOut {
                    entered_at: *entered_at + duration,
                    from_x: ctx.layout.rest_position(self.slot).x,
                    from_opacity: 1.0,
                    reason: CloseReason::Expired,
                })
            }
            AnimationState::SlidingOut { reason, .. } => {
                (elapsed >= self.timing.slide_out()).then(|| AnimationState::Finished {
                    reason: reason.clone(),
                })
            }
            AnimationState::Finished { .. } => None,
        }
    }

    fn emit_burst(&mut self, ctx: &AnimationContext<'_>) {
        let origin = ctx.layout.rest_position(self.slot);
        let placed = self.particles.burst(
            &mut self.rng,
            self.timing.particle_burst,
            origin,
            ctx.layout.card.height,
            ctx.emitter,
            self.timing.max_particle_lifespan(),
        );
        if placed < self.timing.particle_burst {
            debug!(
                id = %self.id(),
                requested = self.timing.particle_burst,
                placed,
                "Particle pool full, burst truncated"
            );
        }
    }

    fn update_render_state(&mut self, now: Duration, ctx: &AnimationContext<'_>) {
        let rest = ctx.layout.rest_position(self.slot);
        let elapsed = self.elapsed_in_phase(now).unwrap_or_default();
        self.shake = Vec2::ZERO;

        match &self.state {
            AnimationState::SlidingIn { .. } => {
                let t = progress(elapsed, self.timing.slide_in());
                let from = ctx.layout.offscreen_right(self.slot);
                self.position = from.lerp(rest, Easing::EaseOutCubic.apply(t));
                self.opacity = t;
            }
            AnimationState::Breaking { .. } => {
                let t = progress(elapsed, self.timing.break_duration());
                self.position = rest;
                self.opacity = 1.0;
                let magnitude = ctx.shake_magnitude * (1.0 - t);
                let angle = elapsed.as_secs_f32() * SHAKE_HZ * TAU;
                self.shake = Vec2::new(angle.sin(), (angle * 1.3).cos()) * magnitude;
            }
            AnimationState::Showing { .. } => {
                self.position = rest;
                self.opacity = 1.0;
            }
            AnimationState::SlidingOut {
                from_x,
                from_opacity,
                ..
            } => {
                let t = progress(elapsed, self.timing.slide_out());
                let travel = ctx.layout.offscreen_left_x() - from_x;
                let x = from_x + travel * Easing::EaseInCubic.apply(t);
                self.position = Vec2::new(x, rest.y);
                self.opacity = from_opacity * (1.0 - t);
            }
            AnimationState::Finished { .. } => {
                self.position = Vec2::new(ctx.layout.offscreen_left_x(), rest.y);
                self.opacity = 0.0;
            }
        }
    }
}

/// Linear progress through a phase, 1.0 for zero-length phases
fn progress(elapsed: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / total.as_secs_f32()).min(1.0)
}
