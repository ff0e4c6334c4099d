//! Per-tick draw list handed to the renderer
//!
//! A snapshot owns everything it needs: content is shared through `Arc`, all
//! scalars are copied. The renderer can keep it as long as it likes without
//! holding anything inside the manager.

use serde::Serialize;
use std::sync::Arc;

use super::animation::{LiveNotification, Phase};
use super::geometry::Vec2;
use super::request::{NotificationId, NotificationRequest};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleSprite {
    pub position: Vec2,
    pub alpha: f32,
}

/// One notification as it should be painted this frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawEntry {
    pub id: NotificationId,
    pub slot: usize,
    pub phase: Phase,
    /// Top-left corner of the card, before shake
    pub position: Vec2,
    pub opacity: f32,
    /// Offset to add to `position` (non-zero only while breaking)
    pub shake: Vec2,
    pub particles: Vec<ParticleSprite>,
    pub content: Arc<NotificationRequest>,
}

impl DrawEntry {
    pub(crate) fn capture(live: &LiveNotification) -> Self {
        Self {
            id: live.id(),
            slot: live.slot(),
            phase: live.phase(),
            position: live.position(),
            opacity: live.opacity(),
            shake: live.shake(),
            particles: live
                .particles()
                .iter()
                .map(|p| ParticleSprite {
                    position: p.position,
                    alpha: p.alpha(),
                })
                .collect(),
            content: Arc::clone(live.request()),
        }
    }

    /// Where the card is painted this frame
    pub fn painted_position(&self) -> Vec2 {
        self.position + self.shake
    }
}

/// Ordered draw list (stacking order, top slot first)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrawList {
    /// Manager clock at the end of the tick, in milliseconds
    pub clock_ms: u64,
    pub entries: Vec<DrawEntry>,
}

impl DrawList {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, id: NotificationId) -> Option<&DrawEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawEntry> {
        self.entries.iter()
    }
}
