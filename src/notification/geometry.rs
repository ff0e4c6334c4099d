//! Screen-space geometry shared by the state machine and the manager

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// 2D point/vector in screen pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector at `radians` (0 points right, positive turns downward)
    pub fn from_angle(radians: f32) -> Self {
        Self::new(radians.cos(), radians.sin())
    }

    pub fn lerp(self, to: Vec2, t: f32) -> Vec2 {
        Vec2::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Notification card size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CardSize {
    fn default() -> Self {
        Self {
            width: 360.0,
            height: 84.0,
        }
    }
}

/// Monitor the notifications are stacked on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for MonitorGeometry {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1920.0,
            height: 1080.0,
        }
    }
}

/// Anchors derived from monitor geometry, card size and margins
///
/// Cards stack from the top-right corner downward. They enter from past the
/// right edge and leave past the left edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackLayout {
    pub monitor: MonitorGeometry,
    pub card: CardSize,
    pub margin: f32,
    pub row_height: f32,
}

impl StackLayout {
    /// Top-left corner of a card resting in `slot`
    pub fn rest_position(&self, slot: usize) -> Vec2 {
        Vec2::new(
            self.monitor.x + self.monitor.width - self.margin - self.card.width,
            self.monitor.y + self.margin + slot as f32 * self.row_height,
        )
    }

    /// Start of the slide-in, level with the slot's rest row
    pub fn offscreen_right(&self, slot: usize) -> Vec2 {
        Vec2::new(self.monitor.x + self.monitor.width, self.rest_position(slot).y)
    }

    /// X coordinate a sliding-out card travels to
    pub fn offscreen_left_x(&self) -> f32 {
        self.monitor.x - self.card.width
    }
}
