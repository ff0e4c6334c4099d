//! Particle simulator for the "break" effect.
//!
//! Each notification owns one `ParticlePool`: a fixed-capacity arena whose
//! free slots are threaded into a singly linked free list. Spawning takes the
//! head of the free list, expiring a particle pushes its slot back. Nothing is
//! allocated after construction, and a spawn into a full pool is dropped.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::geometry::Vec2;

/// Emission cone and physics shared by every pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Cone axis in degrees (0 = right, 90 = down, 180 = left)
    pub cone_direction_deg: f32,
    /// Full opening angle of the cone in degrees
    pub cone_spread_deg: f32,
    /// Initial speed range in px/s
    pub min_speed: f32,
    pub max_speed: f32,
    /// Downward acceleration in px/s²
    pub gravity: f32,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            cone_direction_deg: 180.0,
            cone_spread_deg: 120.0,
            min_speed: 80.0,
            max_speed: 420.0,
            gravity: 900.0,
        }
    }
}

/// A single particle record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub age: Duration,
    pub lifespan: Duration,
}

impl Particle {
    /// Linear fade from 1.0 at birth to 0.0 at end of life
    pub fn alpha(&self) -> f32 {
        if self.lifespan.is_zero() {
            return 0.0;
        }
        (1.0 - self.age.as_secs_f32() / self.lifespan.as_secs_f32()).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Free { next: Option<usize> },
    Live(Particle),
}

/// Fixed-capacity particle arena
#[derive(Debug, Clone)]
pub struct ParticlePool {
    slots: Vec<Slot>,
    free_head: Option<usize>,
    live: usize,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|i| Slot::Free {
                next: (i + 1 < capacity).then_some(i + 1),
            })
            .collect();
        Self {
            slots,
            free_head: (capacity > 0).then_some(0),
            live: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Place a particle in a free slot. Returns false (and drops the
    /// particle) when the pool is full.
    pub fn spawn(&mut self, particle: Particle) -> bool {
        let Some(index) = self.free_head else {
            return false;
        };
        let next = match self.slots[index] {
            Slot::Free { next } => next,
            // the free list only ever links free slots
            Slot::Live(_) => return false,
        };
        self.free_head = next;
        self.slots[index] = Slot::Live(particle);
        self.live += 1;
        true
    }

    /// Emit up to `count` particles from a vertical edge starting at `origin`
    /// and spanning `edge_height` pixels. Returns how many were placed.
    pub fn burst<R: Rng>(
        &mut self,
        rng: &mut R,
        count: usize,
        origin: Vec2,
        edge_height: f32,
        emitter: &EmitterConfig,
        max_lifespan: Duration,
    ) -> usize {
        // the emitter may come from an unvalidated config: order the ranges, zero non-finite values
        let axis = finite_or_zero(emitter.cone_direction_deg).to_radians();
        let half_spread = (finite_or_zero(emitter.cone_spread_deg).abs() / 2.0).to_radians();
        let (min_speed, max_speed) = ordered(
            finite_or_zero(emitter.min_speed),
            finite_or_zero(emitter.max_speed),
        );
        let edge_height = finite_or_zero(edge_height).max(0.0);
        let max_ms = max_lifespan.as_millis() as u64;

        let mut placed = 0;
        for _ in 0..count {
            if self.free_head.is_none() {
                break;
            }
            let angle = axis + rng.gen_range(-half_spread..=half_spread);
            let speed = rng.gen_range(min_speed..=max_speed);
            let offset = rng.gen_range(0.0..=edge_height);
            let lifespan_ms = rng.gen_range(max_ms / 2..=max_ms);

            if self.spawn(Particle {
                position: Vec2::new(origin.x, origin.y + offset),
                velocity: Vec2::from_angle(angle) * speed,
                age: Duration::ZERO,
                lifespan: Duration::from_millis(lifespan_ms),
            }) {
                placed += 1;
            }
        }
        placed
    }

    /// Advance every live particle by `dt` and free the expired ones
    pub fn step(&mut self, dt: Duration, gravity: f32) {
        let secs = dt.as_secs_f32();
        for index in 0..self.slots.len() {
            let expired = match &mut self.slots[index] {
                Slot::Live(p) => {
                    p.position = p.position + p.velocity * secs;
                    p.velocity.y += gravity * secs;
                    p.age += dt;
                    p.age >= p.lifespan
                }
                Slot::Free { .. } => false,
            };
            if expired {
                self.slots[index] = Slot::Free {
                    next: self.free_head,
                };
                self.free_head = Some(index);
                self.live -= 1;
            }
        }
    }

    /// Live particles in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Live(p) => Some(p),
            Slot::Free { .. } => None,
        })
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
