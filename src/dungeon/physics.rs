//! Per-frame physics for dungeon mode.
//!
//! The player is magnetized toward the boss and the boss is pushed away from
//! the player. A stunned boss stops fleeing and only drifts while its
//! velocity decays, and the player closes in faster. Bodies live inside a
//! `[0, 100]` square and bounce off its walls.

use super::types::{Body, DungeonSession};
use crate::core::constants::*;

/// What one physics frame observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Bodies are touching and the hit cooldown has expired.
    pub contact: bool,
    /// A stunned boss slammed into a wall at speed.
    pub shake: bool,
}

/// Unit vector from `from` to `to`. Coincident bodies get a fixed axis.
fn direction(from: &Body, to: &Body) -> (f64, f64) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let dist = dx.hypot(dy);
    if dist < f64::EPSILON {
        (1.0, 0.0)
    } else {
        (dx / dist, dy / dist)
    }
}

/// Move by velocity, apply friction, then resolve wall collisions.
/// Returns true if a wall was hit.
fn integrate(body: &mut Body) -> bool {
    body.x += body.vx;
    body.y += body.vy;
    body.vx *= FRICTION;
    body.vy *= FRICTION;

    let mut hit = false;
    if body.x < ARENA_MIN {
        body.x = ARENA_MIN;
        body.vx = -body.vx * WALL_RESTITUTION;
        hit = true;
    } else if body.x > ARENA_MAX {
        body.x = ARENA_MAX;
        body.vx = -body.vx * WALL_RESTITUTION;
        hit = true;
    }
    if body.y < ARENA_MIN {
        body.y = ARENA_MIN;
        body.vy = -body.vy * WALL_RESTITUTION;
        hit = true;
    } else if body.y > ARENA_MAX {
        body.y = ARENA_MAX;
        body.vy = -body.vy * WALL_RESTITUTION;
        hit = true;
    }
    hit
}

/// Advance the session's bodies by one frame.
pub fn step(session: &mut DungeonSession) -> FrameReport {
    let (nx, ny) = direction(&session.player_body, &session.boss_body);
    let stunned = session.boss_stun > 0;

    let magnet = if stunned {
        MAGNET_FORCE * STUN_MAGNET_MULTIPLIER
    } else {
        MAGNET_FORCE
    };
    session.player_body.vx += nx * magnet;
    session.player_body.vy += ny * magnet;

    if stunned {
        session.boss_stun -= 1;
    } else {
        session.boss_body.vx += nx * BOSS_REPEL_FORCE;
        session.boss_body.vy += ny * BOSS_REPEL_FORCE;
    }

    integrate(&mut session.player_body);
    // Speed is sampled before the bounce so a hard slam still registers
    let impact_speed = session.boss_body.speed();
    let boss_hit_wall = integrate(&mut session.boss_body);

    session.hit_cooldown = session.hit_cooldown.saturating_sub(1);

    FrameReport {
        contact: session.hit_cooldown == 0
            && session.player_body.distance_to(&session.boss_body) < CONTACT_DISTANCE,
        shake: boss_hit_wall && stunned && impact_speed > SHAKE_SPEED_THRESHOLD,
    }
}

/// Push the bodies apart after a contact exchange. A crit launches the boss
/// and stuns it.
pub fn apply_knockback(session: &mut DungeonSession, is_crit: bool) {
    let (nx, ny) = direction(&session.player_body, &session.boss_body);
    let boss_force = if is_crit {
        BOUNCE_FORCE * CRIT_BOUNCE_MULTIPLIER
    } else {
        BOUNCE_FORCE
    };
    session.boss_body.vx += nx * boss_force;
    session.boss_body.vy += ny * boss_force;
    session.player_body.vx -= nx * BOUNCE_FORCE;
    session.player_body.vy -= ny * BOUNCE_FORCE;

    if is_crit {
        session.boss_stun = STUN_FRAMES;
    }
    session.hit_cooldown = HIT_COOLDOWN_FRAMES;
}
