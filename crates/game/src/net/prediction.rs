use std::collections::VecDeque;

use glam::Vec2;

use crate::map::GridMap;
use crate::physics::move_and_collide;

pub const INPUT_LOG_CAPACITY: usize = 128;

/// Velocity in effect from `timestamp` until the next entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLogEntry {
    pub timestamp: f32,
    pub velocity: Vec2,
}

/// Authoritative player state as last seen by the server.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServerState {
    pub timestamp: f32,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Bounded log of locally applied velocity changes. When full, pushing
/// drops the oldest entry.
#[derive(Debug, Clone)]
pub struct InputLog {
    entries: VecDeque<InputLogEntry>,
    capacity: usize,
}

impl Default for InputLog {
    fn default() -> Self {
        Self::new(INPUT_LOG_CAPACITY)
    }
}

impl InputLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, timestamp: f32, velocity: Vec2) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(InputLogEntry {
            timestamp,
            velocity,
        });
    }

    /// Drops every entry the server has already seen.
    pub fn discard_through(&mut self, timestamp: f32) {
        while self.entries.front().is_some_and(|e| e.timestamp <= timestamp) {
            self.entries.pop_front();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputLogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Rebuilds the predicted position from a server snapshot: the server
    /// velocity runs until the first unacknowledged entry, each entry's
    /// velocity runs until the next one, the last runs until `now`.
    pub fn replay(&self, map: &GridMap, server: &ServerState, now: f32, radius: f32) -> Vec2 {
        let mut position = server.position;
        let mut time = server.timestamp;
        let mut velocity = server.velocity;

        for entry in &self.entries {
            let dt = (entry.timestamp - time).max(0.0);
            move_and_collide(map, &mut position, velocity * dt, radius);
            time = entry.timestamp;
            velocity = entry.velocity;
        }

        let dt = (now - time).max(0.0);
        move_and_collide(map, &mut position, velocity * dt, radius);
        position
    }

    pub fn reconcile(&mut self, map: &GridMap, server: &ServerState, now: f32, radius: f32) -> Vec2 {
        self.discard_through(server.timestamp);
        self.replay(map, server, now, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> GridMap {
        GridMap::bordered(12, 12).expect("map")
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut log = InputLog::new(4);
        for i in 0..6 {
            log.push(i as f32, Vec2::ZERO);
        }

        assert_eq!(log.len(), 4);
        let stamps: Vec<f32> = log.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_discard_through_is_inclusive() {
        let mut log = InputLog::default();
        log.push(1.0, Vec2::X);
        log.push(2.0, Vec2::Y);
        log.push(3.0, Vec2::ZERO);

        log.discard_through(2.0);
        assert_eq!(log.len(), 1);
        assert_eq!(log.iter().next().map(|e| e.timestamp), Some(3.0));
    }

    #[test]
    fn test_replay_legs() {
        let mut log = InputLog::default();
        log.push(1.5, Vec2::new(0.0, 1.0));
        log.push(2.0, Vec2::ZERO);

        let server = ServerState {
            timestamp: 1.0,
            position: Vec2::new(3.0, 3.0),
            velocity: Vec2::new(1.0, 0.0),
        };
        let position = log.replay(&arena(), &server, 4.0, 0.15);

        // 0.5s east, 0.5s south, then standing still
        assert!((position - Vec2::new(3.5, 3.5)).length() < 1e-5);
    }

    #[test]
    fn test_replay_without_entries_extrapolates() {
        let server = ServerState {
            timestamp: 0.0,
            position: Vec2::new(3.0, 3.0),
            velocity: Vec2::new(2.0, 0.0),
        };
        let position = InputLog::default().replay(&arena(), &server, 0.5, 0.15);
        assert!((position - Vec2::new(4.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_reconcile_discards_acknowledged() {
        let mut log = InputLog::default();
        log.push(0.5, Vec2::new(5.0, 0.0));
        log.push(1.5, Vec2::new(0.0, 1.0));

        let server = ServerState {
            timestamp: 1.0,
            position: Vec2::new(3.0, 3.0),
            velocity: Vec2::ZERO,
        };
        let position = log.reconcile(&arena(), &server, 2.0, 0.15);

        assert_eq!(log.len(), 1);
        assert!((position - Vec2::new(3.0, 3.5)).length() < 1e-5);
    }

    #[test]
    fn test_replay_collides_with_walls() {
        let mut log = InputLog::default();
        log.push(0.0, Vec2::new(10.0, 0.0));

        let server = ServerState {
            timestamp: 0.0,
            position: Vec2::new(9.0, 5.5),
            velocity: Vec2::ZERO,
        };
        let position = log.replay(&arena(), &server, 1.0, 0.15);
        assert!((position.x - 10.85).abs() < 1e-5);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let mut log = InputLog::default();
        let mut t = 0.1;
        for i in 0..40 {
            let angle = i as f32 * 0.7;
            log.push(t, Vec2::from_angle(angle) * 3.5);
            t += 0.05 + (i % 3) as f32 * 0.01;
        }

        let server = ServerState {
            timestamp: 0.0,
            position: Vec2::new(5.5, 5.5),
            velocity: Vec2::new(-3.5, 0.0),
        };
        let map = arena();
        let first = log.replay(&map, &server, t + 0.2, 0.15);
        let second = log.replay(&map, &server, t + 0.2, 0.15);

        assert_eq!(first.to_array(), second.to_array());
        assert!(!map.is_wall(first.x as i32, first.y as i32));
    }
}
