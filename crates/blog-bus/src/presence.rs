//! Member counts announced by other nodes

use std::collections::HashMap;
use std::time::{Duration, Instant};

use blog_core::RoomId;
use dashmap::DashMap;

use crate::envelope::NodeId;

#[derive(Debug, Clone, Copy)]
struct Announcement {
    count: usize,
    seen_at: Instant,
}

/// Latest per-node member counts for each room, expiring when not refreshed
#[derive(Debug)]
pub struct RemotePresence {
    rooms: DashMap<RoomId, HashMap<NodeId, Announcement>>,
    ttl: Duration,
}

impl RemotePresence {
    /// Counts older than `ttl` are ignored and eventually pruned
    pub fn new(ttl: Duration) -> Self {
        Self {
            rooms: DashMap::new(),
            ttl,
        }
    }

    /// Record a node's count for a room; returns whether the room total changed
    pub fn record(&self, room: &RoomId, node: &NodeId, count: usize) -> bool {
        let before = self.total(room);

        if count == 0 {
            if let Some(mut nodes) = self.rooms.get_mut(room) {
                nodes.remove(node);
            }
            self.rooms.remove_if(room, |_, nodes| nodes.is_empty());
        } else {
            self.rooms.entry(room.clone()).or_default().insert(
                node.clone(),
                Announcement {
                    count,
                    seen_at: Instant::now(),
                },
            );
        }

        before != self.total(room)
    }

    /// Sum of fresh counts from other nodes
    pub fn total(&self, room: &RoomId) -> usize {
        self.rooms.get(room).map_or(0, |nodes| {
            nodes
                .values()
                .filter(|a| a.seen_at.elapsed() <= self.ttl)
                .map(|a| a.count)
                .sum()
        })
    }

    /// Forget a node entirely, returning the rooms it had members in
    pub fn forget_node(&self, node: &NodeId) -> Vec<RoomId> {
        let mut affected = Vec::new();
        for mut entry in self.rooms.iter_mut() {
            if entry.value_mut().remove(node).is_some() {
                affected.push(entry.key().clone());
            }
        }
        self.rooms.retain(|_, nodes| !nodes.is_empty());
        affected
    }

    /// Drop expired counts, returning the rooms whose total changed
    pub fn prune(&self) -> Vec<RoomId> {
        let mut affected = Vec::new();
        for mut entry in self.rooms.iter_mut() {
            let before = entry.value().len();
            entry.value_mut().retain(|_, a| a.seen_at.elapsed() <= self.ttl);
            if entry.value().len() != before {
                affected.push(entry.key().clone());
            }
        }
        self.rooms.retain(|_, nodes| !nodes.is_empty());
        affected
    }
}
