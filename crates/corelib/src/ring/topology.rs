//! Ring topology: which arcs of the token space each node owns.
//!
//! A vnode at token `t` owns every key token in `(prev, t]`, where `prev` is
//! the preceding token clockwise. This module turns a ring into that list of
//! arcs, sums them per node, and compares two rings to find the arcs whose
//! owner changed after a membership change. The ring moves no data; callers
//! use [`RingTopology::diff`] to plan their own migration.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::node::NodeId;
use crate::partitioner::Partitioner;
use crate::ring::HashRing;
use crate::token::Token;

/// Size of the whole token space.
pub const RING_SIZE: u128 = 1 << 64;

/// Arc of the ring covering tokens in `(start, end]`, wrapping past
/// `Token::MAX`. `start == end` is the whole ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TokenRange {
    pub start: Token,
    pub end: Token,
}

impl TokenRange {
    pub fn new(start: Token, end: Token) -> Self {
        Self { start, end }
    }

    pub fn is_full_ring(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, token: Token) -> bool {
        if self.is_full_ring() {
            true
        } else if self.start < self.end {
            self.start < token && token <= self.end
        } else {
            token > self.start || token <= self.end
        }
    }

    /// Number of tokens in the arc.
    pub fn width(&self) -> u128 {
        if self.is_full_ring() {
            RING_SIZE
        } else {
            u128::from(self.start.distance_to(self.end))
        }
    }

    /// Share of the ring covered by this arc, in `(0, 1]`.
    pub fn fraction(&self) -> f64 {
        self.width() as f64 / RING_SIZE as f64
    }
}

/// An arc whose owner differs between two rings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Movement {
    pub range: TokenRange,
    pub from: NodeId,
    pub to: NodeId,
}

/// Read-only view over a ring's ownership layout.
#[derive(Debug)]
pub struct RingTopology<'a, P> {
    ring: &'a HashRing<P>,
}

impl<'a, P: Partitioner> RingTopology<'a, P> {
    pub fn new(ring: &'a HashRing<P>) -> Self {
        Self { ring }
    }

    /// Every owned arc in ring order, paired with the node that owns it.
    ///
    /// A token shared by several nodes yields one arc, owned by the node
    /// lookups resolve to.
    pub fn ranges(&self) -> Vec<(TokenRange, NodeId)> {
        let tokens: Vec<(Token, &NodeId)> = self.ring.tokens().collect();
        let Some(&(last, _)) = tokens.last() else {
            return Vec::new();
        };

        let mut prev = last;
        tokens
            .into_iter()
            .map(|(token, owner)| {
                let range = TokenRange::new(prev, token);
                prev = token;
                (range, owner.clone())
            })
            .collect()
    }

    /// Fraction of the token space each member owns. Values sum to 1.0 for a
    /// non-empty ring; a member whose every token lost a collision owns 0.
    pub fn ownership(&self) -> BTreeMap<NodeId, f64> {
        let mut owned: BTreeMap<NodeId, u128> =
            self.ring.nodes().map(|id| (id.clone(), 0)).collect();
        for (range, owner) in self.ranges() {
            *owned.entry(owner).or_default() += range.width();
        }
        owned
            .into_iter()
            .map(|(id, len)| (id, len as f64 / RING_SIZE as f64))
            .collect()
    }

    /// Arcs that change owner going from `old` to `new`.
    ///
    /// Walks the union of both rings' tokens; between two consecutive union
    /// tokens neither ring has a vnode, so each ring has a single owner for
    /// the whole segment. Adjacent segments with the same move are merged.
    /// Returns nothing when either ring is empty.
    pub fn diff<Q: Partitioner>(old: &HashRing<P>, new: &HashRing<Q>) -> Vec<Movement> {
        if old.is_empty() || new.is_empty() {
            return Vec::new();
        }

        let mut boundaries: Vec<Token> = old
            .tokens()
            .map(|(t, _)| t)
            .chain(new.tokens().map(|(t, _)| t))
            .collect();
        boundaries.sort_unstable();
        boundaries.dedup();

        let Some(&last) = boundaries.last() else {
            return Vec::new();
        };

        let mut movements: Vec<Movement> = Vec::new();
        let mut prev = last;
        for token in boundaries {
            let range = TokenRange::new(prev, token);
            prev = token;

            let (Ok(from), Ok(to)) = (old.node_for_token(token), new.node_for_token(token)) else {
                continue;
            };
            if from == to {
                continue;
            }
            match movements.last_mut() {
                Some(m) if m.range.end == range.start && &m.from == from && &m.to == to => {
                    m.range.end = range.end;
                }
                _ => movements.push(Movement {
                    range,
                    from: from.clone(),
                    to: to.clone(),
                }),
            }
        }

        // The first and last segments are neighbours across Token::MAX.
        if movements.len() > 1 {
            let first = &movements[0];
            let tail = &movements[movements.len() - 1];
            if tail.range.end == first.range.start && tail.from == first.from && tail.to == first.to
            {
                let tail_start = tail.range.start;
                movements[0].range.start = tail_start;
                movements.pop();
            }
        }
        movements
    }
}

/// Share of the ring covered by `movements`.
pub fn moved_fraction(movements: &[Movement]) -> f64 {
    movements.iter().map(|m| m.range.fraction()).sum()
}
