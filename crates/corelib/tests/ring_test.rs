//! Comprehensive tests for the hash ring implementation.
//!
//! # Test Strategy
//!
//! 1. **Basic functionality**: Empty ring, add/lookup, remove
//! 2. **Multiple nodes**: Distribution, consistency
//! 3. **Membership changes**: only the affected arcs remap
//! 4. **Edge cases**: Wraparound, single node, duplicate nodes

use std::collections::HashMap;

use shardring_core::partitioner::{Blake3Partitioner, SipPartitioner};
use shardring_core::ring::topology::moved_fraction;
use shardring_core::{Error, HashRing, NodeId, RingBuilder, RingTopology, Token};

fn keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("user:{}", i)).collect()
}

fn assignments(ring: &HashRing, keys: &[String]) -> HashMap<String, NodeId> {
    keys.iter()
        .map(|k| (k.clone(), ring.get_node(k).unwrap().clone()))
        .collect()
}

fn ring_of(nodes: &[&str], replicas: usize) -> HashRing {
    let mut ring = HashRing::new();
    for node in nodes {
        ring.add_node(*node, replicas).unwrap();
    }
    ring
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_empty_ring_lookup() {
    let ring = HashRing::new();
    assert_eq!(ring.get_node(b"key1"), Err(Error::EmptyRing));
    assert_eq!(ring.node_count(), 0);
    assert_eq!(ring.vnode_count(), 0);
    assert!(ring.is_empty());
}

#[test]
fn test_add_node_and_lookup() {
    let mut ring = HashRing::new();
    ring.add_node("node1", 4).unwrap();

    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.vnode_count(), 4);
    assert_eq!(ring.get_node(b"test-key").unwrap(), "node1");
    assert!(ring.contains(&NodeId::from("node1")));
}

#[test]
fn test_remove_node() {
    let mut ring = ring_of(&["node1", "node2"], 4);
    assert_eq!(ring.vnode_count(), 8);

    assert!(ring.remove_node(&NodeId::from("node1")));
    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.vnode_count(), 4);
    assert_eq!(ring.get_node(b"some-key").unwrap(), "node2");

    // Removal is idempotent.
    assert!(!ring.remove_node(&NodeId::from("node1")));
    assert!(!ring.remove_node(&NodeId::from("node999")));
    assert_eq!(ring.vnode_count(), 4);
}

#[test]
fn test_remove_last_node_empties_ring() {
    let mut ring = ring_of(&["only"], 5);
    assert!(ring.remove_node(&NodeId::from("only")));
    assert!(ring.is_empty());
    assert_eq!(ring.token_count(), 0);
    assert_eq!(ring.get_node("k"), Err(Error::EmptyRing));
}

// ============================================================================
// Multiple Nodes Tests
// ============================================================================

#[test]
fn test_lookups_only_return_members() {
    let mut ring = ring_of(&["node1", "node2", "node3"], 4);
    ring.remove_node(&NodeId::from("node2"));

    for key in keys(2_000) {
        let owner = ring.get_node(&key).unwrap();
        assert!(ring.contains(owner));
        assert_ne!(owner, "node2");
    }
}

#[test]
fn test_consistent_lookup() {
    let ring = ring_of(&["node1", "node2"], 4);
    let first = ring.get_node(b"consistent-key").unwrap().clone();
    for _ in 0..100 {
        assert_eq!(ring.get_node(b"consistent-key").unwrap(), &first);
    }
}

#[test]
fn test_same_membership_same_placement() {
    // Insertion order does not affect placement.
    let a = ring_of(&["n1", "n2", "n3"], 10);
    let b = ring_of(&["n3", "n1", "n2"], 10);
    let sample = keys(1_000);
    assert_eq!(assignments(&a, &sample), assignments(&b, &sample));
}

// ============================================================================
// Membership Change Tests
// ============================================================================

#[test]
fn test_add_only_moves_keys_to_new_node() {
    let sample = keys(10_000);
    let mut ring = ring_of(&["A", "B", "C"], 100);
    let before = assignments(&ring, &sample);

    ring.add_node("D", 100).unwrap();
    let after = assignments(&ring, &sample);

    let mut moved = 0;
    for key in &sample {
        if before[key] != after[key] {
            assert_eq!(after[key], "D", "{} moved to an existing node", key);
            moved += 1;
        }
    }
    let fraction = moved as f64 / sample.len() as f64;
    assert!(
        (0.10..=0.40).contains(&fraction),
        "remapped fraction {:.3} outside 10%-40%",
        fraction
    );
}

#[test]
fn test_remove_only_moves_removed_nodes_keys_to_clockwise_neighbour() {
    let sample = keys(10_000);
    let old = ring_of(&["A", "B", "C", "D"], 50);
    let mut new = old.clone();
    let removed = NodeId::from("B");
    new.remove_node(&removed);

    for key in &sample {
        let old_owner = old.get_node(key).unwrap();
        let new_owner = new.get_node(key).unwrap();
        if old_owner != &removed {
            assert_eq!(old_owner, new_owner, "{} moved although its owner stayed", key);
        } else {
            // The next distinct node clockwise on the old ring takes over.
            let preference = old.get_nodes(key, 2);
            assert_eq!(&preference[1], new_owner);
        }
    }
}

#[test]
fn test_remove_then_re_add_restores_placement() {
    let sample = keys(2_000);
    let mut ring = ring_of(&["A", "B", "C"], 20);
    let before = assignments(&ring, &sample);

    ring.remove_node(&NodeId::from("B"));
    ring.add_node("B", 20).unwrap();
    assert_eq!(assignments(&ring, &sample), before);
}

#[test]
fn test_topology_diff_matches_sampled_movement() {
    let sample = keys(20_000);
    let old = ring_of(&["A", "B", "C"], 64);
    let mut new = old.clone();
    new.add_node("D", 64).unwrap();

    let movements = RingTopology::diff(&old, &new);
    let predicted = moved_fraction(&movements);

    let moved = sample
        .iter()
        .filter(|k| old.get_node(k).unwrap() != new.get_node(k).unwrap())
        .count();
    let observed = moved as f64 / sample.len() as f64;
    assert!(
        (predicted - observed).abs() < 0.03,
        "predicted {:.3}, observed {:.3}",
        predicted,
        observed
    );

    // Every sampled key that moved falls inside a reported movement.
    for key in sample.iter().take(2_000) {
        let token = old.token_for(key);
        let from = old.node_for_token(token).unwrap();
        let to = new.node_for_token(token).unwrap();
        let covered = movements.iter().find(|m| m.range.contains(token));
        match covered {
            Some(m) => {
                assert_eq!(&m.from, from);
                assert_eq!(&m.to, to);
            }
            None => assert_eq!(from, to),
        }
    }
}

// ============================================================================
// Load Distribution Tests
// ============================================================================

fn max_share(ring: &HashRing) -> f64 {
    RingTopology::new(ring)
        .ownership()
        .values()
        .cloned()
        .fold(0.0, f64::max)
}

#[test]
fn test_virtual_replicas_bound_load() {
    let nodes = ["n0", "n1", "n2", "n3", "n4"];
    let ring = ring_of(&nodes, 100);

    let sample = keys(10_000);
    let mut counts: HashMap<NodeId, usize> = HashMap::new();
    for key in &sample {
        *counts.entry(ring.get_node(key).unwrap().clone()).or_default() += 1;
    }

    let fair = sample.len() / nodes.len();
    assert_eq!(counts.len(), nodes.len(), "some node received no keys");
    for (node, count) in counts {
        assert!(count < 2 * fair, "{} received {} keys (fair share {})", node, count, fair);
    }
}

#[test]
fn test_more_replicas_even_out_ownership() {
    let nodes: Vec<String> = (0..10).map(|i| format!("server-{}", i)).collect();
    let names: Vec<&str> = nodes.iter().map(String::as_str).collect();

    let single = ring_of(&names, 1);
    let many = ring_of(&names, 200);

    assert!(max_share(&many) < max_share(&single));
    assert!(max_share(&many) < 2.0 / nodes.len() as f64);
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_single_node_wraparound() {
    let ring = ring_of(&["node1"], 1);
    let (only_token, _) = ring.tokens().next().unwrap();

    // Tokens on both sides of the single vnode, including past it.
    for token in [Token::MIN, only_token, only_token.successor(), Token::MAX] {
        assert_eq!(ring.node_for_token(token).unwrap(), "node1");
    }
    for key in keys(1_000) {
        assert_eq!(ring.get_node(&key).unwrap(), "node1");
    }
}

#[test]
fn test_keys_past_last_token_wrap_to_first() {
    let ring = ring_of(&["a", "b", "c"], 3);
    let tokens: Vec<(Token, NodeId)> = ring.tokens().map(|(t, n)| (t, n.clone())).collect();
    let (first_token, first_owner) = tokens.first().unwrap().clone();
    let (last_token, _) = tokens.last().unwrap().clone();

    assert_eq!(ring.node_for_token(first_token).unwrap(), &first_owner);
    if last_token < Token::MAX {
        assert_eq!(ring.node_for_token(last_token.successor()).unwrap(), &first_owner);
    }
    assert_eq!(ring.node_for_token(Token::MAX).unwrap(), &first_owner);
}

#[test]
fn test_duplicate_add_rejected() {
    let mut ring = HashRing::new();
    ring.add_node("node1", 4).unwrap();
    assert_eq!(
        ring.add_node("node1", 4),
        Err(Error::DuplicateNode(NodeId::from("node1")))
    );
    assert_eq!(ring.vnode_count(), 4);
    assert_eq!(ring.node_count(), 1);
}

#[test]
fn test_get_all_nodes_sorted() {
    let ring = ring_of(&["node2", "node1"], 4);
    let nodes: Vec<&NodeId> = ring.nodes().collect();
    assert_eq!(nodes, vec![&NodeId::from("node1"), &NodeId::from("node2")]);
}

#[test]
fn test_vnodes_are_in_ring_order() {
    let ring = ring_of(&["node1", "node2"], 8);
    let vnodes: Vec<_> = ring.vnodes().collect();
    assert_eq!(vnodes.len(), 16);
    assert!(vnodes.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_partitioner_name() {
    assert_eq!(HashRing::new().partitioner_name(), "Xxh3Partitioner");
    let ring = RingBuilder::new().with_partitioner(Blake3Partitioner).build().unwrap();
    assert_eq!(ring.partitioner_name(), "Blake3Partitioner");
}

#[test]
fn test_partitioners_place_independently_but_deterministically() {
    let build = || {
        RingBuilder::new()
            .with_partitioner(SipPartitioner::new())
            .with_vnodes(10)
            .add_nodes(["shard1", "shard2", "shard3"])
            .build()
            .unwrap()
    };
    let a = build();
    let b = build();
    for key in keys(500) {
        assert_eq!(a.get_node(&key).unwrap(), b.get_node(&key).unwrap());
    }
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[test]
fn test_user_key_scenario() {
    let mut ring = RingBuilder::new()
        .with_vnodes(3)
        .add_nodes(["shard1", "shard2", "shard3"])
        .build()
        .unwrap();

    let before = ring.get_node("user:12345").unwrap().clone();
    assert!(["shard1", "shard2", "shard3"].contains(&before.as_str()));
    assert_eq!(ring.get_node("user:12345").unwrap(), &before);

    ring.add_node_default("shard4").unwrap();
    let after = ring.get_node("user:12345").unwrap().clone();
    assert_eq!(ring.get_node("user:12345").unwrap(), &after);
    assert!(after == before || after == "shard4");
}
