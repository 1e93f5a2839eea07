use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use anyhow::{Context, Result};

use crate::error::TopologyError;
use crate::models::{OrderingStrategy, PortZone};

use super::spec::parse_port_spec;

/// One addressable (physical port, lane) unit available for allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSlot {
    pub physical: u16,
    pub lane: Option<u8>,
    pub label: String,
    pub speed_mbps: u32,
}

#[derive(Debug)]
struct SlotSequence {
    slots: Vec<PortSlot>,
    cursor: usize,
}

impl SlotSequence {
    fn remaining(&self) -> usize {
        self.slots.len() - self.cursor
    }
}

/// Hands out port slots per (switch instance, zone) pair.
///
/// Each sequence is built lazily on first use — parse the zone's port spec,
/// reorder per its strategy, expand breakouts — and consumed through a
/// cursor that never revisits a slot. State is scoped to one generation run
/// and is not safe to share across runs or threads.
#[derive(Debug, Default)]
pub struct PortAllocator {
    sequences: HashMap<(String, String), SlotSequence>,
}

impl PortAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next `count` unconsumed slots for this zone on this
    /// switch. Fails on a non-positive count and when fewer than `count`
    /// slots remain; never over-allocates, never returns a slot twice.
    pub fn allocate(
        &mut self,
        switch: &str,
        zone: &PortZone,
        native_speed_mbps: u32,
        count: usize,
    ) -> Result<Vec<PortSlot>> {
        if count == 0 {
            return Err(TopologyError::configuration(
                entity(switch, zone),
                "allocation count must be positive",
            )
            .into());
        }
        let seq = self.sequence(switch, zone, native_speed_mbps)?;
        let remaining = seq.remaining();
        if remaining < count {
            return Err(TopologyError::capacity(
                entity(switch, zone),
                format!("requested {} port slots, {} remaining", count, remaining),
            )
            .into());
        }
        let out = seq.slots[seq.cursor..seq.cursor + count].to_vec();
        seq.cursor += count;
        Ok(out)
    }

    /// Drain every remaining slot for this zone (possibly none). Used by
    /// fan-out to measure and consume a leaf's whole uplink capacity.
    pub fn allocate_all(
        &mut self,
        switch: &str,
        zone: &PortZone,
        native_speed_mbps: u32,
    ) -> Result<Vec<PortSlot>> {
        let seq = self.sequence(switch, zone, native_speed_mbps)?;
        let out = seq.slots[seq.cursor..].to_vec();
        seq.cursor = seq.slots.len();
        Ok(out)
    }

    /// Unconsumed slot count for this zone on this switch.
    pub fn remaining(
        &mut self,
        switch: &str,
        zone: &PortZone,
        native_speed_mbps: u32,
    ) -> Result<usize> {
        Ok(self.sequence(switch, zone, native_speed_mbps)?.remaining())
    }

    fn sequence(
        &mut self,
        switch: &str,
        zone: &PortZone,
        native_speed_mbps: u32,
    ) -> Result<&mut SlotSequence> {
        match self
            .sequences
            .entry((switch.to_string(), zone.name.clone()))
        {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let slots = build_slots(zone, native_speed_mbps).with_context(|| {
                    format!("building port slots for {}", entity(switch, zone))
                })?;
                Ok(entry.insert(SlotSequence { slots, cursor: 0 }))
            }
        }
    }
}

fn entity(switch: &str, zone: &PortZone) -> String {
    format!("zone '{}' on {}", zone.name, switch)
}

/// Parse, reorder and breakout-expand a zone's port spec into its full slot
/// sequence. Physical-port order is preserved within each expansion group.
fn build_slots(zone: &PortZone, native_speed_mbps: u32) -> Result<Vec<PortSlot>> {
    let ports = parse_port_spec(&zone.port_spec)?;
    let ordered = apply_ordering(&zone.ordering, ports)?;

    let mut slots = Vec::new();
    match &zone.breakout {
        Some(breakout) => {
            if breakout.logical_ports == 0 {
                return Err(TopologyError::configuration(
                    format!("zone '{}'", zone.name),
                    "breakout must expand to at least one logical port",
                )
                .into());
            }
            for port in ordered {
                for lane in 1..=breakout.logical_ports {
                    slots.push(PortSlot {
                        physical: port,
                        lane: Some(lane),
                        label: format!("E1/{}/{}", port, lane),
                        speed_mbps: breakout.logical_speed_mbps,
                    });
                }
            }
        }
        None => {
            let speed = zone.speed_mbps.unwrap_or(native_speed_mbps);
            for port in ordered {
                slots.push(PortSlot {
                    physical: port,
                    lane: None,
                    label: format!("E1/{}", port),
                    speed_mbps: speed,
                });
            }
        }
    }
    Ok(slots)
}

fn apply_ordering(strategy: &OrderingStrategy, ports: Vec<u16>) -> Result<Vec<u16>> {
    match strategy {
        OrderingStrategy::Sequential => Ok(ports),
        OrderingStrategy::Interleaved => {
            let mut out: Vec<u16> = ports.iter().copied().step_by(2).collect();
            out.extend(ports.iter().copied().skip(1).step_by(2));
            Ok(out)
        }
        OrderingStrategy::Spaced => {
            let mid = (ports.len() + 1) / 2;
            let (front, back) = ports.split_at(mid);
            let mut out = Vec::with_capacity(ports.len());
            for (i, port) in front.iter().enumerate() {
                out.push(*port);
                if i < back.len() {
                    out.push(back[i]);
                }
            }
            Ok(out)
        }
        OrderingStrategy::Custom(order) => {
            let expected: BTreeSet<u16> = ports.iter().copied().collect();
            let given: BTreeSet<u16> = order.iter().copied().collect();
            if order.len() != ports.len() || expected != given {
                return Err(TopologyError::configuration(
                    "custom port order",
                    "explicit order must be a permutation of the zone's port set",
                )
                .into());
            }
            Ok(order.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BreakoutOption, ZoneType};

    fn zone(spec: &str) -> PortZone {
        PortZone {
            name: "servers".to_string(),
            zone_type: ZoneType::Server,
            port_spec: spec.to_string(),
            breakout: None,
            ordering: OrderingStrategy::Sequential,
            speed_mbps: None,
            priority: 0,
        }
    }

    fn labels(slots: &[PortSlot]) -> Vec<String> {
        slots.iter().map(|s| s.label.clone()).collect()
    }

    #[test]
    fn test_breakout_expansion_order() {
        let mut z = zone("1-2");
        z.breakout = Some(BreakoutOption {
            from_speed_mbps: 100_000,
            logical_ports: 4,
            logical_speed_mbps: 25_000,
            optic: "sr4".to_string(),
        });
        let mut alloc = PortAllocator::new();
        let slots = alloc.allocate("leaf-01", &z, 100_000, 8).unwrap();
        assert_eq!(
            labels(&slots),
            vec![
                "E1/1/1", "E1/1/2", "E1/1/3", "E1/1/4", "E1/2/1", "E1/2/2", "E1/2/3", "E1/2/4",
            ]
        );
        assert!(slots.iter().all(|s| s.speed_mbps == 25_000));
    }

    #[test]
    fn test_interleaved_ordering() {
        let mut z = zone("1-8");
        z.ordering = OrderingStrategy::Interleaved;
        let mut alloc = PortAllocator::new();
        let slots = alloc.allocate("leaf-01", &z, 100_000, 8).unwrap();
        let ports: Vec<u16> = slots.iter().map(|s| s.physical).collect();
        assert_eq!(ports, vec![1, 3, 5, 7, 2, 4, 6, 8]);
    }

    #[test]
    fn test_spaced_ordering() {
        let mut z = zone("1-8");
        z.ordering = OrderingStrategy::Spaced;
        let mut alloc = PortAllocator::new();
        let slots = alloc.allocate("leaf-01", &z, 100_000, 8).unwrap();
        let ports: Vec<u16> = slots.iter().map(|s| s.physical).collect();
        assert_eq!(ports, vec![1, 5, 2, 6, 3, 7, 4, 8]);
    }

    #[test]
    fn test_spaced_ordering_odd_length() {
        let mut z = zone("1-5");
        z.ordering = OrderingStrategy::Spaced;
        let mut alloc = PortAllocator::new();
        let slots = alloc.allocate("leaf-01", &z, 100_000, 5).unwrap();
        let ports: Vec<u16> = slots.iter().map(|s| s.physical).collect();
        assert_eq!(ports, vec![1, 4, 2, 5, 3]);
    }

    #[test]
    fn test_custom_ordering_must_be_permutation() {
        let mut z = zone("1-4");
        z.ordering = OrderingStrategy::Custom(vec![4, 2, 1, 3]);
        let mut alloc = PortAllocator::new();
        let slots = alloc.allocate("leaf-01", &z, 100_000, 4).unwrap();
        let ports: Vec<u16> = slots.iter().map(|s| s.physical).collect();
        assert_eq!(ports, vec![4, 2, 1, 3]);

        let mut bad = zone("1-4");
        bad.ordering = OrderingStrategy::Custom(vec![1, 2, 3]);
        let mut alloc = PortAllocator::new();
        assert!(alloc.allocate("leaf-01", &bad, 100_000, 1).is_err());
    }

    #[test]
    fn test_never_returns_a_slot_twice() {
        let z = zone("1-6");
        let mut alloc = PortAllocator::new();
        let mut seen = Vec::new();
        for _ in 0..6 {
            let slot = alloc.allocate("leaf-01", &z, 100_000, 1).unwrap();
            assert!(!seen.contains(&slot[0].label));
            seen.push(slot[0].label.clone());
        }
        let err = alloc.allocate("leaf-01", &z, 100_000, 1).unwrap_err();
        match err.downcast_ref::<TopologyError>() {
            Some(TopologyError::Capacity { .. }) => {}
            other => panic!("expected capacity error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_count_is_rejected() {
        let z = zone("1-4");
        let mut alloc = PortAllocator::new();
        assert!(alloc.allocate("leaf-01", &z, 100_000, 0).is_err());
    }

    #[test]
    fn test_cursor_is_scoped_per_switch_and_zone() {
        let z = zone("1-2");
        let mut alloc = PortAllocator::new();
        let a = alloc.allocate("leaf-01", &z, 100_000, 2).unwrap();
        let b = alloc.allocate("leaf-02", &z, 100_000, 2).unwrap();
        assert_eq!(labels(&a), labels(&b));
    }

    #[test]
    fn test_allocate_all_drains() {
        let z = zone("1-8");
        let mut alloc = PortAllocator::new();
        alloc.allocate("leaf-01", &z, 100_000, 3).unwrap();
        let rest = alloc.allocate_all("leaf-01", &z, 100_000).unwrap();
        assert_eq!(rest.len(), 5);
        assert_eq!(alloc.remaining("leaf-01", &z, 100_000).unwrap(), 0);
        assert!(alloc.allocate_all("leaf-01", &z, 100_000).unwrap().is_empty());
    }

    #[test]
    fn test_zone_speed_override() {
        let mut z = zone("1-2");
        z.speed_mbps = Some(10_000);
        let mut alloc = PortAllocator::new();
        let slots = alloc.allocate("oob-01", &z, 1_000, 1).unwrap();
        assert_eq!(slots[0].speed_mbps, 10_000);
        assert_eq!(slots[0].label, "E1/1");
    }
}
