use std::collections::HashMap;

use anyhow::Result;
use sqlx::SqliteConnection;

use crate::db::{InterfaceRepo, LinkRepo};
use crate::models::{Device, Fabric, SwitchClass, SwitchRole, TopologyPlan, ZoneType};
use crate::ports::PortAllocator;

use super::{allocate_span, zones_of_type};

/// Split `total` uplinks across `spines` as evenly as possible: the first
/// `total mod spines` spines carry one extra link.
pub fn fanout_counts(total: usize, spines: usize) -> Vec<usize> {
    let base = total / spines;
    let remainder = total % spines;
    (0..spines).map(|i| base + usize::from(i < remainder)).collect()
}

/// Wire every leaf's uplink capacity to the spines of its fabric domain.
///
/// Per domain: collect leaf/border-leaf and spine devices, sort both sides
/// by name, spread each leaf's full uplink slot list over the spines with
/// the `fanout_counts` split, and pair slots in allocation order — one
/// interface pair and one link per pairing. A domain missing either side is
/// skipped without error.
pub(super) async fn run_fanout(
    conn: &mut SqliteConnection,
    allocator: &mut PortAllocator,
    plan: &TopologyPlan,
    switches_by_class: &HashMap<String, Vec<Device>>,
) -> Result<u64> {
    let mut links_created = 0u64;

    for fabric in Fabric::ALL {
        let mut leaves: Vec<(&Device, &SwitchClass)> = Vec::new();
        let mut spines: Vec<(&Device, &SwitchClass)> = Vec::new();
        for class in &plan.switch_classes {
            if class.fabric != fabric {
                continue;
            }
            let Some(devices) = switches_by_class.get(&class.id) else {
                continue;
            };
            if class.role.is_fanout_leaf() {
                leaves.extend(devices.iter().map(|d| (d, class)));
            } else if class.role == SwitchRole::Spine {
                spines.extend(devices.iter().map(|d| (d, class)));
            }
        }

        if leaves.is_empty() || spines.is_empty() {
            tracing::debug!("Skipping {} fan-out: no leaf/spine pairing", fabric);
            continue;
        }
        leaves.sort_by(|a, b| a.0.name.cmp(&b.0.name));
        spines.sort_by(|a, b| a.0.name.cmp(&b.0.name));

        for (leaf, leaf_class) in &leaves {
            let uplink_zones = zones_of_type(leaf_class, ZoneType::Uplink);
            let mut uplink_slots = Vec::new();
            for zone in &uplink_zones {
                uplink_slots.extend(allocator.allocate_all(
                    &leaf.name,
                    zone,
                    leaf_class.capability.native_speed_mbps,
                )?);
            }
            if uplink_slots.is_empty() {
                tracing::debug!("Leaf {} has no uplink capacity left; skipping", leaf.name);
                continue;
            }

            let counts = fanout_counts(uplink_slots.len(), spines.len());
            let mut offset = 0usize;
            for ((spine, spine_class), want) in spines.iter().zip(counts) {
                if want == 0 {
                    continue;
                }
                let fabric_zones = zones_of_type(spine_class, ZoneType::Fabric);
                let spine_slots = allocate_span(
                    allocator,
                    &spine.name,
                    &fabric_zones,
                    spine_class.capability.native_speed_mbps,
                    want,
                    &format!("fabric zones on {}", spine.name),
                )?;

                for (leaf_slot, spine_slot) in
                    uplink_slots[offset..offset + want].iter().zip(&spine_slots)
                {
                    let leaf_if = InterfaceRepo::get_or_create(
                        &mut *conn,
                        leaf.id,
                        &leaf_slot.label,
                        leaf_slot.speed_mbps,
                        plan.id,
                    )
                    .await?;
                    let spine_if = InterfaceRepo::get_or_create(
                        &mut *conn,
                        spine.id,
                        &spine_slot.label,
                        spine_slot.speed_mbps,
                        plan.id,
                    )
                    .await?;
                    LinkRepo::create(&mut *conn, leaf_if.id, spine_if.id, plan.id).await?;
                    links_created += 1;
                }
                offset += want;
            }
        }
        tracing::info!(
            "Fan-out wired {} fabric: {} leaves across {} spines",
            fabric,
            leaves.len(),
            spines.len()
        );
    }

    Ok(links_created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fanout_counts_even_split() {
        assert_eq!(fanout_counts(8, 2), vec![4, 4]);
        assert_eq!(fanout_counts(9, 3), vec![3, 3, 3]);
    }

    #[test]
    fn test_fanout_counts_remainder_goes_first() {
        let counts = fanout_counts(32, 3);
        assert_eq!(counts, vec![11, 11, 10]);
        assert_eq!(counts.iter().sum::<usize>(), 32);
    }

    #[test]
    fn test_fanout_counts_fewer_links_than_spines() {
        assert_eq!(fanout_counts(2, 4), vec![1, 1, 0, 0]);
    }
}
