mod distribution;
mod fanout;
mod naming;

pub use distribution::select_switch_index;
pub use fanout::fanout_counts;
pub use naming::{render_template, NameResolver, DEFAULT_SERVER_TEMPLATE, DEFAULT_SWITCH_TEMPLATE};

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::Result;
use sqlx::SqliteConnection;

use crate::db::{DeviceRepo, InterfaceRepo, LinkRepo, Store, SummaryRepo};
use crate::error::TopologyError;
use crate::models::*;
use crate::ports::{PortAllocator, PortSlot};
use crate::utils;

/// Compiles a topology plan into a concrete wired inventory: switch and
/// server devices, their interfaces, and the links between them.
///
/// A run is idempotent — everything previously generated for the plan is
/// removed first, and the whole run executes inside one transaction, so a
/// failure leaves the store exactly as it was. The allocator is fresh per
/// run; nothing here is safe for concurrent callers on the same plan.
pub struct TopologyGenerator {
    store: Store,
}

impl TopologyGenerator {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn generate(&self, plan: &TopologyPlan) -> Result<GenerationSummary> {
        tracing::info!("Generating topology for plan {} '{}'", plan.id, plan.name);

        let settings = self.store.get_settings().await?;
        let names = NameResolver::new(&plan.naming_templates, &settings);
        let mut allocator = PortAllocator::new();

        let class_index: HashMap<&str, &SwitchClass> = plan
            .switch_classes
            .iter()
            .map(|c| (c.id.as_str(), c))
            .collect();
        let rail_counts = derive_rail_counts(plan);

        let mut tx = self.store.begin().await?;

        // ── 1. Reset: links, then interfaces, then devices, all by tag ──
        let links_removed = LinkRepo::delete_for_plan(&mut tx, plan.id).await?;
        let interfaces_removed = InterfaceRepo::delete_for_plan(&mut tx, plan.id).await?;
        let devices_removed = DeviceRepo::delete_for_plan(&mut tx, plan.id).await?;
        if devices_removed > 0 {
            tracing::info!(
                "Reset plan {}: removed {} links, {} interfaces, {} devices",
                plan.id,
                links_removed,
                interfaces_removed,
                devices_removed
            );
        }

        // ── 2. Switch instances ──
        let mut switches_by_class: HashMap<String, Vec<Device>> = HashMap::new();
        for class in &plan.switch_classes {
            let category = class.role.category();
            for index in 1..=class.quantity {
                let name = names.render(category, &class.id, index);
                let mac = utils::derive_mac(&name);
                let device = DeviceRepo::create(
                    &mut tx,
                    &CreateDeviceRequest {
                        name,
                        kind: device_kind::SWITCH.to_string(),
                        mac: Some(mac),
                        plan_id: plan.id,
                        class_id: class.id.clone(),
                        fabric: Some(class.fabric.as_str().to_string()),
                        role: Some(class.role.as_str().to_string()),
                    },
                )
                .await?;
                switches_by_class.entry(class.id.clone()).or_default().push(device);
            }
        }

        // ── 3. Server instances, with their device-type interfaces ──
        let mut servers_by_class: HashMap<String, Vec<Device>> = HashMap::new();
        for class in &plan.server_classes {
            for index in 1..=class.quantity {
                let name = names.render(DeviceCategory::Server, &class.id, index);
                let device = DeviceRepo::create(
                    &mut tx,
                    &CreateDeviceRequest {
                        name,
                        kind: device_kind::SERVER.to_string(),
                        mac: None,
                        plan_id: plan.id,
                        class_id: class.id.clone(),
                        fabric: None,
                        role: None,
                    },
                )
                .await?;
                for template in &class.device_type.interfaces {
                    InterfaceRepo::get_or_create(
                        &mut tx,
                        device.id,
                        &template.name,
                        template.speed_mbps,
                        plan.id,
                    )
                    .await?;
                }
                servers_by_class.entry(class.id.clone()).or_default().push(device);
            }
        }

        // ── 4. Point-to-point server connections ──
        for class in &plan.server_classes {
            let servers = servers_by_class.get(&class.id).cloned().unwrap_or_default();
            for def in &class.connections {
                let entity = format!("connection '{}' on server class '{}'", def.id, class.id);
                let target_class = class_index.get(def.target_switch_class.as_str()).ok_or_else(|| {
                    TopologyError::configuration(
                        &entity,
                        format!("unknown target switch class '{}'", def.target_switch_class),
                    )
                })?;
                let candidates = switches_by_class
                    .get(&target_class.id)
                    .cloned()
                    .unwrap_or_default();
                let zones = connection_zones(target_class, def, &entity)?;
                let total_rails = rail_counts
                    .get(&(class.id.clone(), def.target_switch_class.clone()))
                    .copied();

                for (server_index, server) in servers.iter().enumerate() {
                    for port_index in 0..def.ports as usize {
                        let choice = select_switch_index(
                            &def.strategy,
                            candidates.len(),
                            server_index,
                            port_index,
                            def.rail,
                            total_rails,
                            &entity,
                        )?;
                        let switch = &candidates[choice];
                        let slot = allocate_span(
                            &mut allocator,
                            &switch.name,
                            &zones,
                            target_class.capability.native_speed_mbps,
                            1,
                            &entity,
                        )?
                        .remove(0);

                        let switch_if = InterfaceRepo::get_or_create(
                            &mut tx,
                            switch.id,
                            &slot.label,
                            slot.speed_mbps,
                            plan.id,
                        )
                        .await?;
                        let server_if =
                            resolve_server_interface(&mut tx, server, class, def, port_index, plan.id)
                                .await?;
                        LinkRepo::create(&mut tx, switch_if.id, server_if.id, plan.id).await?;
                    }
                }
            }
        }

        // ── 5. Fabric fan-out ──
        fanout::run_fanout(&mut tx, &mut allocator, plan, &switches_by_class).await?;

        // ── 6. Finalize: counts, snapshot, summary replace ──
        let device_count = DeviceRepo::count_for_plan(&mut tx, plan.id).await?;
        let interface_count = InterfaceRepo::count_for_plan(&mut tx, plan.id).await?;
        let link_count = LinkRepo::count_for_plan(&mut tx, plan.id).await?;
        let snapshot = build_snapshot(
            &switches_by_class,
            &servers_by_class,
            device_count,
            interface_count,
            link_count,
        );
        let summary = SummaryRepo::replace(
            &mut tx,
            &NewSummary {
                plan_id: plan.id,
                status: generation_status::GENERATED.to_string(),
                device_count,
                interface_count,
                link_count,
                snapshot,
            },
        )
        .await?;

        tx.commit().await?;
        tracing::info!(
            "Generated plan {}: {} devices, {} interfaces, {} links",
            plan.id,
            device_count,
            interface_count,
            link_count
        );
        Ok(summary)
    }
}

/// Zones of one type on a class, in scan order: priority, then name.
pub(crate) fn zones_of_type(class: &SwitchClass, zone_type: ZoneType) -> Vec<&PortZone> {
    let mut zones: Vec<&PortZone> = class
        .zones
        .iter()
        .filter(|z| z.zone_type == zone_type)
        .collect();
    zones.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));
    zones
}

/// The zones a connection may draw from on its target class: out-of-band
/// zones for management-class connections, server zones otherwise, narrowed
/// to those serving the connection's speed.
fn connection_zones<'a>(
    target_class: &'a SwitchClass,
    def: &ConnectionDefinition,
    entity: &str,
) -> Result<Vec<&'a PortZone>> {
    let wanted = if target_class.fabric == Fabric::OutOfBand {
        ZoneType::OutOfBand
    } else {
        ZoneType::Server
    };
    let typed = zones_of_type(target_class, wanted);
    if typed.is_empty() {
        return Err(TopologyError::configuration(
            entity,
            format!(
                "switch class '{}' has no {:?} zone to connect to",
                target_class.id, wanted
            ),
        )
        .into());
    }
    let native = target_class.capability.native_speed_mbps;
    let matching: Vec<&PortZone> = typed
        .iter()
        .copied()
        .filter(|z| z.effective_speed_mbps(native) == def.speed_mbps)
        .collect();
    if matching.is_empty() {
        return Err(TopologyError::configuration(
            entity,
            format!(
                "no {:?} zone on switch class '{}' serves {} Mb/s ports; a breakout option may be required",
                wanted, target_class.id, def.speed_mbps
            ),
        )
        .into());
    }
    Ok(matching)
}

/// Allocate `count` slots spanning `zones` in order, pulling from each zone
/// until satisfied. Capacity error when the zones together fall short.
pub(crate) fn allocate_span(
    allocator: &mut PortAllocator,
    switch: &str,
    zones: &[&PortZone],
    native_speed_mbps: u32,
    count: usize,
    entity: &str,
) -> Result<Vec<PortSlot>> {
    let mut out = Vec::with_capacity(count);
    let mut needed = count;
    for zone in zones {
        if needed == 0 {
            break;
        }
        let available = allocator.remaining(switch, zone, native_speed_mbps)?;
        let take = available.min(needed);
        if take > 0 {
            out.extend(allocator.allocate(switch, zone, native_speed_mbps, take)?);
            needed -= take;
        }
    }
    if needed > 0 {
        return Err(TopologyError::capacity(
            entity,
            format!("requested {} port slots on {}, short by {}", count, switch, needed),
        )
        .into());
    }
    Ok(out)
}

/// Distinct rail counts per (server class, target switch class) pair,
/// derived from the plan's rail-optimized connections.
fn derive_rail_counts(plan: &TopologyPlan) -> HashMap<(String, String), u32> {
    let mut rails: HashMap<(String, String), BTreeSet<u32>> = HashMap::new();
    for class in &plan.server_classes {
        for def in &class.connections {
            if def.strategy == DistributionStrategy::RailOptimized {
                if let Some(rail) = def.rail {
                    rails
                        .entry((class.id.clone(), def.target_switch_class.clone()))
                        .or_default()
                        .insert(rail);
                }
            }
        }
    }
    rails.into_iter().map(|(k, v)| (k, v.len() as u32)).collect()
}

/// Pick or create the server-side interface for one connection port.
///
/// Preference order: the port-index-th device-type interface matching the
/// template reference (natural numeric order), then a fresh interface named
/// from the template, then the legacy slot (or the connection id) plus the
/// port index.
async fn resolve_server_interface(
    conn: &mut SqliteConnection,
    server: &Device,
    class: &ServerClass,
    def: &ConnectionDefinition,
    port_index: usize,
    plan_id: i64,
) -> Result<Interface> {
    if let Some(base) = &def.interface_template {
        let mut declared: Vec<&InterfaceTemplate> = class
            .device_type
            .interfaces
            .iter()
            .filter(|t| t.name.starts_with(base.as_str()))
            .collect();
        declared.sort_by(|a, b| utils::natural_cmp(&a.name, &b.name));

        if let Some(template) = declared.get(port_index) {
            return InterfaceRepo::get_or_create(
                conn,
                server.id,
                &template.name,
                template.speed_mbps,
                plan_id,
            )
            .await;
        }
        let name = format!("{}{}", base, port_index);
        return InterfaceRepo::get_or_create(conn, server.id, &name, def.speed_mbps, plan_id).await;
    }

    let name = match &def.legacy_slot {
        Some(slot) => format!("{}{}", slot, port_index),
        None => format!("{}-{}", def.id, port_index),
    };
    InterfaceRepo::get_or_create(conn, server.id, &name, def.speed_mbps, plan_id).await
}

/// Deterministic structural snapshot stored on the summary: sorted maps of
/// class id to device names, plus the totals.
fn build_snapshot(
    switches_by_class: &HashMap<String, Vec<Device>>,
    servers_by_class: &HashMap<String, Vec<Device>>,
    device_count: i64,
    interface_count: i64,
    link_count: i64,
) -> serde_json::Value {
    let names = |by_class: &HashMap<String, Vec<Device>>| -> BTreeMap<String, Vec<String>> {
        by_class
            .iter()
            .map(|(class, devices)| {
                (class.clone(), devices.iter().map(|d| d.name.clone()).collect())
            })
            .collect()
    };
    serde_json::json!({
        "switches": names(switches_by_class),
        "servers": names(servers_by_class),
        "counts": {
            "devices": device_count,
            "interfaces": interface_count,
            "links": link_count,
        },
    })
}
