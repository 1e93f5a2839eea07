use serde::{Deserialize, Serialize};

/// Fabric domain a switch class belongs to. Fan-out pairs leaves and spines
/// within one domain and never across domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fabric {
    Frontend,
    Backend,
    OutOfBand,
}

impl Fabric {
    pub const ALL: [Fabric; 3] = [Fabric::Frontend, Fabric::Backend, Fabric::OutOfBand];

    pub fn as_str(&self) -> &'static str {
        match self {
            Fabric::Frontend => "frontend",
            Fabric::Backend => "backend",
            Fabric::OutOfBand => "out-of-band",
        }
    }
}

impl std::fmt::Display for Fabric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role a switch class plays in its fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwitchRole {
    Leaf,
    BorderLeaf,
    Spine,
    Virtual,
}

impl SwitchRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchRole::Leaf => "leaf",
            SwitchRole::BorderLeaf => "border-leaf",
            SwitchRole::Spine => "spine",
            SwitchRole::Virtual => "virtual",
        }
    }

    /// Naming category for this role.
    pub fn category(&self) -> DeviceCategory {
        match self {
            SwitchRole::Spine => DeviceCategory::Spine,
            SwitchRole::BorderLeaf => DeviceCategory::Border,
            SwitchRole::Virtual => DeviceCategory::Oob,
            SwitchRole::Leaf => DeviceCategory::Leaf,
        }
    }

    /// Leaves and border-leaves take the leaf side of fabric fan-out.
    pub fn is_fanout_leaf(&self) -> bool {
        matches!(self, SwitchRole::Leaf | SwitchRole::BorderLeaf)
    }
}

impl std::fmt::Display for SwitchRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device category used for naming-template lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceCategory {
    Server,
    Leaf,
    Spine,
    Border,
    Oob,
}

impl DeviceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceCategory::Server => "server",
            DeviceCategory::Leaf => "leaf",
            DeviceCategory::Spine => "spine",
            DeviceCategory::Border => "border",
            DeviceCategory::Oob => "oob",
        }
    }
}

/// What a port zone's ports face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneType {
    Server,
    Uplink,
    Fabric,
    OutOfBand,
    Session,
    Peer,
}

/// Order in which a zone's physical ports are consumed, applied before
/// breakout expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingStrategy {
    /// Ascending physical order.
    Sequential,
    /// Odd positions first, then even — spreads allocation across the range.
    Interleaved,
    /// Alternate between the two halves of the range — spreads even faster
    /// across physical distance.
    Spaced,
    /// Caller-supplied order; must be a permutation of the zone's port set.
    Custom(Vec<u16>),
}

impl Default for OrderingStrategy {
    fn default() -> Self {
        OrderingStrategy::Sequential
    }
}

/// How a server connection's ports are spread over the target switch class.
/// Unrecognized strategy strings deserialize to `Other` and behave like
/// `SameSwitch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DistributionStrategy {
    Alternating,
    SameSwitch,
    RailOptimized,
    Other(String),
}

impl Default for DistributionStrategy {
    fn default() -> Self {
        DistributionStrategy::SameSwitch
    }
}

impl DistributionStrategy {
    pub fn as_str(&self) -> &str {
        match self {
            DistributionStrategy::Alternating => "alternating",
            DistributionStrategy::SameSwitch => "same-switch",
            DistributionStrategy::RailOptimized => "rail-optimized",
            DistributionStrategy::Other(s) => s,
        }
    }
}

impl From<String> for DistributionStrategy {
    fn from(s: String) -> Self {
        match s.as_str() {
            "alternating" => DistributionStrategy::Alternating,
            "same-switch" => DistributionStrategy::SameSwitch,
            "rail-optimized" => DistributionStrategy::RailOptimized,
            _ => DistributionStrategy::Other(s),
        }
    }
}

impl From<DistributionStrategy> for String {
    fn from(s: DistributionStrategy) -> Self {
        s.as_str().to_string()
    }
}

/// One optical breakout rule: a physical port at `from_speed_mbps` expands
/// into `logical_ports` lanes of `logical_speed_mbps` each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakoutOption {
    pub from_speed_mbps: u32,
    pub logical_ports: u8,
    pub logical_speed_mbps: u32,
    #[serde(default)]
    pub optic: String,
}

/// A named region of a switch's ports with its own breakout, ordering and
/// priority. `port_spec` is the textual range expression parsed by
/// `ports::spec::parse_port_spec`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortZone {
    pub name: String,
    pub zone_type: ZoneType,
    pub port_spec: String,
    #[serde(default)]
    pub breakout: Option<BreakoutOption>,
    #[serde(default)]
    pub ordering: OrderingStrategy,
    #[serde(default)]
    pub speed_mbps: Option<u32>,
    #[serde(default)]
    pub priority: i32,
}

impl PortZone {
    /// Interface speed served by this zone: breakout lane speed, else the
    /// zone's own override, else the switch's native speed.
    pub fn effective_speed_mbps(&self, native_speed_mbps: u32) -> u32 {
        match &self.breakout {
            Some(b) => b.logical_speed_mbps,
            None => self.speed_mbps.unwrap_or(native_speed_mbps),
        }
    }
}

/// Hardware capabilities of a switch class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchCapability {
    pub native_speed_mbps: u32,
    #[serde(default)]
    pub breakout_modes: Vec<BreakoutOption>,
    #[serde(default)]
    pub mclag: bool,
}

/// A template instantiated into `quantity` identical switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchClass {
    pub id: String,
    pub fabric: Fabric,
    pub role: SwitchRole,
    pub capability: SwitchCapability,
    pub quantity: i32,
    #[serde(default)]
    pub zones: Vec<PortZone>,
}

/// An interface a server of some device type carries from the factory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceTemplate {
    pub name: String,
    pub speed_mbps: u32,
}

/// A server hardware model and the interfaces it declares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceType {
    pub id: String,
    #[serde(default)]
    pub interfaces: Vec<InterfaceTemplate>,
}

/// One connection intent on a server class: how many ports, at what speed,
/// to which switch class, spread how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDefinition {
    pub id: String,
    pub ports: u8,
    pub speed_mbps: u32,
    #[serde(default)]
    pub bundled: bool,
    #[serde(default)]
    pub strategy: DistributionStrategy,
    pub target_switch_class: String,
    #[serde(default)]
    pub rail: Option<u32>,
    #[serde(default)]
    pub interface_template: Option<String>,
    #[serde(default)]
    pub legacy_slot: Option<String>,
}

/// A template instantiated into `quantity` identical servers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerClass {
    pub id: String,
    pub quantity: i32,
    pub device_type: DeviceType,
    #[serde(default)]
    pub connections: Vec<ConnectionDefinition>,
}

/// A name template override for one device category. Placeholders `{class}`
/// and `{index}`, the latter with an optional zero-pad width (`{index:03d}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingTemplate {
    pub category: DeviceCategory,
    pub template: String,
}

/// The declarative input to a generation run. Read-only for its duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyPlan {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub switch_classes: Vec<SwitchClass>,
    #[serde(default)]
    pub server_classes: Vec<ServerClass>,
    #[serde(default)]
    pub naming_templates: Vec<NamingTemplate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_roundtrip_and_fallback() {
        let s: DistributionStrategy = String::from("rail-optimized").into();
        assert_eq!(s, DistributionStrategy::RailOptimized);
        let s: DistributionStrategy = String::from("round-robin").into();
        assert_eq!(s, DistributionStrategy::Other("round-robin".to_string()));
        assert_eq!(s.as_str(), "round-robin");
    }

    #[test]
    fn test_effective_speed_prefers_breakout() {
        let mut zone = PortZone {
            name: "servers".to_string(),
            zone_type: ZoneType::Server,
            port_spec: "1-4".to_string(),
            breakout: None,
            ordering: OrderingStrategy::Sequential,
            speed_mbps: None,
            priority: 0,
        };
        assert_eq!(zone.effective_speed_mbps(100_000), 100_000);
        zone.speed_mbps = Some(10_000);
        assert_eq!(zone.effective_speed_mbps(100_000), 10_000);
        zone.breakout = Some(BreakoutOption {
            from_speed_mbps: 100_000,
            logical_ports: 4,
            logical_speed_mbps: 25_000,
            optic: String::new(),
        });
        assert_eq!(zone.effective_speed_mbps(100_000), 25_000);
    }

    #[test]
    fn test_role_categories() {
        assert_eq!(SwitchRole::Spine.category(), DeviceCategory::Spine);
        assert_eq!(SwitchRole::BorderLeaf.category(), DeviceCategory::Border);
        assert_eq!(SwitchRole::Virtual.category(), DeviceCategory::Oob);
        assert_eq!(SwitchRole::Leaf.category(), DeviceCategory::Leaf);
        assert!(SwitchRole::BorderLeaf.is_fanout_leaf());
        assert!(!SwitchRole::Spine.is_fanout_leaf());
    }
}
