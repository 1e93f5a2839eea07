use anyhow::Result;

use crate::error::TopologyError;
use crate::models::DistributionStrategy;

/// Pick which of `candidates` switch instances one (server, port) pair
/// lands on. Pure function of its inputs; `entity` labels errors.
///
/// A single candidate always wins regardless of strategy. Rail-optimized
/// selection requires both the rail number and the distinct rail count for
/// the (server class, switch class) pair — missing either is a plan error,
/// not a retryable condition. Unrecognized strategies behave like
/// same-switch.
pub fn select_switch_index(
    strategy: &DistributionStrategy,
    candidates: usize,
    server_index: usize,
    port_index: usize,
    rail: Option<u32>,
    total_rails: Option<u32>,
    entity: &str,
) -> Result<usize> {
    if candidates == 0 {
        return Err(TopologyError::configuration(
            entity,
            "target switch class has no effective instances",
        )
        .into());
    }
    if candidates == 1 {
        return Ok(0);
    }

    match strategy {
        DistributionStrategy::Alternating => Ok(port_index % candidates),
        DistributionStrategy::RailOptimized => {
            let rail = rail.ok_or_else(|| {
                TopologyError::configuration(
                    entity,
                    "rail-optimized connection is missing its rail number",
                )
            })?;
            let total = total_rails.filter(|t| *t > 0).ok_or_else(|| {
                TopologyError::configuration(
                    entity,
                    "rail-optimized connection is missing the total rail count",
                )
            })?;
            // ceil(total / candidates) rails per switch
            let rails_per_switch = (total as usize + candidates - 1) / candidates;
            let index = rail as usize / rails_per_switch;
            if index >= candidates {
                return Err(TopologyError::configuration(
                    entity,
                    format!("rail {} exceeds the declared rail count {}", rail, total),
                )
                .into());
            }
            Ok(index)
        }
        DistributionStrategy::SameSwitch | DistributionStrategy::Other(_) => {
            Ok(server_index % candidates)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_candidate_short_circuits() {
        // Even a rail-optimized connection with no rail data lands on a
        // lone candidate.
        let idx = select_switch_index(
            &DistributionStrategy::RailOptimized,
            1,
            4,
            2,
            None,
            None,
            "conn",
        )
        .unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn test_alternating_uses_port_index() {
        for port in 0..6 {
            let idx = select_switch_index(
                &DistributionStrategy::Alternating,
                3,
                9,
                port,
                None,
                None,
                "conn",
            )
            .unwrap();
            assert_eq!(idx, port % 3);
        }
    }

    #[test]
    fn test_same_switch_uses_server_index() {
        for server in 0..6 {
            let idx = select_switch_index(
                &DistributionStrategy::SameSwitch,
                4,
                server,
                1,
                None,
                None,
                "conn",
            )
            .unwrap();
            assert_eq!(idx, server % 4);
        }
    }

    #[test]
    fn test_rail_optimized_mapping() {
        // 8 rails over 4 switches: two consecutive rails per switch.
        for (rail, expected) in [(0, 0), (1, 0), (2, 1), (3, 1), (4, 2), (5, 2), (6, 3), (7, 3)] {
            let idx = select_switch_index(
                &DistributionStrategy::RailOptimized,
                4,
                0,
                0,
                Some(rail),
                Some(8),
                "conn",
            )
            .unwrap();
            assert_eq!(idx, expected, "rail {}", rail);
        }
    }

    #[test]
    fn test_rail_optimized_requires_rail_data() {
        let err = select_switch_index(
            &DistributionStrategy::RailOptimized,
            4,
            0,
            0,
            None,
            Some(8),
            "conn",
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TopologyError>(),
            Some(TopologyError::Configuration { .. })
        ));

        let err = select_switch_index(
            &DistributionStrategy::RailOptimized,
            4,
            0,
            0,
            Some(1),
            None,
            "conn",
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TopologyError>(),
            Some(TopologyError::Configuration { .. })
        ));
    }

    #[test]
    fn test_unknown_strategy_falls_back_to_same_switch() {
        let strategy = DistributionStrategy::Other("round-robin".to_string());
        let idx = select_switch_index(&strategy, 3, 5, 0, None, None, "conn").unwrap();
        assert_eq!(idx, 5 % 3);
    }

    #[test]
    fn test_zero_candidates_is_an_error() {
        assert!(select_switch_index(
            &DistributionStrategy::SameSwitch,
            0,
            0,
            0,
            None,
            None,
            "conn"
        )
        .is_err());
    }
}
