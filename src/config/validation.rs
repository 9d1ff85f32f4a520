//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::MachineConfig;

/// Validate a machine configuration.
///
/// Checks:
/// - Travel extents are positive
/// - Mat edge margin is positive
/// - Home lead is positive and within the Y travel
/// - Settle, homing and idle delays are non-zero
pub fn validate_config(config: &MachineConfig) -> Result<()> {
    let travel = &config.travel;

    if travel.max_x.value() <= 0 {
        return Err(Error::Config(ConfigError::InvalidTravelExtent {
            axis: 'x',
            value: travel.max_x.value(),
        }));
    }

    if travel.max_y.value() <= 0 {
        return Err(Error::Config(ConfigError::InvalidTravelExtent {
            axis: 'y',
            value: travel.max_y.value(),
        }));
    }

    if travel.mat_edge.value() <= 0 {
        return Err(Error::Config(ConfigError::InvalidMatEdge(
            travel.mat_edge.value(),
        )));
    }

    if travel.home_lead.value() <= 0 || travel.home_lead > travel.max_y {
        return Err(Error::Config(ConfigError::InvalidHomeLead(
            travel.home_lead.value(),
        )));
    }

    let timing = &config.timing;

    if timing.settle_ticks == 0 {
        return Err(Error::Config(ConfigError::InvalidSettleTicks(
            timing.settle_ticks,
        )));
    }

    if timing.home_seek_delay == 0 {
        return Err(Error::Config(ConfigError::InvalidHomingDelay(
            timing.home_seek_delay,
        )));
    }

    if timing.home_release_delay == 0 {
        return Err(Error::Config(ConfigError::InvalidHomingDelay(
            timing.home_release_delay,
        )));
    }

    if timing.idle_timeout_ticks == 0 {
        return Err(Error::Config(ConfigError::InvalidIdleTimeout(
            timing.idle_timeout_ticks,
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::Steps;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&MachineConfig::default()).is_ok());
    }

    #[test]
    fn test_negative_travel_rejected() {
        let mut config = MachineConfig::default();
        config.travel.max_x = Steps(-1);

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidTravelExtent { axis: 'x', .. }))
        ));
    }

    #[test]
    fn test_home_lead_must_fit_travel() {
        let mut config = MachineConfig::default();
        config.travel.home_lead = config.travel.max_y + Steps(1);

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidHomeLead(_)))
        ));
    }

    #[test]
    fn test_zero_settle_rejected() {
        let mut config = MachineConfig::default();
        config.timing.settle_ticks = 0;

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidSettleTicks(0)))
        ));
    }

    #[test]
    fn test_zero_homing_delay_rejected() {
        let mut config = MachineConfig::default();
        config.timing.home_release_delay = 0;

        let result = validate_config(&config);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidHomingDelay(0)))
        ));
    }
}
