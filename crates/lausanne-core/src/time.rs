//! Fixed-timestep tick accounting for the NPC simulation

use serde::{Deserialize, Serialize};

/// Errors raised by timing configuration
#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid timestep: {0}")]
    InvalidTimestep(f32),

    #[error("Max delta {max} is smaller than the timestep {step}")]
    DeltaBelowTimestep { max: f32, step: f32 },
}

/// Configuration for simulation ticks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Fixed timestep (in seconds) handed to every NPC tick
    pub fixed_timestep: f32,
    /// Maximum delta time to prevent spiral of death
    pub max_delta_time: f32,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_delta_time: 0.25,
        }
    }
}

impl TickConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.fixed_timestep.is_nan() || self.fixed_timestep <= 0.0 {
            return Err(CoreError::InvalidTimestep(self.fixed_timestep));
        }
        if self.max_delta_time < self.fixed_timestep {
            return Err(CoreError::DeltaBelowTimestep {
                max: self.max_delta_time,
                step: self.fixed_timestep,
            });
        }
        Ok(())
    }
}

/// Simulation clock that converts raw frame deltas into fixed steps
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    pub config: TickConfig,
    /// Total simulated time in seconds
    pub total_time: f64,
    /// Number of fixed steps handed out so far
    pub step_count: u64,
    accumulator: f32,
}

impl SimClock {
    pub fn new(config: TickConfig) -> Result<Self, CoreError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    /// Feed the raw delta of a frame and get the number of fixed steps to run
    pub fn advance(&mut self, raw_delta: f32) -> u32 {
        let delta = raw_delta.clamp(0.0, self.config.max_delta_time);
        self.accumulator += delta;
        self.total_time += delta as f64;

        let mut steps = 0;
        while self.accumulator >= self.config.fixed_timestep {
            self.accumulator -= self.config.fixed_timestep;
            steps += 1;
        }
        self.step_count += steps as u64;
        steps
    }

    pub fn timestep(&self) -> f32 {
        self.config.fixed_timestep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(TickConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_timestep() {
        let config = TickConfig {
            fixed_timestep: 0.0,
            max_delta_time: 0.25,
        };
        assert!(matches!(config.validate(), Err(CoreError::InvalidTimestep(_))));
    }

    #[test]
    fn test_clock_steps() {
        let mut clock = SimClock::new(TickConfig {
            fixed_timestep: 0.25,
            max_delta_time: 1.0,
        })
        .unwrap();
        assert_eq!(clock.advance(0.5), 2);
        assert_eq!(clock.advance(0.125), 0);
        assert_eq!(clock.advance(0.125), 1);
        assert_eq!(clock.step_count, 3);
    }

    #[test]
    fn test_clock_clamps_large_delta() {
        let mut clock = SimClock::new(TickConfig {
            fixed_timestep: 0.25,
            max_delta_time: 0.5,
        })
        .unwrap();
        assert_eq!(clock.advance(10.0), 2);
    }
}
