use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Route-table key matching every customer type not named explicitly.
pub const ROUTE_DEFAULT: &str = "default";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SimConfig {
    /// Total simulated duration.
    #[serde(default = "default_end_time")]
    pub end_time: f64,
    /// Base seed for every sampler; omit for entropy seeding.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Advisory per-cycle pacing delay for the paced runner.
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default = "default_points")]
    pub points: Vec<ServicePointConfig>,
    #[serde(default = "default_arrivals")]
    pub arrivals: Vec<ArrivalConfig>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServicePointConfig {
    pub name: String,
    pub distribution: DistributionConfig,
    /// Customer type (or `"default"`) to next point name. A type with no
    /// matching entry leaves the network here.
    #[serde(default)]
    pub routes: HashMap<String, String>,
    /// Whether departures here count as system departures. Defaults to
    /// true for points with no outgoing routes.
    #[serde(default)]
    pub terminal: Option<bool>,
}

impl ServicePointConfig {
    pub fn is_terminal(&self) -> bool {
        self.terminal.unwrap_or_else(|| self.routes.is_empty())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ArrivalConfig {
    pub customer_type: String,
    pub entry_point: String,
    pub distribution: DistributionConfig,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DistributionConfig {
    Exponential { mean: f64 },
    Normal { mean: f64, variance: f64 },
    Uniform { min: f64, max: f64 },
    Constant { value: f64 },
}

impl Default for SimConfig {
    /// The café reference topology: cashier -> barista -> by type to
    /// pickup shelf or delivery window.
    fn default() -> Self {
        Self {
            end_time: default_end_time(),
            seed: None,
            delay_ms: 0,
            points: default_points(),
            arrivals: default_arrivals(),
        }
    }
}

fn default_end_time() -> f64 {
    60.0
}

fn default_points() -> Vec<ServicePointConfig> {
    vec![
        ServicePointConfig {
            name: "cashier".to_string(),
            distribution: DistributionConfig::Exponential { mean: 3.0 },
            routes: HashMap::from([(ROUTE_DEFAULT.to_string(), "barista".to_string())]),
            terminal: None,
        },
        ServicePointConfig {
            name: "barista".to_string(),
            distribution: DistributionConfig::Normal {
                mean: 4.5,
                variance: 1.2,
            },
            routes: HashMap::from([
                ("instore".to_string(), "pickup-shelf".to_string()),
                ("mobile".to_string(), "delivery-window".to_string()),
            ]),
            terminal: None,
        },
        ServicePointConfig {
            name: "pickup-shelf".to_string(),
            distribution: DistributionConfig::Uniform { min: 1.0, max: 2.5 },
            routes: HashMap::new(),
            terminal: None,
        },
        ServicePointConfig {
            name: "delivery-window".to_string(),
            distribution: DistributionConfig::Constant { value: 4.0 },
            routes: HashMap::new(),
            terminal: None,
        },
    ]
}

fn default_arrivals() -> Vec<ArrivalConfig> {
    vec![
        ArrivalConfig {
            customer_type: "instore".to_string(),
            entry_point: "cashier".to_string(),
            distribution: DistributionConfig::Exponential { mean: 4.0 },
        },
        ArrivalConfig {
            customer_type: "mobile".to_string(),
            entry_point: "barista".to_string(),
            distribution: DistributionConfig::Exponential { mean: 6.0 },
        },
    ]
}

/// Rejects distribution parameters that could stall a service point or
/// are outright nonsense. Never coerces; the caller sees the error.
pub fn validate_distribution(context: &str, config: &DistributionConfig) -> Result<()> {
    match *config {
        DistributionConfig::Exponential { mean } => {
            if !(mean > 0.0) || !mean.is_finite() {
                return Err(Error::NonPositiveMean {
                    context: context.to_string(),
                    value: mean,
                });
            }
        }
        DistributionConfig::Normal { mean, variance } => {
            if !(mean > 0.0) || !mean.is_finite() {
                return Err(Error::NonPositiveMean {
                    context: context.to_string(),
                    value: mean,
                });
            }
            if !(variance > 0.0) || !variance.is_finite() {
                return Err(Error::NonPositiveVariance {
                    context: context.to_string(),
                    value: variance,
                });
            }
        }
        DistributionConfig::Uniform { min, max } => {
            if !(min >= 0.0 && min < max) || !min.is_finite() || !max.is_finite() {
                return Err(Error::InvalidUniformBounds {
                    context: context.to_string(),
                    min,
                    max,
                });
            }
        }
        DistributionConfig::Constant { value } => {
            if !(value > 0.0) || !value.is_finite() {
                return Err(Error::NonPositiveConstant {
                    context: context.to_string(),
                    value,
                });
            }
        }
    }
    Ok(())
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.end_time > 0.0) || !self.end_time.is_finite() {
            return Err(Error::InvalidEndTime(self.end_time));
        }
        if self.points.is_empty() {
            return Err(Error::EmptyServicePoints);
        }
        if self.arrivals.is_empty() {
            return Err(Error::EmptyArrivals);
        }

        let mut point_names = HashSet::new();
        for point in &self.points {
            if !point_names.insert(point.name.as_str()) {
                return Err(Error::DuplicatePointName(point.name.clone()));
            }
            validate_distribution(&point.name, &point.distribution)?;
        }

        let mut customer_types = HashSet::new();
        for arrival in &self.arrivals {
            if !customer_types.insert(arrival.customer_type.as_str()) {
                return Err(Error::DuplicateCustomerType(arrival.customer_type.clone()));
            }
            if !point_names.contains(arrival.entry_point.as_str()) {
                return Err(Error::UnknownEntryPoint {
                    customer_type: arrival.customer_type.clone(),
                    entry_point: arrival.entry_point.clone(),
                });
            }
            let context = format!("{} arrivals", arrival.customer_type);
            validate_distribution(&context, &arrival.distribution)?;
        }

        for point in &self.points {
            for (customer_type, target) in &point.routes {
                if customer_type != ROUTE_DEFAULT
                    && !customer_types.contains(customer_type.as_str())
                {
                    return Err(Error::UnknownRouteType {
                        point: point.name.clone(),
                        customer_type: customer_type.clone(),
                    });
                }
                if !point_names.contains(target.as_str()) {
                    return Err(Error::UnknownRouteTarget {
                        point: point.name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
