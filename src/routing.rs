use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::{SimConfig, ROUTE_DEFAULT};

/// Static routing table resolved from config: `(point, customer type)` to
/// the next point, or `None` where the customer leaves the network.
/// Alternate topologies are a configuration change, not a code change.
#[derive(Clone, Debug)]
pub struct RouteTable {
    next: Vec<Vec<Option<usize>>>,
    terminal: Vec<bool>,
    type_names: Vec<String>,
}

impl RouteTable {
    pub fn build(config: &SimConfig) -> Result<Self> {
        let point_index: HashMap<&str, usize> = config
            .points
            .iter()
            .enumerate()
            .map(|(idx, point)| (point.name.as_str(), idx))
            .collect();
        let type_names: Vec<String> = config
            .arrivals
            .iter()
            .map(|arrival| arrival.customer_type.clone())
            .collect();

        let mut next = Vec::with_capacity(config.points.len());
        for point in &config.points {
            let resolve = |target: &String| -> Result<usize> {
                point_index
                    .get(target.as_str())
                    .copied()
                    .ok_or_else(|| Error::UnknownRouteTarget {
                        point: point.name.clone(),
                        target: target.clone(),
                    })
            };
            let default_next = match point.routes.get(ROUTE_DEFAULT) {
                Some(target) => Some(resolve(target)?),
                None => None,
            };
            let mut per_type = Vec::with_capacity(type_names.len());
            for type_name in &type_names {
                match point.routes.get(type_name) {
                    Some(target) => per_type.push(Some(resolve(target)?)),
                    None => per_type.push(default_next),
                }
            }
            next.push(per_type);
        }

        let terminal = config.points.iter().map(|p| p.is_terminal()).collect();
        Ok(Self {
            next,
            terminal,
            type_names,
        })
    }

    pub fn next_point(&self, from: usize, customer_type: usize) -> Option<usize> {
        self.next[from][customer_type]
    }

    pub fn is_terminal(&self, point: usize) -> bool {
        self.terminal[point]
    }

    pub fn point_count(&self) -> usize {
        self.next.len()
    }

    pub fn type_count(&self) -> usize {
        self.type_names.len()
    }

    pub fn type_name(&self, customer_type: usize) -> &str {
        &self.type_names[customer_type]
    }

    pub fn type_index(&self, name: &str) -> Option<usize> {
        self.type_names.iter().position(|t| t == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SimConfig;

    // Default café topology: cashier(0) -> barista(1) -> by type to
    // pickup-shelf(2) / delivery-window(3).
    #[test]
    fn cafe_topology_resolves_by_type() {
        let table = RouteTable::build(&SimConfig::default()).unwrap();
        let instore = table.type_index("instore").unwrap();
        let mobile = table.type_index("mobile").unwrap();

        assert_eq!(table.next_point(0, instore), Some(1));
        assert_eq!(table.next_point(0, mobile), Some(1));
        assert_eq!(table.next_point(1, instore), Some(2));
        assert_eq!(table.next_point(1, mobile), Some(3));
        assert_eq!(table.next_point(2, instore), None);
        assert_eq!(table.next_point(3, mobile), None);
    }

    #[test]
    fn terminal_flags_follow_config() {
        let table = RouteTable::build(&SimConfig::default()).unwrap();
        assert!(!table.is_terminal(0));
        assert!(!table.is_terminal(1));
        assert!(table.is_terminal(2));
        assert!(table.is_terminal(3));
    }

    #[test]
    fn explicit_type_route_overrides_default() {
        let mut config = SimConfig::default();
        config.points[0]
            .routes
            .insert("mobile".to_string(), "delivery-window".to_string());
        let table = RouteTable::build(&config).unwrap();
        let instore = table.type_index("instore").unwrap();
        let mobile = table.type_index("mobile").unwrap();
        assert_eq!(table.next_point(0, instore), Some(1));
        assert_eq!(table.next_point(0, mobile), Some(3));
    }

    #[test]
    fn unknown_target_is_an_error() {
        let mut config = SimConfig::default();
        config.points[0]
            .routes
            .insert("default".to_string(), "void".to_string());
        assert!(RouteTable::build(&config).is_err());
    }
}
