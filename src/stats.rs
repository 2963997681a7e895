use serde::Serialize;

use crate::observer::SimulationObserver;
use crate::state::Customer;

/// Passive observer of the run loop's arrival/departure/routing
/// notifications. Aggregates per-point and system-wide counters; metrics
/// are derived on demand from an immutable snapshot.
#[derive(Debug, Default)]
pub struct StatisticsCollector {
    points: Vec<PointRecord>,
    system_arrivals: u64,
    system_departures: u64,
    total_service_time: f64,
    total_wait_time: f64,
    total_response_time: f64,
}

#[derive(Debug)]
struct PointRecord {
    name: String,
    terminal: bool,
    arrivals: u64,
    completions: u64,
    total_service_time: f64,
}

impl PointRecord {
    fn new(name: String, terminal: bool) -> Self {
        Self {
            name,
            terminal,
            arrivals: 0,
            completions: 0,
            total_service_time: 0.0,
        }
    }
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the next point in index order. Points never registered
    /// get a placeholder record on first notification.
    pub fn register_point(&mut self, name: &str, terminal: bool) {
        self.points
            .push(PointRecord::new(name.to_string(), terminal));
    }

    fn ensure_point(&mut self, point: usize) -> &mut PointRecord {
        while self.points.len() <= point {
            let name = format!("point-{}", self.points.len());
            self.points.push(PointRecord::new(name, false));
        }
        &mut self.points[point]
    }

    /// Clears every counter. Must run before each simulation to avoid
    /// cross-run contamination.
    pub fn reset(&mut self) {
        self.system_arrivals = 0;
        self.system_departures = 0;
        self.total_service_time = 0.0;
        self.total_wait_time = 0.0;
        self.total_response_time = 0.0;
        for record in &mut self.points {
            record.arrivals = 0;
            record.completions = 0;
            record.total_service_time = 0.0;
        }
    }

    pub fn record_arrival(&mut self, _customer: &Customer, point: usize) {
        self.ensure_point(point).arrivals += 1;
        self.system_arrivals += 1;
    }

    pub fn record_routing(&mut self, _customer: &Customer, _from: usize, to: Option<usize>) {
        if let Some(to) = to {
            self.ensure_point(to).arrivals += 1;
        }
    }

    /// Per-point completion is counted at every stage; the system-wide
    /// departure only when the stage is terminal, using the customer's
    /// cumulative multi-stage service duration.
    pub fn record_departure(&mut self, customer: &Customer, point: usize, service_time: f64) {
        let record = self.ensure_point(point);
        record.completions += 1;
        record.total_service_time += service_time;

        if record.terminal {
            self.system_departures += 1;
            self.total_service_time += customer.total_service_duration();
            self.total_response_time += customer.response_time();
            self.total_wait_time += customer.total_waiting_time();
        }
    }

    pub fn snapshot(&self, simulation_time: f64) -> SimulationStats {
        SimulationStats {
            simulation_time,
            total_arrivals: self.system_arrivals,
            total_departures: self.system_departures,
            total_service_time: self.total_service_time,
            total_wait_time: self.total_wait_time,
            total_response_time: self.total_response_time,
            points: self
                .points
                .iter()
                .map(|record| ServicePointStats {
                    name: record.name.clone(),
                    arrivals: record.arrivals,
                    completions: record.completions,
                    total_service_time: record.total_service_time,
                })
                .collect(),
        }
    }
}

impl SimulationObserver for StatisticsCollector {
    fn on_arrival(&mut self, customer: &Customer, point: usize) {
        self.record_arrival(customer, point);
    }

    fn on_departure(
        &mut self,
        customer: &Customer,
        point: usize,
        _wait_time: f64,
        service_time: f64,
    ) {
        self.record_departure(customer, point, service_time);
    }

    fn on_routing(&mut self, customer: &Customer, from: usize, to: Option<usize>) {
        self.record_routing(customer, from, to);
    }
}

/// Immutable aggregate over the closed window `[0, simulation_time]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationStats {
    pub simulation_time: f64,
    pub total_arrivals: u64,
    pub total_departures: u64,
    pub total_service_time: f64,
    pub total_wait_time: f64,
    pub total_response_time: f64,
    pub points: Vec<ServicePointStats>,
}

impl SimulationStats {
    pub fn average_waiting_time(&self) -> f64 {
        ratio(self.total_wait_time, self.total_departures as f64)
    }

    pub fn average_response_time(&self) -> f64 {
        ratio(self.total_response_time, self.total_departures as f64)
    }

    pub fn average_service_time(&self) -> f64 {
        ratio(self.total_service_time, self.total_departures as f64)
    }

    /// Completed customers per unit simulated time.
    pub fn throughput(&self) -> f64 {
        if self.simulation_time <= 0.0 {
            return 0.0;
        }
        self.total_departures as f64 / self.simulation_time
    }

    /// Little's-law estimate of mean customers in the system.
    pub fn average_in_system(&self) -> f64 {
        if self.simulation_time <= 0.0 {
            return 0.0;
        }
        self.total_response_time / self.simulation_time
    }

    pub fn system_utilization(&self) -> f64 {
        if self.simulation_time <= 0.0 {
            return 0.0;
        }
        self.total_service_time / self.simulation_time
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ServicePointStats {
    pub name: String,
    pub arrivals: u64,
    pub completions: u64,
    pub total_service_time: f64,
}

impl ServicePointStats {
    /// Fraction of elapsed simulated time the point was busy. Accumulated
    /// service equals busy time since a point serves one customer at a
    /// time.
    pub fn utilization(&self, simulation_time: f64) -> f64 {
        if simulation_time <= 0.0 {
            return 0.0;
        }
        self.total_service_time / simulation_time
    }

    pub fn throughput(&self, simulation_time: f64) -> f64 {
        if simulation_time <= 0.0 {
            return 0.0;
        }
        self.completions as f64 / simulation_time
    }

    pub fn mean_service_time(&self) -> f64 {
        ratio(self.total_service_time, self.completions as f64)
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CustomerStore;

    fn collector_with_points() -> StatisticsCollector {
        let mut collector = StatisticsCollector::new();
        collector.register_point("cashier", false);
        collector.register_point("shelf", true);
        collector
    }

    #[test]
    fn terminal_departure_counts_once_with_cumulative_service() {
        let mut collector = collector_with_points();
        let mut customers = CustomerStore::new();
        let id = customers.create(0, 0.0);

        // Stage 1 at the cashier: 0.0 -> 2.0.
        {
            let c = customers.get_mut(id);
            c.service_start_time = Some(0.0);
            c.service_end_time = Some(2.0);
            c.add_service_duration(2.0);
        }
        collector.record_arrival(customers.get(id), 0);
        collector.record_departure(customers.get(id), 0, 2.0);
        collector.record_routing(customers.get(id), 0, Some(1));

        // Stage 2 at the shelf: waited until 3.0, served until 4.5.
        {
            let c = customers.get_mut(id);
            c.service_start_time = Some(3.0);
            c.service_end_time = Some(4.5);
            c.add_service_duration(1.5);
        }
        collector.record_departure(customers.get(id), 1, 1.5);

        let stats = collector.snapshot(10.0);
        assert_eq!(stats.total_arrivals, 1);
        assert_eq!(stats.total_departures, 1);
        assert_eq!(stats.total_service_time, 3.5);
        assert_eq!(stats.total_response_time, 4.5);
        assert_eq!(stats.total_wait_time, 1.0);

        assert_eq!(stats.points[0].arrivals, 1);
        assert_eq!(stats.points[0].completions, 1);
        assert_eq!(stats.points[1].arrivals, 1);
        assert_eq!(stats.points[1].completions, 1);
        assert_eq!(stats.points[1].total_service_time, 1.5);
    }

    #[test]
    fn non_terminal_departures_do_not_count_system_wide() {
        let mut collector = collector_with_points();
        let mut customers = CustomerStore::new();
        let id = customers.create(0, 0.0);
        collector.record_departure(customers.get(id), 0, 1.0);

        let stats = collector.snapshot(5.0);
        assert_eq!(stats.total_departures, 0);
        assert_eq!(stats.points[0].completions, 1);
    }

    #[test]
    fn metrics_are_zero_for_non_positive_simulation_time() {
        let collector = collector_with_points();
        let stats = collector.snapshot(0.0);
        assert_eq!(stats.throughput(), 0.0);
        assert_eq!(stats.system_utilization(), 0.0);
        assert_eq!(stats.average_in_system(), 0.0);
        assert_eq!(stats.points[0].utilization(0.0), 0.0);
        assert_eq!(stats.points[0].throughput(-1.0), 0.0);
    }

    #[test]
    fn averages_are_zero_without_departures() {
        let stats = collector_with_points().snapshot(10.0);
        assert_eq!(stats.average_waiting_time(), 0.0);
        assert_eq!(stats.average_response_time(), 0.0);
        assert_eq!(stats.average_service_time(), 0.0);
        assert_eq!(stats.points[0].mean_service_time(), 0.0);
    }

    #[test]
    fn unregistered_point_gets_a_lazy_record() {
        let mut collector = StatisticsCollector::new();
        let mut customers = CustomerStore::new();
        let id = customers.create(0, 0.0);
        collector.record_arrival(customers.get(id), 3);

        let stats = collector.snapshot(1.0);
        assert_eq!(stats.points.len(), 4);
        assert_eq!(stats.points[3].name, "point-3");
        assert_eq!(stats.points[3].arrivals, 1);
    }

    #[test]
    fn reset_clears_all_counters() {
        let mut collector = collector_with_points();
        let mut customers = CustomerStore::new();
        let id = customers.create(0, 0.0);
        collector.record_arrival(customers.get(id), 0);
        collector.record_departure(customers.get(id), 1, 1.0);

        collector.reset();
        let stats = collector.snapshot(1.0);
        assert_eq!(stats.total_arrivals, 0);
        assert_eq!(stats.total_departures, 0);
        assert_eq!(stats.points[0].arrivals, 0);
        assert_eq!(stats.points[1].completions, 0);
    }
}
