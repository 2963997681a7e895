use std::collections::{HashMap, VecDeque};

use crate::generators::DurationSampler;

pub type CustomerId = u64;

/// Current simulation time, owned by the run loop. Advanced only by the
/// A-phase; never decreases except through `reset` at run start.
#[derive(Debug, Default)]
pub struct Clock {
    time: f64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set(&mut self, time: f64) {
        assert!(
            time >= self.time,
            "clock must not go backwards ({} -> {})",
            self.time,
            time
        );
        self.time = time;
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }
}

/// A unit of flow through the network. Timestamps are filled in as the
/// customer progresses; durations derive from them.
#[derive(Clone, Debug)]
pub struct Customer {
    pub id: CustomerId,
    pub customer_type: usize,
    pub arrival_time: f64,
    pub service_start_time: Option<f64>,
    pub service_end_time: Option<f64>,
    total_service_duration: f64,
}

impl Customer {
    fn new(id: CustomerId, customer_type: usize, arrival_time: f64) -> Self {
        Self {
            id,
            customer_type,
            arrival_time,
            service_start_time: None,
            service_end_time: None,
            total_service_duration: 0.0,
        }
    }

    /// Queue wait before the most recent service start; 0 if service has
    /// not started yet.
    pub fn waiting_time(&self) -> f64 {
        match self.service_start_time {
            Some(start) => start - self.arrival_time,
            None => 0.0,
        }
    }

    /// Duration of the most recent completed service stage.
    pub fn service_time(&self) -> f64 {
        match (self.service_start_time, self.service_end_time) {
            (Some(start), Some(end)) => end - start,
            _ => 0.0,
        }
    }

    /// Time from network arrival to the most recent service completion.
    pub fn response_time(&self) -> f64 {
        match self.service_end_time {
            Some(end) => end - self.arrival_time,
            None => 0.0,
        }
    }

    pub fn add_service_duration(&mut self, duration: f64) {
        if duration > 0.0 {
            self.total_service_duration += duration;
        }
    }

    /// Service accumulated across every station the customer has passed.
    pub fn total_service_duration(&self) -> f64 {
        self.total_service_duration
    }

    /// End-to-end wait: response time minus cumulative service, clamped
    /// to zero.
    pub fn total_waiting_time(&self) -> f64 {
        let response = self.response_time();
        if response <= 0.0 {
            return 0.0;
        }
        (response - self.total_service_duration).max(0.0)
    }
}

/// Owns every live customer and the per-run id counter. The counter is
/// reset with the store so repeated runs produce identical ids.
#[derive(Debug, Default)]
pub struct CustomerStore {
    next_id: CustomerId,
    customers: HashMap<CustomerId, Customer>,
}

impl CustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, customer_type: usize, arrival_time: f64) -> CustomerId {
        self.next_id += 1;
        let id = self.next_id;
        self.customers
            .insert(id, Customer::new(id, customer_type, arrival_time));
        id
    }

    pub fn get(&self, id: CustomerId) -> &Customer {
        self.customers
            .get(&id)
            .expect("customer id must reference a live customer")
    }

    pub fn get_mut(&mut self, id: CustomerId) -> &mut Customer {
        self.customers
            .get_mut(&id)
            .expect("customer id must reference a live customer")
    }

    /// Drops a customer that has left the network.
    pub fn remove(&mut self, id: CustomerId) -> Customer {
        self.customers
            .remove(&id)
            .expect("customer id must reference a live customer")
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    pub fn reset(&mut self) {
        self.next_id = 0;
        self.customers.clear();
    }
}

/// A named single-server station with a FIFO waiting queue.
///
/// Busy means exactly one customer occupies the server slot, and the run
/// loop holds exactly one pending departure event for it.
pub struct ServicePoint {
    name: String,
    queue: VecDeque<CustomerId>,
    in_service: Option<CustomerId>,
    sampler: Box<dyn DurationSampler>,
    arrivals: u64,
    completions: u64,
    busy_time: f64,
}

impl ServicePoint {
    pub fn new(name: impl Into<String>, sampler: Box<dyn DurationSampler>) -> Self {
        Self {
            name: name.into(),
            queue: VecDeque::new(),
            in_service: None,
            sampler,
            arrivals: 0,
            completions: 0,
            busy_time: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_busy(&self) -> bool {
        self.in_service.is_some()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    pub fn completions(&self) -> u64 {
        self.completions
    }

    pub fn busy_time(&self) -> f64 {
        self.busy_time
    }

    /// Appends a customer to the waiting queue. Does not touch the busy
    /// state; service starts only in the C-phase.
    pub fn enqueue(&mut self, customer: CustomerId) {
        self.queue.push_back(customer);
        self.arrivals += 1;
    }

    pub fn can_begin_service(&self) -> bool {
        !self.is_busy() && !self.queue.is_empty()
    }

    /// Starts service for the head-of-queue customer and returns it with
    /// the departure time the caller must schedule.
    ///
    /// Calling this without `can_begin_service()` is a broken run-loop
    /// invariant and panics rather than corrupting the accounting.
    pub fn begin_service(&mut self, now: f64, customers: &mut CustomerStore) -> (CustomerId, f64) {
        assert!(
            !self.is_busy(),
            "begin_service called on busy point '{}'",
            self.name
        );
        let id = self
            .queue
            .pop_front()
            .expect("begin_service requires a waiting customer");
        customers.get_mut(id).service_start_time = Some(now);
        let duration = self.sampler.sample();
        self.in_service = Some(id);
        (id, now + duration)
    }

    /// Finishes the in-flight service, accumulates busy time and the
    /// customer's cumulative service duration, and frees the server.
    pub fn complete_service(&mut self, now: f64, customers: &mut CustomerStore) -> CustomerId {
        let id = self
            .in_service
            .take()
            .expect("complete_service called on idle point");
        let customer = customers.get_mut(id);
        customer.service_end_time = Some(now);
        let started = customer
            .service_start_time
            .expect("customer in service must have a start time");
        let duration = now - started;
        customer.add_service_duration(duration);
        self.busy_time += duration;
        self.completions += 1;
        id
    }

    pub fn reset(&mut self) {
        self.queue.clear();
        self.in_service = None;
        self.arrivals = 0;
        self.completions = 0;
        self.busy_time = 0.0;
    }
}

impl std::fmt::Debug for ServicePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServicePoint")
            .field("name", &self.name)
            .field("queue", &self.queue)
            .field("in_service", &self.in_service)
            .field("arrivals", &self.arrivals)
            .field("completions", &self.completions)
            .field("busy_time", &self.busy_time)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::ConstantSampler;

    fn point(service_time: f64) -> ServicePoint {
        ServicePoint::new("cashier", Box::new(ConstantSampler::new(service_time)))
    }

    #[test]
    fn enqueue_counts_arrivals_without_touching_busy_state() {
        let mut store = CustomerStore::new();
        let mut sp = point(2.0);
        let a = store.create(0, 0.0);
        let b = store.create(0, 0.5);
        sp.enqueue(a);
        sp.enqueue(b);
        assert_eq!(sp.arrivals(), 2);
        assert_eq!(sp.queue_len(), 2);
        assert!(!sp.is_busy());
    }

    #[test]
    fn begin_and_complete_service_account_busy_time() {
        let mut store = CustomerStore::new();
        let mut sp = point(2.0);
        let id = store.create(0, 1.0);
        sp.enqueue(id);

        assert!(sp.can_begin_service());
        let (started, departs_at) = sp.begin_service(3.0, &mut store);
        assert_eq!(started, id);
        assert_eq!(departs_at, 5.0);
        assert!(sp.is_busy());
        assert!(!sp.can_begin_service());

        let completed = sp.complete_service(5.0, &mut store);
        assert_eq!(completed, id);
        assert!(!sp.is_busy());
        assert_eq!(sp.completions(), 1);
        assert_eq!(sp.busy_time(), 2.0);

        let customer = store.get(id);
        assert_eq!(customer.waiting_time(), 2.0);
        assert_eq!(customer.service_time(), 2.0);
        assert_eq!(customer.response_time(), 4.0);
        assert_eq!(customer.total_service_duration(), 2.0);
    }

    #[test]
    #[should_panic(expected = "begin_service called on busy point")]
    fn begin_service_on_busy_point_panics() {
        let mut store = CustomerStore::new();
        let mut sp = point(1.0);
        let a = store.create(0, 0.0);
        let b = store.create(0, 0.0);
        sp.enqueue(a);
        sp.enqueue(b);
        sp.begin_service(0.0, &mut store);
        sp.begin_service(0.0, &mut store);
    }

    #[test]
    #[should_panic(expected = "begin_service requires a waiting customer")]
    fn begin_service_on_empty_queue_panics() {
        let mut store = CustomerStore::new();
        let mut sp = point(1.0);
        sp.begin_service(0.0, &mut store);
    }

    #[test]
    #[should_panic(expected = "complete_service called on idle point")]
    fn complete_service_on_idle_point_panics() {
        let mut store = CustomerStore::new();
        let mut sp = point(1.0);
        sp.complete_service(0.0, &mut store);
    }

    #[test]
    fn customer_ids_restart_after_reset() {
        let mut store = CustomerStore::new();
        assert_eq!(store.create(0, 0.0), 1);
        assert_eq!(store.create(0, 0.0), 2);
        store.reset();
        assert_eq!(store.create(0, 0.0), 1);
    }

    #[test]
    fn total_waiting_time_clamps_to_zero() {
        let mut store = CustomerStore::new();
        let id = store.create(0, 0.0);
        {
            let customer = store.get_mut(id);
            customer.service_start_time = Some(0.0);
            customer.service_end_time = Some(2.0);
            customer.add_service_duration(2.0);
            // Extra accumulation beyond response time must not go negative.
            customer.add_service_duration(1.0);
        }
        assert_eq!(store.get(id).total_waiting_time(), 0.0);
    }

    #[test]
    fn clock_advances_and_resets() {
        let mut clock = Clock::new();
        clock.set(1.5);
        clock.set(1.5);
        clock.set(4.0);
        assert_eq!(clock.time(), 4.0);
        clock.reset();
        assert_eq!(clock.time(), 0.0);
    }

    #[test]
    #[should_panic(expected = "clock must not go backwards")]
    fn clock_rejects_backwards_moves() {
        let mut clock = Clock::new();
        clock.set(2.0);
        clock.set(1.0);
    }
}
