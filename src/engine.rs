use tracing::{debug, info};

use crate::arrivals::ArrivalProcess;
use crate::error::Result;
use crate::events::{Event, EventKind, EventList};
use crate::generators::build_sampler;
use crate::models::SimConfig;
use crate::observer::SimulationObserver;
use crate::routing::RouteTable;
use crate::state::{Clock, Customer, CustomerStore, ServicePoint};
use crate::stats::{SimulationStats, StatisticsCollector};

/// Seed offset separating arrival-process streams from service streams
/// when all samplers derive from one base seed.
const ARRIVAL_SEED_OFFSET: u64 = 1_000;

/// Drives the network: owns the clock, the event list, every service
/// point, and the statistics collector. Synchronous and single-threaded;
/// the paced runner in `control` wraps it for interactive use.
pub struct SimulationEngine {
    config: SimConfig,
    clock: Clock,
    events: EventList,
    points: Vec<ServicePoint>,
    routes: RouteTable,
    arrival_processes: Vec<ArrivalProcess>,
    customers: CustomerStore,
    stats: StatisticsCollector,
    observers: Vec<Box<dyn SimulationObserver>>,
    end_time: f64,
    initialized: bool,
    finished: bool,
}

impl SimulationEngine {
    /// Builds an engine from a validated configuration. All samplers are
    /// derived from `config.seed` (offset per component) when present.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let routes = RouteTable::build(&config)?;

        let mut points = Vec::with_capacity(config.points.len());
        let mut stats = StatisticsCollector::new();
        for (idx, point) in config.points.iter().enumerate() {
            let seed = config.seed.map(|base| base + idx as u64);
            let sampler = build_sampler(&point.name, &point.distribution, seed)?;
            points.push(ServicePoint::new(point.name.clone(), sampler));
            stats.register_point(&point.name, routes.is_terminal(idx));
        }

        let mut arrival_processes = Vec::with_capacity(config.arrivals.len());
        for (idx, arrival) in config.arrivals.iter().enumerate() {
            let seed = config
                .seed
                .map(|base| base + ARRIVAL_SEED_OFFSET + idx as u64);
            let context = format!("{} arrivals", arrival.customer_type);
            let sampler = build_sampler(&context, &arrival.distribution, seed)?;
            let target = config
                .points
                .iter()
                .position(|p| p.name == arrival.entry_point)
                .expect("entry point validated against point list");
            arrival_processes.push(ArrivalProcess::new(idx, target, sampler));
        }

        let end_time = config.end_time;
        Ok(Self {
            config,
            clock: Clock::new(),
            events: EventList::new(),
            points,
            routes,
            arrival_processes,
            customers: CustomerStore::new(),
            stats,
            observers: Vec::new(),
            end_time,
            initialized: false,
            finished: false,
        })
    }

    /// Attaches an external observer. The engine's notification call
    /// sites are fixed; observers only add fan-out.
    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    pub fn set_end_time(&mut self, end_time: f64) {
        self.end_time = end_time;
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn clock_time(&self) -> f64 {
        self.clock.time()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn points(&self) -> &[ServicePoint] {
        &self.points
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Current aggregate over `[0, now]`.
    pub fn snapshot(&self) -> SimulationStats {
        self.stats.snapshot(self.clock.time())
    }

    /// Resets clock, queues, counters, and the customer id counter, then
    /// schedules the first arrival of every process.
    pub fn initialize(&mut self) {
        self.clock.reset();
        self.events.clear();
        self.customers.reset();
        self.stats.reset();
        for point in &mut self.points {
            point.reset();
        }
        for process in &mut self.arrival_processes {
            process.schedule_next(0.0, &mut self.events, &mut self.customers);
        }
        self.initialized = true;
        self.finished = false;
        info!(end_time = self.end_time, "simulation initialized");
    }

    /// Runs the simulation to completion and returns the final snapshot.
    pub fn run(&mut self) -> SimulationStats {
        self.initialize();
        while self.step_cycle() {}
        self.snapshot()
    }

    /// Executes one full A+B+C cycle. Returns `false` once the run has
    /// terminated (event list drained or end time reached), after
    /// reporting the final time to every observer.
    pub fn step_cycle(&mut self) -> bool {
        assert!(self.initialized, "step_cycle called before initialize");
        if self.finished {
            return false;
        }
        if self.events.is_empty() || self.clock.time() >= self.end_time {
            self.finish();
            return false;
        }

        // A-phase: advance the clock to the next event, clamping at the
        // configured end time.
        let first = self
            .events
            .remove_next()
            .expect("event list checked non-empty");
        if first.time > self.end_time {
            self.clock.set(self.end_time);
            self.finish();
            return false;
        }
        self.clock.set(first.time);
        let now = self.clock.time();
        debug!(time = now, "clock advanced");

        // B-phase: dispatch every event due at exactly this instant
        // before any service-start decision.
        self.dispatch(first);
        while self.events.next_time() == Some(now) {
            let event = self
                .events
                .remove_next()
                .expect("peeked event must still be present");
            self.dispatch(event);
        }

        // C-phase: sweep all points, starting service wherever possible;
        // repeat until a full pass changes nothing.
        loop {
            let mut changed = false;
            for idx in 0..self.points.len() {
                if self.points[idx].can_begin_service() {
                    let (customer, departs_at) =
                        self.points[idx].begin_service(now, &mut self.customers);
                    debug!(
                        point = self.points[idx].name(),
                        customer, departs_at, "service started"
                    );
                    self.events
                        .add(Event::new(departs_at, EventKind::Departure, customer, idx));
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        true
    }

    fn dispatch(&mut self, event: Event) {
        match event.kind {
            EventKind::Arrival => self.handle_arrival(event),
            EventKind::Departure => self.handle_departure(event),
        }
    }

    fn handle_arrival(&mut self, event: Event) {
        debug!(
            customer = event.customer,
            point = self.points[event.target].name(),
            "arrival"
        );
        notify_arrival(
            &mut self.stats,
            &mut self.observers,
            self.customers.get(event.customer),
            event.target,
        );
        self.points[event.target].enqueue(event.customer);

        // Each customer type owns one arrival process; keep its stream
        // going.
        let customer_type = self.customers.get(event.customer).customer_type;
        self.arrival_processes[customer_type].schedule_next(
            self.clock.time(),
            &mut self.events,
            &mut self.customers,
        );
    }

    fn handle_departure(&mut self, event: Event) {
        let point = event.target;
        let completed = self.points[point].complete_service(self.clock.time(), &mut self.customers);
        assert_eq!(
            completed, event.customer,
            "departure event does not match the customer in service at '{}'",
            self.points[point].name()
        );

        let (wait_time, service_time) = {
            let customer = self.customers.get(completed);
            (customer.waiting_time(), customer.service_time())
        };
        debug!(
            customer = completed,
            point = self.points[point].name(),
            wait_time,
            service_time,
            "departure"
        );
        notify_departure(
            &mut self.stats,
            &mut self.observers,
            self.customers.get(completed),
            point,
            wait_time,
            service_time,
        );

        let customer_type = self.customers.get(completed).customer_type;
        match self.routes.next_point(point, customer_type) {
            Some(next) => {
                self.points[next].enqueue(completed);
                notify_routing(
                    &mut self.stats,
                    &mut self.observers,
                    self.customers.get(completed),
                    point,
                    Some(next),
                );
            }
            None => {
                notify_routing(
                    &mut self.stats,
                    &mut self.observers,
                    self.customers.get(completed),
                    point,
                    None,
                );
                self.customers.remove(completed);
            }
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        let time = self.clock.time();
        for observer in &mut self.observers {
            observer.on_run_ended(time);
        }
        info!(time, "simulation finished");
    }
}

fn notify_arrival(
    stats: &mut StatisticsCollector,
    observers: &mut [Box<dyn SimulationObserver>],
    customer: &Customer,
    point: usize,
) {
    stats.record_arrival(customer, point);
    for observer in observers {
        observer.on_arrival(customer, point);
    }
}

fn notify_departure(
    stats: &mut StatisticsCollector,
    observers: &mut [Box<dyn SimulationObserver>],
    customer: &Customer,
    point: usize,
    wait_time: f64,
    service_time: f64,
) {
    stats.record_departure(customer, point, service_time);
    for observer in observers {
        observer.on_departure(customer, point, wait_time, service_time);
    }
}

fn notify_routing(
    stats: &mut StatisticsCollector,
    observers: &mut [Box<dyn SimulationObserver>],
    customer: &Customer,
    from: usize,
    to: Option<usize>,
) {
    stats.record_routing(customer, from, to);
    for observer in observers {
        observer.on_routing(customer, from, to);
    }
}
