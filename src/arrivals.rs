use crate::events::{Event, EventKind, EventList};
use crate::generators::DurationSampler;
use crate::state::CustomerStore;

/// Produces successive customers of one type at one entry point. Each
/// process owns its own sampler so interleaved arrival streams never
/// correlate their randomness.
pub struct ArrivalProcess {
    customer_type: usize,
    target: usize,
    sampler: Box<dyn DurationSampler>,
}

impl ArrivalProcess {
    pub fn new(customer_type: usize, target: usize, sampler: Box<dyn DurationSampler>) -> Self {
        Self {
            customer_type,
            target,
            sampler,
        }
    }

    pub fn customer_type(&self) -> usize {
        self.customer_type
    }

    /// Samples an inter-arrival gap, creates the next customer, and
    /// schedules its arrival event at the bound entry point.
    pub fn schedule_next(
        &mut self,
        now: f64,
        events: &mut EventList,
        customers: &mut CustomerStore,
    ) {
        let arrival_time = now + self.sampler.sample();
        let customer = customers.create(self.customer_type, arrival_time);
        events.add(Event::new(
            arrival_time,
            EventKind::Arrival,
            customer,
            self.target,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::ConstantSampler;

    #[test]
    fn schedule_next_creates_customer_and_arrival_event() {
        let mut events = EventList::new();
        let mut customers = CustomerStore::new();
        let mut process = ArrivalProcess::new(0, 2, Box::new(ConstantSampler::new(1.5)));

        process.schedule_next(3.0, &mut events, &mut customers);

        let event = events.remove_next().unwrap();
        assert_eq!(event.time, 4.5);
        assert_eq!(event.kind, EventKind::Arrival);
        assert_eq!(event.target, 2);
        let customer = customers.get(event.customer);
        assert_eq!(customer.arrival_time, 4.5);
        assert_eq!(customer.customer_type, 0);
    }

    #[test]
    fn successive_calls_chain_from_the_given_now() {
        let mut events = EventList::new();
        let mut customers = CustomerStore::new();
        let mut process = ArrivalProcess::new(1, 0, Box::new(ConstantSampler::new(1.0)));

        process.schedule_next(0.0, &mut events, &mut customers);
        process.schedule_next(1.0, &mut events, &mut customers);

        assert_eq!(events.remove_next().unwrap().time, 1.0);
        assert_eq!(events.remove_next().unwrap().time, 2.0);
        assert_eq!(customers.len(), 2);
    }
}
