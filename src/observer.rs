use crate::state::Customer;

/// Receives engine notifications at fixed call sites in the run loop.
///
/// All methods are dispatch-and-continue: implementations must not block
/// the engine. Routing with `to == None` means the customer finished and
/// left the network; `on_run_ended` reports the final simulated time.
pub trait SimulationObserver: Send {
    fn on_arrival(&mut self, _customer: &Customer, _point: usize) {}

    fn on_departure(
        &mut self,
        _customer: &Customer,
        _point: usize,
        _wait_time: f64,
        _service_time: f64,
    ) {
    }

    fn on_routing(&mut self, _customer: &Customer, _from: usize, _to: Option<usize>) {}

    fn on_run_ended(&mut self, _time: f64) {}
}
