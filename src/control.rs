use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::engine::SimulationEngine;
use crate::stats::SimulationStats;

/// Shared pause/step gate. The worker blocks only at the top of a cycle,
/// so an in-flight B+C sweep always completes before a pause or step
/// takes effect.
#[derive(Debug, Default)]
struct ControlState {
    paused: bool,
    step_mode: bool,
    step_requested: bool,
    delay: Duration,
    cycles: u64,
    finished: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<ControlState>,
    cond: Condvar,
}

/// Cheap cloneable control surface for a running paced simulation. Every
/// operation is an idempotent no-op when it does not apply (paused twice,
/// stepped after the run finished, and so on).
#[derive(Clone, Debug)]
pub struct ControlHandle {
    shared: Arc<Shared>,
}

impl ControlHandle {
    pub fn pause(&self) {
        let mut state = self.shared.state.lock().expect("control lock poisoned");
        state.paused = true;
        self.shared.cond.notify_all();
    }

    pub fn resume(&self) {
        let mut state = self.shared.state.lock().expect("control lock poisoned");
        state.paused = false;
        state.step_mode = false;
        state.step_requested = false;
        self.shared.cond.notify_all();
    }

    /// Requests exactly one B+C cycle; the worker returns to the paused
    /// state afterwards.
    pub fn step(&self) {
        let mut state = self.shared.state.lock().expect("control lock poisoned");
        state.paused = true;
        state.step_mode = true;
        state.step_requested = true;
        self.shared.cond.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        let state = self.shared.state.lock().expect("control lock poisoned");
        state.paused || state.step_mode
    }

    /// Advisory wall-clock delay inserted after each cycle. Never affects
    /// simulated time.
    pub fn set_delay(&self, delay: Duration) {
        let mut state = self.shared.state.lock().expect("control lock poisoned");
        state.delay = delay;
    }

    pub fn delay(&self) -> Duration {
        self.shared
            .state
            .lock()
            .expect("control lock poisoned")
            .delay
    }

    /// Number of completed B+C cycles, for harnesses and UIs that need to
    /// observe cycle boundaries.
    pub fn cycles(&self) -> u64 {
        self.shared
            .state
            .lock()
            .expect("control lock poisoned")
            .cycles
    }

    pub fn is_finished(&self) -> bool {
        self.shared
            .state
            .lock()
            .expect("control lock poisoned")
            .finished
    }
}

/// Runs a `SimulationEngine` on a dedicated worker thread with
/// cooperative pause/resume/step control and an advisory pacing delay.
pub struct PacedSimulation {
    handle: ControlHandle,
    worker: JoinHandle<(SimulationEngine, SimulationStats)>,
}

impl PacedSimulation {
    /// Spawns the worker. With `start_paused` the engine initializes but
    /// runs no cycle until `resume` or `step`, letting a harness attach
    /// before simulated time moves.
    pub fn spawn(mut engine: SimulationEngine, start_paused: bool) -> Self {
        let delay = Duration::from_millis(engine.config().delay_ms);
        let shared = Arc::new(Shared {
            state: Mutex::new(ControlState {
                paused: start_paused,
                delay,
                ..ControlState::default()
            }),
            cond: Condvar::new(),
        });
        let handle = ControlHandle {
            shared: Arc::clone(&shared),
        };

        let worker = thread::spawn(move || {
            engine.initialize();
            loop {
                wait_if_paused(&shared);
                if !engine.step_cycle() {
                    break;
                }
                let delay = {
                    let mut state = shared.state.lock().expect("control lock poisoned");
                    state.cycles += 1;
                    state.delay
                };
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
            }
            debug!(time = engine.clock_time(), "paced run finished");
            let stats = engine.snapshot();
            shared
                .state
                .lock()
                .expect("control lock poisoned")
                .finished = true;
            shared.cond.notify_all();
            (engine, stats)
        });

        Self { handle, worker }
    }

    pub fn control(&self) -> ControlHandle {
        self.handle.clone()
    }

    /// Blocks until the run terminates and returns the engine with its
    /// final snapshot. A simulation left paused never terminates; resume
    /// it first.
    pub fn join(self) -> (SimulationEngine, SimulationStats) {
        self.worker.join().expect("simulation worker panicked")
    }
}

fn wait_if_paused(shared: &Shared) {
    let mut state = shared.state.lock().expect("control lock poisoned");
    while (state.paused || state.step_mode) && !state.step_requested {
        state = shared
            .cond
            .wait(state)
            .expect("control lock poisoned");
    }
    if state.step_requested {
        state.step_requested = false;
    }
}
