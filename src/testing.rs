//! A simulated sensor bench for driving the measurement code without
//! hardware.
//!
//! Every [`SimClock::now_micros`] call returns the current time and then
//! advances it by one microsecond, so a poll loop makes progress on its own.
//! Echo pulses are scripted relative to the last falling edge of the trigger
//! line, the way a real sensor answers its trigger.

use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};

use crate::clock::{elapsed, Micros, Now};

pub struct Bench {
    time: Cell<Micros>,
    origin: Cell<Option<Micros>>,
    // (delay after origin, width)
    echoes: RefCell<Vec<(Micros, Micros)>>,
    stuck_high: Cell<bool>,
    trigger_edges: RefCell<Vec<(Micros, PinState)>>,
}

impl Bench {
    pub fn new(start: Micros) -> Rc<Self> {
        Rc::new(Self {
            time: Cell::new(start),
            origin: Cell::new(None),
            echoes: RefCell::new(Vec::new()),
            stuck_high: Cell::new(false),
            trigger_edges: RefCell::new(Vec::new()),
        })
    }

    pub fn clock(self: &Rc<Self>) -> SimClock {
        SimClock(Rc::clone(self))
    }

    pub fn trigger(self: &Rc<Self>) -> SimTrigger {
        SimTrigger {
            bench: Rc::clone(self),
            level: PinState::Low,
        }
    }

    pub fn echo(self: &Rc<Self>) -> SimEcho {
        SimEcho(Rc::clone(self))
    }

    /// Current time without advancing it.
    pub fn peek(&self) -> Micros {
        self.time.get()
    }

    /// Pretend the trigger fell at `at`, for tests that skip the emitter.
    pub fn set_origin(&self, at: Micros) {
        self.origin.set(Some(at));
    }

    /// Raise the echo line `delay_us` after the trigger for `width_us`.
    pub fn add_echo(&self, delay_us: Micros, width_us: Micros) {
        self.echoes.borrow_mut().push((delay_us, width_us));
    }

    /// Hold the echo line HIGH regardless of the script.
    pub fn hold_high(&self) {
        self.stuck_high.set(true);
    }

    pub fn trigger_edges(&self) -> Vec<(Micros, PinState)> {
        self.trigger_edges.borrow().clone()
    }

    /// Number of completed trigger pulses.
    pub fn triggers(&self) -> usize {
        let edges = self.trigger_edges.borrow();
        edges
            .windows(2)
            .filter(|pair| pair[0].1 == PinState::High && pair[1].1 == PinState::Low)
            .count()
    }

    fn tick(&self) -> Micros {
        let now = self.time.get();
        self.time.set(now.wrapping_add(1));
        now
    }

    fn echo_level(&self) -> PinState {
        if self.stuck_high.get() {
            return PinState::High;
        }
        let Some(origin) = self.origin.get() else {
            return PinState::Low;
        };
        let since = elapsed(origin, self.time.get());
        let high = self
            .echoes
            .borrow()
            .iter()
            .any(|&(delay, width)| since >= delay && since - delay < width);
        PinState::from(high)
    }
}

pub struct SimClock(Rc<Bench>);

impl Now for SimClock {
    fn now_micros(&self) -> Micros {
        self.0.tick()
    }
}

pub struct SimTrigger {
    bench: Rc<Bench>,
    level: PinState,
}

impl SimTrigger {
    fn drive(&mut self, level: PinState) {
        let now = self.bench.time.get();
        if self.level == PinState::High && level == PinState::Low {
            self.bench.origin.set(Some(now));
        }
        self.level = level;
        self.bench.trigger_edges.borrow_mut().push((now, level));
    }
}

impl ErrorType for SimTrigger {
    type Error = Infallible;
}

impl OutputPin for SimTrigger {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(PinState::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(PinState::High);
        Ok(())
    }
}

pub struct SimEcho(Rc<Bench>);

impl ErrorType for SimEcho {
    type Error = Infallible;
}

impl InputPin for SimEcho {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.echo_level() == PinState::High)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.echo_level() == PinState::Low)
    }
}
