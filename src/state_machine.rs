use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// A state enum that can be driven by [`StateMachine`].
pub trait MachineState: Copy + Eq + Hash + Debug {
    fn name(self) -> &'static str;
}

/// A committed state change. The owner runs the exit hook of `from` and then
/// the enter hook of `to`, in that order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition<S> {
    pub from: Option<S>,
    pub to: S,
}

/// Registry of named states with a current state and time spent in it.
///
/// Hooks live on the owning actor as `match` arms, so the machine only
/// validates and records transitions.
#[derive(Clone, Debug)]
pub struct StateMachine<S: MachineState> {
    states: HashSet<S>,
    current: Option<S>,
    previous: Option<S>,
    time_in_state: f32,
}

impl<S: MachineState> Default for StateMachine<S> {
    fn default() -> Self {
        Self {
            states: HashSet::new(),
            current: None,
            previous: None,
            time_in_state: 0.0,
        }
    }
}

impl<S: MachineState> StateMachine<S> {
    pub fn new(states: &[S]) -> Self {
        let mut machine = Self::default();
        for state in states {
            machine.add_state(*state);
        }
        machine
    }

    pub fn add_state(&mut self, state: S) {
        self.states.insert(state);
    }

    pub fn has_state(&self, state: S) -> bool {
        self.states.contains(&state)
    }

    /// Switching to the current state is a no-op (`Ok(None)`). Unregistered
    /// states are rejected and leave the machine untouched.
    pub fn set_state(&mut self, state: S) -> Result<Option<Transition<S>>, String> {
        if self.current == Some(state) {
            return Ok(None);
        }
        if !self.states.contains(&state) {
            return Err(format!("State '{}' not defined", state.name()));
        }

        let from = self.current;
        self.previous = from;
        self.current = Some(state);
        self.time_in_state = 0.0;
        Ok(Some(Transition { from, to: state }))
    }

    pub fn current(&self) -> Option<S> {
        self.current
    }

    pub fn previous(&self) -> Option<S> {
        self.previous
    }

    pub fn is(&self, state: S) -> bool {
        self.current == Some(state)
    }

    pub fn tick(&mut self, dt: f32) {
        if self.current.is_some() {
            self.time_in_state += dt;
        }
    }

    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Door {
        Open,
        Closed,
        Locked,
    }

    impl MachineState for Door {
        fn name(self) -> &'static str {
            match self {
                Door::Open => "open",
                Door::Closed => "closed",
                Door::Locked => "locked",
            }
        }
    }

    #[test]
    fn first_transition_has_no_source() {
        let mut machine = StateMachine::new(&[Door::Open, Door::Closed]);
        let t = machine.set_state(Door::Closed).unwrap();
        assert_eq!(
            t,
            Some(Transition {
                from: None,
                to: Door::Closed
            })
        );
        assert_eq!(machine.current(), Some(Door::Closed));
    }

    #[test]
    fn same_state_is_a_no_op() {
        let mut machine = StateMachine::new(&[Door::Open, Door::Closed]);
        machine.set_state(Door::Open).unwrap();
        machine.tick(0.5);
        assert_eq!(machine.set_state(Door::Open), Ok(None));
        assert_eq!(machine.time_in_state(), 0.5);
        assert_eq!(machine.previous(), None);
    }

    #[test]
    fn undefined_state_is_rejected_without_change() {
        let mut machine = StateMachine::new(&[Door::Open, Door::Closed]);
        assert!(!machine.has_state(Door::Locked));
        machine.set_state(Door::Open).unwrap();
        let err = machine.set_state(Door::Locked).unwrap_err();
        assert!(err.contains("locked"));
        assert!(machine.is(Door::Open));
    }

    #[test]
    fn transition_records_previous_and_resets_timer() {
        let mut machine = StateMachine::new(&[Door::Open, Door::Closed]);
        machine.set_state(Door::Open).unwrap();
        machine.tick(1.0);
        let t = machine.set_state(Door::Closed).unwrap().unwrap();
        assert_eq!(t.from, Some(Door::Open));
        assert_eq!(machine.previous(), Some(Door::Open));
        assert_eq!(machine.time_in_state(), 0.0);
    }
}
