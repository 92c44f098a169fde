//! # Guarded State
//!
//! [`StateMachine`] holds one resource's current state, drawn from a bounded
//! alphabet and optionally restricted by a transition map. States are
//! canonicalized to upper case, so `"ready"` and `"READY"` are the same state.
//!
//! The container has no side effects besides the stored value. Resources
//! broadcast changes themselves, typically after [`StateMachine::set_if_changed`]
//! reports that something moved.

use crate::framework::error::ServiceError;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct StateMachine {
    allowed_states: Vec<String>,
    allowed_next_states: HashMap<String, Vec<String>>,
    current: String,
}

fn canonical(state: &str) -> String {
    state.to_uppercase()
}

impl StateMachine {
    /// A machine over `allowed_states` starting at `initial`.
    pub fn new<I, S>(allowed_states: I, initial: &str) -> Result<Self, ServiceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_transitions(allowed_states, Vec::<(String, Vec<String>)>::new(), initial)
    }

    /// A machine whose moves out of a listed state are limited to that
    /// state's entry in `allowed_next_states`. States without an entry fall
    /// back to the plain alphabet check.
    ///
    /// `initial` and every state named in the map must be in `allowed_states`.
    pub fn with_transitions<I, S, T, F, N, G>(
        allowed_states: I,
        allowed_next_states: T,
        initial: &str,
    ) -> Result<Self, ServiceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        T: IntoIterator<Item = (F, N)>,
        F: AsRef<str>,
        N: IntoIterator<Item = G>,
        G: AsRef<str>,
    {
        let allowed_states: Vec<String> = allowed_states
            .into_iter()
            .map(|s| canonical(s.as_ref()))
            .collect();
        let known = |state: &str| -> Result<String, ServiceError> {
            let state = canonical(state);
            if allowed_states.contains(&state) {
                Ok(state)
            } else {
                Err(ServiceError::UnrecognisedState(state))
            }
        };
        let mut next_states = HashMap::new();
        for (from, to) in allowed_next_states {
            let to = to
                .into_iter()
                .map(|s| known(s.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            next_states.insert(known(from.as_ref())?, to);
        }

        let initial = canonical(initial);
        if !allowed_states.contains(&initial) {
            return Err(ServiceError::UnrecognisedState(initial));
        }

        Ok(Self {
            allowed_states,
            allowed_next_states: next_states,
            current: initial,
        })
    }

    /// The current canonical state.
    pub fn state(&self) -> &str {
        &self.current
    }

    pub fn allowed_states(&self) -> &[String] {
        &self.allowed_states
    }

    /// Checks whether `requested` may become the current state.
    pub fn validate(&self, requested: &str) -> Result<(), ServiceError> {
        let requested = canonical(requested);
        match self.allowed_next_states.get(&self.current) {
            Some(next) if !next.contains(&requested) => Err(ServiceError::IllegalState {
                current: self.current.clone(),
                requested,
            }),
            Some(_) => Ok(()),
            None if self.allowed_states.contains(&requested) => Ok(()),
            None => Err(ServiceError::UnrecognisedState(requested)),
        }
    }

    /// Validates and stores `requested`. On failure the state is untouched.
    pub fn set_state(&mut self, requested: &str) -> Result<(), ServiceError> {
        self.validate(requested)?;
        self.current = canonical(requested);
        Ok(())
    }

    /// Like [`set_state`](Self::set_state) but a no-op when `requested` is
    /// already current. Returns whether the state changed.
    pub fn set_if_changed(&mut self, requested: &str) -> Result<bool, ServiceError> {
        if canonical(requested) == self.current {
            return Ok(false);
        }
        self.set_state(requested)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_must_be_allowed() {
        let err = StateMachine::new(["READY", "PLAYING"], "STOPPED").unwrap_err();
        assert_eq!(err, ServiceError::UnrecognisedState("STOPPED".into()));

        let machine = StateMachine::new(["READY", "PLAYING"], "ready").unwrap();
        assert_eq!(machine.state(), "READY");
    }

    #[test]
    fn unknown_state_leaves_value_untouched() {
        let mut machine = StateMachine::new(["READY", "PLAYING"], "READY").unwrap();
        let err = machine.set_state("STOPPED").unwrap_err();
        assert_eq!(err, ServiceError::UnrecognisedState("STOPPED".into()));
        assert_eq!(machine.state(), "READY");

        machine.set_state("playing").unwrap();
        assert_eq!(machine.state(), "PLAYING");
    }

    #[test]
    fn transition_map_restricts_moves() {
        let mut machine = StateMachine::with_transitions(
            ["IDLE", "LISTENING", "PROCESSING"],
            [("IDLE", vec!["LISTENING"]), ("LISTENING", vec!["PROCESSING", "IDLE"])],
            "IDLE",
        )
        .unwrap();

        let err = machine.set_state("PROCESSING").unwrap_err();
        assert_eq!(
            err,
            ServiceError::IllegalState {
                current: "IDLE".into(),
                requested: "PROCESSING".into()
            }
        );
        assert_eq!(machine.state(), "IDLE");

        machine.set_state("listening").unwrap();
        machine.set_state("PROCESSING").unwrap();

        // No entry for PROCESSING, so only the alphabet applies.
        assert!(matches!(
            machine.set_state("BOGUS"),
            Err(ServiceError::UnrecognisedState(_))
        ));
        assert!(machine.set_state("IDLE").is_ok());
        assert!(matches!(
            machine.set_state("BOGUS"),
            Err(ServiceError::IllegalState { .. })
        ));
    }

    #[test]
    fn set_if_changed_reports_change() {
        let mut machine = StateMachine::new(["ON", "OFF"], "ON").unwrap();
        assert!(!machine.set_if_changed("on").unwrap());
        assert!(machine.set_if_changed("off").unwrap());
        assert_eq!(machine.state(), "OFF");
        assert!(machine.set_if_changed("dim").is_err());
        assert_eq!(machine.state(), "OFF");
    }

    #[test]
    fn transition_map_must_stay_inside_alphabet() {
        let err = StateMachine::with_transitions(
            ["IDLE", "BUSY"],
            [("IDLE", vec!["EXPLODED"])],
            "IDLE",
        )
        .unwrap_err();
        assert_eq!(err, ServiceError::UnrecognisedState("EXPLODED".into()));

        let err = StateMachine::with_transitions(["IDLE", "BUSY"], [("gone", vec!["idle"])], "IDLE")
            .unwrap_err();
        assert_eq!(err, ServiceError::UnrecognisedState("GONE".into()));

        let mut machine =
            StateMachine::with_transitions(["IDLE", "BUSY"], [("idle", vec!["busy"])], "IDLE")
                .unwrap();
        machine.set_state("BUSY").unwrap();
        assert!(machine.allowed_states().iter().any(|s| s == machine.state()));
    }
}
