//! Component state lattice (§3): `init -> ready -> prepared <-> active <->
//! paused -> ready`, with `xrun` returning any state to `ready`.

use crate::error::{ComponentError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentState {
    Init,
    Ready,
    Prepared,
    Active,
    Paused,
}

/// The six trigger commands named in the component vtable design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerCmd {
    Start,
    Stop,
    Pause,
    Release,
    Reset,
    Xrun,
}

/// A trigger may halt propagation at a pipeline boundary without this being
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Ok,
    PathStop,
}

/// Validate and apply a state transition, returning the new state or
/// `bad_state` if the edge is not in the lattice.
pub fn apply_trigger(current: ComponentState, cmd: TriggerCmd) -> Result<ComponentState> {
    use ComponentState::*;
    use TriggerCmd::*;
    match (current, cmd) {
        (Prepared, Start) => Ok(Active),
        (Active, Pause) => Ok(Paused),
        (Paused, Release) => Ok(Active),
        (Paused, Start) => Ok(Active),
        (Active, Stop) => Ok(Ready),
        (Paused, Stop) => Ok(Ready),
        (Prepared, Stop) => Ok(Ready),
        (_, Reset) => Ok(Ready),
        (_, Xrun) => Ok(Ready),
        _ => Err(ComponentError::BadState(adsp_core::CoreError::BadState)),
    }
}
