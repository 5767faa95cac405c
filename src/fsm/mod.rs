//! Function-pointer finite state machine engine and the alert actuator
//! built on top of it.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable                                              │
//! │  ┌──────────┬───────────┬──────────┬───────────────────┐ │
//! │  │ StateId  │ on_enter  │ on_exit  │ on_update         │ │
//! │  ├──────────┼───────────┼──────────┼───────────────────┤ │
//! │  │ Normal   │ fn(ctx)   │ -        │ fn(ctx)->Option<> │ │
//! │  │ Warning  │ fn(ctx)   │ -        │ fn(ctx)->Option<> │ │
//! │  │ Critical │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  └──────────┴───────────┴──────────┴───────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current state, then `on_enter` for the next, and updates the
//! current pointer.  All functions receive `&mut AlertContext`.

pub mod context;
pub mod states;

use context::{AlertContext, AlertOutputs};
use log::info;

use crate::config::AlarmConfig;
use crate::risk::RiskLevel;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Alert states, one per risk level.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Normal = 0,
    Warning = 1,
    Critical = 2,
}

impl StateId {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 3;

    /// Convert an index back to `StateId`.  Returns `Critical` on an
    /// out-of-range index (fail towards the louder alert).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Normal,
            1 => Self::Warning,
            2 => Self::Critical,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Critical
            }
        }
    }

    pub fn level(self) -> RiskLevel {
        match self {
            Self::Normal => RiskLevel::Normal,
            Self::Warning => RiskLevel::Warning,
            Self::Critical => RiskLevel::Critical,
        }
    }
}

impl From<RiskLevel> for StateId {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Normal => Self::Normal,
            RiskLevel::Warning => Self::Warning,
            RiskLevel::Critical => Self::Critical,
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut AlertContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
///
/// The alert states always stay: level changes arrive through
/// [`Fsm::force_transition`] before the tick, so updates only refresh
/// outputs.
pub type StateUpdateFn = fn(&mut AlertContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array at index `StateId as usize`.
pub struct StateDescriptor {
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Monotonically increasing tick counter.
    tick_count: u64,
    /// Tick at which the current state was entered.
    state_entry_tick: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut AlertContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut AlertContext) {
        self.tick_count += 1;
        ctx.cycles_in_state = self.tick_count - self.state_entry_tick;
        ctx.total_cycles = self.tick_count;

        let next = (self.table[self.current].on_update)(ctx);

        if let Some(next_id) = next {
            self.force_transition(next_id, ctx);
        }
    }

    /// Force an immediate transition.  No-op if already in `next`.
    pub fn force_transition(&mut self, next: StateId, ctx: &mut AlertContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    /// How many ticks the FSM has been in the current state.
    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut AlertContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        ctx.cycles_in_state = 0;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}

// ---------------------------------------------------------------------------
// Alert actuator
// ---------------------------------------------------------------------------

/// Maps the fused risk level onto the safe/problem/alarm outputs.
///
/// Owns the alert state: the active level and the timestamp of the last
/// warning pulse.  Deterministic; has no failure modes.
pub struct AlertActuator {
    fsm: Fsm,
    ctx: AlertContext,
}

impl AlertActuator {
    /// Build the actuator in `Normal` and run its entry action.
    pub fn new(alarm: AlarmConfig) -> Self {
        let mut ctx = AlertContext::new(alarm);
        let mut fsm = Fsm::new(states::build_state_table(), StateId::Normal);
        fsm.start(&mut ctx);
        Self { fsm, ctx }
    }

    /// Run one cycle: make `level` the active state, then let that state
    /// compute this cycle's outputs at `now_ms`.
    pub fn actuate(&mut self, level: RiskLevel, now_ms: u64) -> AlertOutputs {
        self.ctx.now_ms = now_ms;
        self.fsm.force_transition(StateId::from(level), &mut self.ctx);
        self.fsm.tick(&mut self.ctx);
        self.ctx.outputs
    }

    /// Currently active level.
    pub fn level(&self) -> RiskLevel {
        self.fsm.current_state().level()
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Timestamp of the last warning pulse, `None` when stale.
    pub fn last_pulse_ms(&self) -> Option<u64> {
        self.ctx.last_pulse_ms
    }

    /// Cycles spent in the current level.
    pub fn cycles_in_state(&self) -> u64 {
        self.fsm.ticks_in_current_state()
    }
}
