//! Pipeline module - one inbound message, end to end, without I/O.

mod planner;

pub use planner::{
    LeakPolicy, PlannerSettings, TurnAction, TurnInput, TurnPlan, TurnPlanner,
    DEFAULT_DEFLECTION_REPLY, DEFAULT_GHOST_THRESHOLD_DAYS, OBJECTION_KEYWORDS,
};
