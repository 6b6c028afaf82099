mod passability;
mod triggers;

pub use passability::{
    mover_passable, occupant_verdict, resolver_for, FlatResolver, LayeredResolver,
    OccupantVerdict, PassabilityResolver,
};
pub use triggers::{ActivationRule, TriggerDispatcher, TOUCH_TRIGGERS};
