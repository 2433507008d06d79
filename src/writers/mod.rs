pub mod emitter;

pub use emitter::{EmitterKind, FilterRulesEmitter, JsonEmitter, MessageEmitter};
