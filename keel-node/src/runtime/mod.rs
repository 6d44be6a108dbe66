pub mod probe;
pub mod sequencer;
