pub mod frame;
pub mod particle;
pub mod slot;

pub use frame::{update_frame, FrameReport};
pub use particle::{Decay, ObservationGate, Particle, ParticlePolicy, ParticleStyle, STABILITY_MAX};
pub use slot::{Assignment, Slot, SlotPool};
