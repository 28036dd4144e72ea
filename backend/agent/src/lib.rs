//! Phone agent: mutes the ringer on request during calls and restores it afterwards.

pub mod component;
pub mod controller;
pub mod loopback;

pub use component::PhoneAgent;
pub use controller::{ControllerOptions, ControllerSnapshot, RingerSilenceController};
pub use loopback::{LoopbackProfiled, PeerCall, RecordingPhoneAlert};
