#[cfg(feature = "backend-rustface")]
mod cascade;
mod stub;

#[cfg(feature = "backend-rustface")]
pub use cascade::CascadeBackend;
pub use stub::{ScriptedFrame, StubBackend};
