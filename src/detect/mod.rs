mod backend;
mod backends;

pub use backend::DetectorBackend;
#[cfg(feature = "backend-rustface")]
pub use backends::CascadeBackend;
pub use backends::{ScriptedFrame, StubBackend};
