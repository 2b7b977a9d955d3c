pub mod registry;

pub use registry::{Profile, ProfileSource, Registry};
