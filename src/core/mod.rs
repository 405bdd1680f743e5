//! Context construction and resolution.

mod builder;
pub mod channels;
mod context;
mod handle;
pub mod reporters;
mod system;

pub use builder::ContextBuilder;
pub use channels::ChannelEntry;
pub use context::Context;
pub use handle::ContextHandle;
pub use reporters::ReporterSelection;
pub use system::{ACTIVE_ENV_VAR, SystemDefaults, platform_name, subdir};
