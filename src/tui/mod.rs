//! Terminal dashboard for the resource samplers.
//!
//! Three bordered rows (CPU, memory, disk) repainted by a single render loop
//! that owns both the terminal and the display slots.

mod app;
mod event;
mod render;
mod state;
mod style;
mod surface;

pub use app::Dashboard;
pub use event::{Event, EventHandler, EventWaker, is_quit_key};
pub use render::render;
pub use state::{DashboardState, DisplaySlot};
pub use surface::Surface;
