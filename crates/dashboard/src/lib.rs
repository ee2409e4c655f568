pub mod admin_tasks;
pub mod app;
pub mod confirm;
pub mod employees;
pub mod login;
pub mod overview;
pub mod profile;
pub mod reconciler;
pub mod router;
pub mod session;
pub mod team;

pub use admin_tasks::*;
pub use app::*;
pub use confirm::*;
pub use employees::*;
pub use login::*;
pub use overview::*;
pub use profile::*;
pub use reconciler::*;
pub use router::*;
pub use session::*;
pub use team::*;
