pub mod employee;
pub mod errors;
pub mod login;
pub mod statistics;
pub mod task;
pub mod user;

pub use employee::*;
pub use errors::*;
pub use login::*;
pub use statistics::*;
pub use task::*;
pub use user::*;
