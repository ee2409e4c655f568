pub mod credential_store;
pub mod endpoints;
pub mod gateway;
pub mod models;
pub mod storage;
pub mod transport;

pub use credential_store::*;
pub use endpoints::*;
pub use gateway::*;
pub use models::*;
pub use storage::*;
pub use transport::*;
