pub mod audit;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod guards;
pub mod jwt;
pub mod middleware;
pub mod permissions;
pub mod policy;
pub mod tenancy;
pub mod types;

pub use engine::*;
pub use error::*;
pub use guards::*;
pub use jwt::*;
pub use middleware::*;
pub use permissions::*;
pub use policy::*;
pub use tenancy::*;
pub use types::*;
