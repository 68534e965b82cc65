pub mod department;
pub mod inventory;
pub mod lab_master;
pub mod outpatient_queue;
pub mod user;

pub use department::*;
pub use inventory::*;
pub use lab_master::*;
pub use outpatient_queue::*;
pub use user::*;
