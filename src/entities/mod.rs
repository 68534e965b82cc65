//! `SeaORM` entities read by the authorization core and the clinic services.

pub mod prelude;

pub mod company;
pub mod department;
pub mod inventory_item;
pub mod lab_master;
pub mod outpatient_queue;
pub mod patient;
pub mod permission;
pub mod plant;
pub mod role;
pub mod role_permission;
pub mod user;
