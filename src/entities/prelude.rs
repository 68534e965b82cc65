pub use super::company::Entity as Company;
pub use super::department::Entity as Department;
pub use super::inventory_item::Entity as InventoryItem;
pub use super::lab_master::Entity as LabMaster;
pub use super::outpatient_queue::Entity as OutpatientQueue;
pub use super::patient::Entity as Patient;
pub use super::permission::Entity as Permission;
pub use super::plant::Entity as Plant;
pub use super::role::Entity as Role;
pub use super::role_permission::Entity as RolePermission;
pub use super::user::Entity as User;
