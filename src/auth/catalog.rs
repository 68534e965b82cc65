//! Names of the modules and permissions the clinic API gates on.
//!
//! Rows in the `permission` table must use exactly these strings.

pub mod modules {
    pub const LABORATORIUM: &str = "laboratorium";
    pub const OUTPATIENT: &str = "outpatient";
    pub const MASTER_DATA: &str = "master_data";
}

pub mod permissions {
    pub const LAB_MASTER_CREATE: &str = "lab_master.create";
    pub const LAB_MASTER_UPDATE: &str = "lab_master.update";
    pub const LAB_MASTER_DELETE: &str = "lab_master.delete";

    pub const OUTPATIENT_QUEUE_CREATE: &str = "outpatient_queue.create";
    pub const OUTPATIENT_QUEUE_UPDATE: &str = "outpatient_queue.update";
    pub const OUTPATIENT_QUEUE_DELETE: &str = "outpatient_queue.delete";

    pub const INVENTORY_ITEM_VIEW: &str = "inventory_item.view";
    pub const INVENTORY_ITEM_UPDATE: &str = "inventory_item.update";

    pub const DEPARTMENT_UPDATE: &str = "department.update";
}
