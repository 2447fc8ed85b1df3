pub mod draft;
pub mod employee;
pub mod holiday;
pub mod passbook;
