pub mod employee;
pub mod holiday;
