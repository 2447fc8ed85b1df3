pub mod employee_form;
pub mod fields;

pub use employee_form::{EmployeeForm, FieldIssue, FormError};
pub use fields::{DocumentSlot, Field, FieldPath};
