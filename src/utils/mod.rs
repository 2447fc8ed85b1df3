pub mod document;
pub mod draft_store;
pub mod validation;
