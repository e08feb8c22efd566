pub mod draft;
pub mod message;
