pub mod permission_model;
pub mod session_model;
