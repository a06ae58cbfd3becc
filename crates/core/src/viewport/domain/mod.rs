pub mod viewport_mapping;
pub mod viewport_state;
