pub mod member;
pub mod registry;
