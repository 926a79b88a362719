pub mod bbox;
pub mod classes;
