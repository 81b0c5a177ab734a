pub mod extract;
pub mod pack;
