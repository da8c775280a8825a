pub mod gate;
pub mod policy;
