pub mod account;
pub mod stats;
