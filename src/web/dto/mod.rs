pub mod account;
pub mod exercises;
pub mod stats;
pub mod submissions;
