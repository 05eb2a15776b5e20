pub mod client;
pub mod svk;
pub mod tibber;
