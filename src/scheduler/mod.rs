//! Queue disciplines for the two processing tiers.

pub mod cloud;
pub mod fog;

pub use cloud::CloudQueue;
pub use fog::FogQueue;
