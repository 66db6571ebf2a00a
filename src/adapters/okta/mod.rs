//! Okta adapter - group provisioning and manager lookups.

mod client;
mod directory;
mod provisioner;

pub use client::{OktaClient, OktaConfig};
pub use directory::OktaDirectory;
pub use provisioner::OktaProvisioner;
