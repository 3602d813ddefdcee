//! Certificate lookup proxy.
//!
//! Forwards a certificate number to a third-party search API and relays
//! its JSON response unchanged.

pub mod client;

#[cfg(test)]
pub(crate) mod stub;

pub use client::CertificateClient;
