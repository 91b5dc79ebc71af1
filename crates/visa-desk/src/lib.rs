//! Review engine behind the client portal and admin dashboard.
//!
//! Clients file up to three independent applications (equivalence, residence,
//! partner). Each one moves through a small status machine that admins drive
//! from the dashboard, with a fixed cooldown gating resubmission after a
//! rejection.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
