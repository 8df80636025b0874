//! Handler module organization for the SmartBank backend API.
//!
//! This module re-exports the auth, KYC, fraud, and health handler modules for API routing.

pub mod auth;
pub mod fraud;
pub mod health;
pub mod kyc;
