//! Maintenance-Request Intake Service
//!
//! This library provides the core functionality for the maintenance-intake
//! system: clients submit a problem description, a photo, a phone number and
//! a geolocation; the photo is classified and the request summarized via a
//! generative AI service, and every accepted submission is relayed to an
//! external spreadsheet webhook.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
