//! PPM closeout library
//!
//! Terminal flow for documenting a personally procured move: trip weight
//! tickets, pro-gear, expense receipts, a review page and the signed
//! final closeout.

pub mod domain;
pub mod application;
pub mod cli;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
