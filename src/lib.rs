// src/lib.rs

//! docwatch library
//!
//! Polls a list of remote documents (HTML pages and PDFs), detects
//! content changes against a persisted metadata store, archives
//! superseded versions and renders dated diff artifacts.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
