//! OCR Service Library
//!
//! Converts uploaded images into recognized text plus a confidence score,
//! sharing a fixed set of OCR engines between all concurrent requests.
//!
//! # Modules
//!
//! - `ocr`: Recognition engines (Tesseract behind `ocr-tesseract`)
//! - `pool`: Bounded engine pool with blocking-task offload
//! - `routes`: HTTP gateway built on axum
//! - `state`, `config`, `error`: Application plumbing used by the binary

pub mod config;
pub mod error;
pub mod ocr;
pub mod pool;
pub mod routes;
pub mod state;
