//! HTTP client module
//!
//! Provides HTTP client functionality for reaching the system under test.

mod client;

pub use client::{HttpClient, HttpError, HttpRequest, HttpResponse};
