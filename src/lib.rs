// src/lib.rs

//! LottoGen Library
//!
//! Fetches Lotto 6/49 and Lotto Max draw history from a chain of result
//! providers, analyzes number frequencies and generates weighted lines.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

pub use error::{AppError, Result};
