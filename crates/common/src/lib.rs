//! Common utilities and shared types for ecocomb.
//!
//! This crate provides foundational components used across all ecocomb crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **RUT**: Chilean national ID validation via [`validate_rut`]
//!
//! # Example
//!
//! ```no_run
//! use ecocomb_common::{AppResult, Config, IdGenerator, validate_rut};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     validate_rut(Some("12.345.678-5"))?;
//!     println!("{} listening on {}", id_gen.generate(), config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod rut;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use rut::{RutError, validate_rut};
