//! Output generation for search results.
//!
//! # Submodules
//!
//! - [`json`]: Writes the final article list to a JSON file
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── central-bank-rates_2024-01-01_2024-01-20.json
//! ```

pub mod json;
