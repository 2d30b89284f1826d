//! gdnpro-db: persistent settings and renamer patterns.
//!
//! This crate stores tool settings in SQLite using rusqlite and r2d2
//! connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use gdnpro_db::pool::{get_conn, init_pool};
//! use gdnpro_db::queries::settings;
//!
//! let pool = init_pool("/home/me/.config/gdnpro/gdnpro.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! settings::set(&conn, "gif_frames", "Loop").unwrap();
//! assert_eq!(settings::get(&conn, "gif_frames").unwrap().as_deref(), Some("Loop"));
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
