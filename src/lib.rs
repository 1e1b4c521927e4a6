//! Elegir: a small train / track / select / export / serve pipeline
//!
//! Trains several classifier variants over hyperparameter grids on a toy
//! dataset, records each attempt as a tracked run, selects the run with the
//! best validation accuracy, exports its artifact, and serves predictions
//! over HTTP.
//!
//! # Pipeline
//!
//! ```text
//! runner (grid search) --> tracking (persisted runs) --> export (best model)
//!                                                            |
//!                                                            v
//!                                                  server (HTTP façade)
//! ```
//!
//! # Example
//!
//! ```
//! use elegir::search::{ParamGrid, ParamValue};
//!
//! let mut grid = ParamGrid::new();
//! grid.add("C", vec![ParamValue::Float(0.1), ParamValue::Float(1.0)]);
//! grid.add("max_iter", vec![ParamValue::Int(200)]);
//!
//! let combos = grid.combinations();
//! assert_eq!(combos.len(), 2);
//! ```

pub mod cli;
pub mod config;
pub mod data;
pub mod export;
pub mod model;
pub mod runner;
pub mod search;
pub mod server;
pub mod tracking;
