#![forbid(unsafe_code)]

//! Core calculation pipeline for the tally calculator.
//!
//! This crate holds everything below the history engine: the decimal
//! operand validator, the [`BinaryOp`] strategy trait with its ten built-in
//! variants, the [`OpRegistry`] that maps textual names to constructors,
//! and the [`Calculation`] record produced by every executed operation.
//!
//! # Architecture
//!
//! ```text
//! "divide", "10", "4"
//!      │
//!      ▼
//! ┌─────────────┐  resolve   ┌──────────────┐
//! │ OpRegistry  │ ─────────► │ Box<dyn      │
//! └─────────────┘            │   BinaryOp>  │
//!                            └──────┬───────┘
//! parse_operand(raw)                │ execute(a, b) = validate + compute
//!      │                            ▼
//!      └──────────────────► ┌──────────────┐
//!                           │ Calculation  │  operation, operands,
//!                           └──────────────┘  derived result, timestamp
//! ```
//!
//! Validation always runs before computation: [`BinaryOp::execute`] is a
//! provided method that cannot skip [`BinaryOp::validate`], and
//! [`Calculation::evaluate`] only ever goes through `execute`.

pub mod error;
pub mod operation;
pub mod record;
pub mod registry;
pub mod value;

pub use error::{CalcError, Result};
pub use operation::BinaryOp;
pub use record::{CalcRow, Calculation};
pub use registry::OpRegistry;
pub use value::{InputPolicy, format_decimal, parse_operand};
