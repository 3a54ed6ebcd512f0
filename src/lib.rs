//! Exact-rational simplex pivoting over a named-variable tableau.
//!
//! The tableau is driven step by step: pick a column with
//! [`Tableau::choose_pivot_column`], a row with [`Tableau::choose_pivot_row`],
//! then exchange them with [`Tableau::pivot_on`] until
//! [`Tableau::is_optimal`] holds. Every cell is a [`Rational`], so pivoting
//! is bit-exact.

mod error;
pub mod tableau;

pub use error::{Error, Result};
pub use exact_rational::{LatexRational, ParseRationalError, Rational};
pub use tableau::Tableau;
