use derive_more::{Display, Error, IsVariant};
use exact_rational::ParseRationalError;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by [`Tableau`](crate::Tableau) construction, queries and
/// mutations.
///
/// "No eligible pivot column/row" is not an error: selection methods return
/// `Ok(None)` for that outcome, keeping the normal algorithmic result
/// (optimal tableau, unbounded direction) out of the error channel.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, IsVariant)]
pub enum Error {
    /// Malformed tableau text; construction is aborted.
    #[display(fmt = "invalid input: {}", _0)]
    InvalidInput(#[error(not(source))] String),
    /// A name failed the role check required by the call.
    #[display(fmt = "invalid variable: {}", _0)]
    InvalidVariable(#[error(not(source))] String),
    /// A value token inside the tableau text did not parse.
    #[display(fmt = "invalid rational value: {}", _0)]
    InvalidRational(#[error(source)] ParseRationalError),
    /// A pivot was requested on a zero coefficient.
    #[display(fmt = "division by zero: pivot coefficient is zero")]
    DivisionByZero,
}

impl From<ParseRationalError> for Error {
    fn from(err: ParseRationalError) -> Self {
        Self::InvalidRational(err)
    }
}
