mod rational;

pub use rational::{LatexRational, ParseRationalError, Rational};
