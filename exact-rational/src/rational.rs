use std::{
    cmp::Ordering,
    fmt,
    iter::{Product, Sum},
    num::ParseIntError,
    ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use num_integer::Integer;
use num_traits::{One, Zero};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// An exact fraction over `i64`, always kept in canonical form:
/// positive denominator, lowest terms, `0/1` for zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    numer: i64,
    denom: i64,
}

/// Failure to read a `Rational` from its text form (`int` or `int/int`).
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseRationalError {
    #[display(fmt = "invalid integer in rational token: {}", _0)]
    InvalidInteger(#[error(source)] ParseIntError),
    #[display(fmt = "rational token has a zero denominator")]
    ZeroDenominator,
}

impl From<ParseIntError> for ParseRationalError {
    fn from(err: ParseIntError) -> Self {
        Self::InvalidInteger(err)
    }
}

impl Rational {
    /// # Panics
    /// Panics if `denom` is zero, like integer division does.
    pub fn new(numer: i64, denom: i64) -> Self {
        assert_ne!(denom, 0, "denominator must be non-zero");
        Self::reduced(numer, denom)
    }

    #[inline]
    pub const fn from_integer(numer: i64) -> Self {
        Self { numer, denom: 1 }
    }

    #[inline]
    pub const fn numer(&self) -> i64 {
        self.numer
    }

    #[inline]
    pub const fn denom(&self) -> i64 {
        self.denom
    }

    /// Re-establishes the canonical form: positive denominator, lowest
    /// terms, denominator forced to 1 when the numerator is zero.
    fn reduced(mut numer: i64, mut denom: i64) -> Self {
        debug_assert_ne!(denom, 0);
        if denom < 0 {
            numer = -numer;
            denom = -denom;
        }
        let divisor = numer.gcd(&denom);
        numer /= divisor;
        denom /= divisor;
        if numer == 0 {
            denom = 1;
        }
        Self { numer, denom }
    }

    /// Division that reports a zero divisor instead of panicking.
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        (!rhs.is_zero()).then(|| self / rhs)
    }

    /// `\frac{numer}{denom}` (bare `numer` when the denominator is 1).
    pub const fn latex(self) -> LatexRational {
        LatexRational(self)
    }
}

impl From<i64> for Rational {
    #[inline]
    fn from(numer: i64) -> Self {
        Self::from_integer(numer)
    }
}

impl Default for Rational {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}

impl Zero for Rational {
    #[inline]
    fn zero() -> Self {
        Self::from_integer(0)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.numer == 0
    }
}

impl One for Rational {
    #[inline]
    fn one() -> Self {
        Self::from_integer(1)
    }

    #[inline]
    fn is_one(&self) -> bool {
        self.numer == 1 && self.denom == 1
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::reduced(
            self.numer * rhs.denom + self.denom * rhs.numer,
            self.denom * rhs.denom,
        )
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::reduced(
            self.numer * rhs.denom - self.denom * rhs.numer,
            self.denom * rhs.denom,
        )
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::reduced(self.numer * rhs.numer, self.denom * rhs.denom)
    }
}

impl Div for Rational {
    type Output = Self;

    /// # Panics
    /// Panics if `rhs` is zero.
    fn div(self, rhs: Self) -> Self {
        assert!(!rhs.is_zero(), "division by zero");
        Self::reduced(self.numer * rhs.denom, self.denom * rhs.numer)
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            numer: -self.numer,
            denom: self.denom,
        }
    }
}

impl AddAssign for Rational {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Rational {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for Rational {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl DivAssign for Rational {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl Sum for Rational {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |sum, el| sum + el)
    }
}

impl Product for Rational {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::one(), |product, el| product * el)
    }
}

impl Ord for Rational {
    /// Cross-multiplied comparison; denominators are always positive.
    fn cmp(&self, other: &Self) -> Ordering {
        (self.numer * other.denom).cmp(&(other.numer * self.denom))
    }
}

impl PartialOrd for Rational {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Rational {
    type Err = ParseRationalError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.split_once('/') {
            Some((numer, denom)) => {
                let numer: i64 = numer.parse()?;
                let denom: i64 = denom.parse()?;
                if denom == 0 {
                    return Err(ParseRationalError::ZeroDenominator);
                }
                Ok(Self::new(numer, denom))
            }
            None => Ok(Self::from_integer(token.parse()?)),
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

/// Display adapter produced by [`Rational::latex`].
#[derive(Debug, Clone, Copy)]
pub struct LatexRational(Rational);

impl fmt::Display for LatexRational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.denom == 1 {
            write!(f, "{}", self.0.numer)
        } else {
            write!(f, "\\frac{{{}}}{{{}}}", self.0.numer, self.0.denom)
        }
    }
}

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.numer, self.denom).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (numer, denom) = <(i64, i64)>::deserialize(deserializer)?;
        if denom == 0 {
            return Err(de::Error::custom("rational with a zero denominator"));
        }
        Ok(Self::new(numer, denom))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq as assert_pretty_eq;
    use proptest::prelude::*;

    use super::*;

    fn rat(numer: i64, denom: i64) -> Rational {
        Rational::new(numer, denom)
    }

    #[test]
    fn construction_normalizes() {
        assert_eq!(rat(2, 4), rat(1, 2));
        assert_eq!(rat(-1, -2), rat(1, 2));
        assert_eq!(rat(3, -6), rat(-1, 2));
        assert_eq!(rat(0, 5), Rational::from_integer(0));
        assert_eq!(rat(0, -5).denom(), 1);
    }

    #[test]
    #[should_panic(expected = "denominator must be non-zero")]
    fn zero_denominator_panics() {
        let _ = rat(1, 0);
    }

    #[test]
    fn arithmetic() {
        assert_eq!(rat(1, 2) + rat(1, 3), rat(5, 6));
        assert_eq!(rat(1, 2) - rat(1, 3), rat(1, 6));
        assert_eq!(rat(2, 3) * rat(3, 4), rat(1, 2));
        assert_eq!(rat(1, 2) / rat(3, 2), rat(1, 3));
        assert_eq!(-rat(1, 2), rat(-1, 2));
    }

    #[test]
    fn compound_assignment_keeps_canonical_form() {
        let mut x = rat(1, 6);
        x += rat(1, 3);
        assert_eq!(x, rat(1, 2));
        x *= rat(4, 1);
        assert_eq!(x, rat(2, 1));
        x -= rat(2, 1);
        assert_eq!(x, Rational::zero());
        assert_eq!(x.denom(), 1);
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn division_by_zero_panics() {
        let _ = rat(1, 2) / Rational::zero();
    }

    #[test]
    fn checked_div_reports_zero_divisor() {
        assert_eq!(rat(1, 2).checked_div(Rational::zero()), None);
        assert_eq!(rat(1, 2).checked_div(rat(1, 4)), Some(rat(2, 1)));
    }

    #[test]
    fn ordering_by_cross_multiplication() {
        assert!(rat(1, 2) < rat(2, 3));
        assert!(rat(-1, 3) < Rational::zero());
        assert!(rat(7, 3) > rat(9, 4));
        assert!(rat(1, 2) <= rat(2, 4));
        assert!(rat(1, 2) >= rat(2, 4));
    }

    #[test]
    fn parses_integers_and_fractions() {
        assert_pretty_eq!("7".parse::<Rational>(), Ok(rat(7, 1)));
        assert_pretty_eq!("-3/9".parse::<Rational>(), Ok(rat(-1, 3)));
        assert_pretty_eq!("4/-6".parse::<Rational>(), Ok(rat(-2, 3)));
        assert_pretty_eq!(
            "1/0".parse::<Rational>(),
            Err(ParseRationalError::ZeroDenominator)
        );
        assert!(matches!(
            "one".parse::<Rational>(),
            Err(ParseRationalError::InvalidInteger(_))
        ));
        assert!(matches!(
            "/2".parse::<Rational>(),
            Err(ParseRationalError::InvalidInteger(_))
        ));
    }

    #[test]
    fn renders_text_and_latex() {
        assert_pretty_eq!(rat(3, 1).to_string(), "3");
        assert_pretty_eq!(rat(-5, 2).to_string(), "-5/2");
        assert_pretty_eq!(rat(3, 1).latex().to_string(), "3");
        assert_pretty_eq!(rat(-5, 2).latex().to_string(), "\\frac{-5}{2}");
    }

    #[test]
    fn sum_and_product() {
        let values = [rat(1, 2), rat(1, 3), rat(1, 6)];
        assert_eq!(values.into_iter().sum::<Rational>(), Rational::one());
        assert_eq!(values.into_iter().product::<Rational>(), rat(1, 36));
    }

    prop_compose! {
        // Component bounds keep the cross-multiplications in the laws below
        // away from i64 overflow.
        fn arb_rational()(numer in -10_000i64..=10_000, denom in 1i64..=10_000) -> Rational {
            Rational::new(numer, denom)
        }
    }

    proptest! {
        #[test]
        fn canonical_form_invariant(r in arb_rational()) {
            prop_assert!(r.denom() > 0);
            if r.numer() == 0 {
                prop_assert_eq!(r.denom(), 1);
            } else {
                prop_assert_eq!(r.numer().gcd(&r.denom()), 1);
            }
        }

        #[test]
        fn text_round_trip(r in arb_rational()) {
            prop_assert_eq!(r.to_string().parse::<Rational>(), Ok(r));
        }

        #[test]
        fn addition_commutes(a in arb_rational(), b in arb_rational()) {
            prop_assert_eq!(a + b, b + a);
        }

        #[test]
        fn multiplication_commutes(a in arb_rational(), b in arb_rational()) {
            prop_assert_eq!(a * b, b * a);
        }

        #[test]
        fn additive_inverse(r in arb_rational()) {
            prop_assert_eq!(r + (-r), Rational::zero());
        }

        #[test]
        fn multiplicative_inverse(r in arb_rational()) {
            prop_assume!(!r.is_zero());
            prop_assert_eq!(r * (Rational::one() / r), Rational::one());
        }

        #[test]
        fn ordering_is_total_and_antisymmetric(a in arb_rational(), b in arb_rational()) {
            match a.cmp(&b) {
                Ordering::Less => prop_assert_eq!(b.cmp(&a), Ordering::Greater),
                Ordering::Greater => prop_assert_eq!(b.cmp(&a), Ordering::Less),
                Ordering::Equal => prop_assert_eq!(a, b),
            }
        }
    }
}
