//! Named-variable simplex tableau over exact rationals.

use std::{collections::HashMap, fmt, str::FromStr};

use exact_rational::Rational;
use num_traits::Zero;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

const DELIMITER: char = '\t';
const HEADER_START: &str = "BVs";
const HEADER_END: &str = "RHS";

/// Simplex tableau with name-keyed rows. After any completed pivot, each
/// basic variable's column is `1` in its own row and `0` everywhere else.
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    regular_vars: Vec<String>,
    basic_vars: Vec<String>,
    objective_vars: Vec<String>,
    basic_rows: HashMap<String, HashMap<String, Rational>>,
    objective_rows: HashMap<String, HashMap<String, Rational>>,
    rhs: HashMap<String, Rational>,
}

impl Tableau {
    pub fn is_regular(&self, name: &str) -> bool {
        self.regular_vars.iter().any(|var| var == name)
    }

    pub fn is_basic(&self, name: &str) -> bool {
        self.basic_vars.iter().any(|var| var == name)
    }

    pub fn is_objective(&self, name: &str) -> bool {
        self.objective_vars.iter().any(|var| var == name)
    }

    pub fn num_regular_vars(&self) -> usize {
        self.regular_vars.len()
    }

    /// Column order of the tableau.
    pub fn regular_vars(&self) -> &[String] {
        &self.regular_vars
    }

    /// Row order of the constraint block; one entry per basic row.
    pub fn basic_vars(&self) -> &[String] {
        &self.basic_vars
    }

    pub fn objective_vars(&self) -> &[String] {
        &self.objective_vars
    }

    /// Coefficient of `column` in the basic or objective row named `row`.
    pub fn coefficient(&self, row: &str, column: &str) -> Result<Rational> {
        let row = self
            .row(row)
            .ok_or_else(|| Error::InvalidVariable(format!("`{row}` does not name a row")))?;
        row.get(column).copied().ok_or_else(|| {
            Error::InvalidVariable(format!("`{column}` is not a regular variable"))
        })
    }

    pub fn rhs_value(&self, row: &str) -> Result<Rational> {
        self.rhs
            .get(row)
            .copied()
            .ok_or_else(|| Error::InvalidVariable(format!("`{row}` does not name a row")))
    }

    /// Pivot column of the first objective row.
    pub fn choose_pivot_column(&self) -> Result<Option<String>> {
        let objective = self.first_objective()?;
        self.choose_pivot_column_in(objective)
    }

    /// Among the regular columns of the named objective row, the one with the
    /// strictly largest coefficient, provided that coefficient is strictly
    /// positive. First column wins ties; `Ok(None)` when no coefficient is
    /// positive (no improving direction).
    pub fn choose_pivot_column_in(&self, objective: &str) -> Result<Option<String>> {
        let row = self.objective_rows.get(objective).ok_or_else(|| {
            Error::InvalidVariable(format!("`{objective}` is not an objective variable"))
        })?;
        let mut best: Option<(&str, Rational)> = None;
        for var in &self.regular_vars {
            let coefficient = row[var.as_str()];
            if coefficient > Rational::zero()
                && best.map_or(true, |(_, largest)| coefficient > largest)
            {
                best = Some((var, coefficient));
            }
        }
        log::debug!("pivot column for `{objective}`: {best:?}");
        Ok(best.map(|(var, _)| var.to_owned()))
    }

    /// Minimum-ratio test: the basic row with the smallest strictly positive
    /// `rhs / coefficient` ratio in the `regular` column. Rows whose
    /// coefficient is zero are excluded. First row wins ties; `Ok(None)`
    /// when no ratio is positive (unbounded direction).
    pub fn choose_pivot_row(&self, regular: &str) -> Result<Option<String>> {
        if !self.is_regular(regular) {
            return Err(Error::InvalidVariable(format!(
                "`{regular}` is not a regular variable"
            )));
        }
        let mut best: Option<(&str, Rational)> = None;
        for basic in &self.basic_vars {
            let Some(ratio) = self.ratio(basic, regular)? else {
                continue;
            };
            if ratio > Rational::zero() && best.map_or(true, |(_, smallest)| ratio < smallest) {
                best = Some((basic, ratio));
            }
        }
        log::debug!("pivot row for `{regular}`: {best:?}");
        Ok(best.map(|(basic, _)| basic.to_owned()))
    }

    /// `rhs[basic] / coefficient` for one basic row, or `Ok(None)` when the
    /// coefficient is zero.
    pub fn ratio(&self, basic: &str, regular: &str) -> Result<Option<Rational>> {
        let row = self
            .basic_rows
            .get(basic)
            .ok_or_else(|| Error::InvalidVariable(format!("`{basic}` is not a basic variable")))?;
        let coefficient = *row.get(regular).ok_or_else(|| {
            Error::InvalidVariable(format!("`{regular}` is not a regular variable"))
        })?;
        Ok(self.rhs[basic].checked_div(coefficient))
    }

    /// True iff the first objective row has no improving direction.
    pub fn is_optimal(&self) -> Result<bool> {
        let objective = self.first_objective()?;
        self.is_optimal_in(objective)
    }

    pub fn is_optimal_in(&self, objective: &str) -> Result<bool> {
        let row = self.objective_rows.get(objective).ok_or_else(|| {
            Error::InvalidVariable(format!("`{objective}` is not an objective variable"))
        })?;
        Ok(self
            .regular_vars
            .iter()
            .all(|var| row[var.as_str()] <= Rational::zero()))
    }

    /// Adds `factor * source` (including the RHS) into `target`. General row
    /// primitive; both names may refer to basic or objective rows.
    pub fn row_operation(&mut self, target: &str, source: &str, factor: Rational) -> Result<()> {
        let source_row = self
            .row(source)
            .ok_or_else(|| Error::InvalidVariable(format!("`{source}` does not name a row")))?
            .clone();
        let source_rhs = self.rhs[source];
        let target_row = self
            .row_mut(target)
            .ok_or_else(|| Error::InvalidVariable(format!("`{target}` does not name a row")))?;
        for (var, coefficient) in target_row.iter_mut() {
            *coefficient += factor * source_row[var.as_str()];
        }
        let rhs_value = self.rhs[target] + factor * source_rhs;
        self.rhs.insert(target.to_owned(), rhs_value);
        log::debug!("row operation: `{target}` += {factor} * `{source}`");
        Ok(())
    }

    /// Normalizes the `pivot_regular` row by its own pivot coefficient,
    /// then eliminates that column from every other row.
    pub fn basic_row_ops(&mut self, pivot_regular: &str) -> Result<()> {
        let pivot_row = self.basic_rows.get_mut(pivot_regular).ok_or_else(|| {
            Error::InvalidVariable(format!("`{pivot_regular}` is not a basic variable"))
        })?;
        let divisor = *pivot_row.get(pivot_regular).ok_or_else(|| {
            Error::InvalidVariable(format!("`{pivot_regular}` has no column in the tableau"))
        })?;
        if divisor.is_zero() {
            return Err(Error::DivisionByZero);
        }

        log::debug!("normalizing pivot row `{pivot_regular}` by {divisor}");
        for coefficient in pivot_row.values_mut() {
            *coefficient /= divisor;
        }
        let rhs_value = self.rhs[pivot_regular] / divisor;
        self.rhs.insert(pivot_regular.to_owned(), rhs_value);

        let other_rows: Vec<String> = self
            .basic_vars
            .iter()
            .filter(|name| name.as_str() != pivot_regular)
            .chain(self.objective_vars.iter())
            .cloned()
            .collect();
        for name in other_rows {
            let factor = match self.row(&name) {
                Some(row) => -row[pivot_regular],
                None => continue,
            };
            if factor.is_zero() {
                continue;
            }
            self.row_operation(&name, pivot_regular, factor)?;
        }
        Ok(())
    }

    /// Full pivot step: re-keys the `basic` row to `regular`, swaps the
    /// basis entry at its position, then runs
    /// [`basic_row_ops`](Self::basic_row_ops). Role checks happen before
    /// any mutation.
    pub fn pivot_on(&mut self, basic: &str, regular: &str) -> Result<()> {
        let position = self
            .basic_vars
            .iter()
            .position(|name| name == basic)
            .ok_or_else(|| Error::InvalidVariable(format!("`{basic}` is not a basic variable")))?;
        let pivot_coefficient = *self
            .basic_rows
            .get(basic)
            .and_then(|row| row.get(regular))
            .ok_or_else(|| {
                Error::InvalidVariable(format!("`{regular}` is not a regular variable"))
            })?;
        if basic != regular && self.is_basic(regular) {
            return Err(Error::InvalidVariable(format!(
                "`{regular}` is already basic"
            )));
        }
        if pivot_coefficient.is_zero() {
            return Err(Error::DivisionByZero);
        }

        log::info!("pivot: `{regular}` enters the basis, `{basic}` leaves");
        if basic != regular {
            if let (Some(row), Some(rhs_value)) =
                (self.basic_rows.remove(basic), self.rhs.remove(basic))
            {
                self.basic_rows.insert(regular.to_owned(), row);
                self.rhs.insert(regular.to_owned(), rhs_value);
            }
            self.basic_vars[position] = regular.to_owned();
        }

        self.basic_row_ops(regular)
    }

    /// Appends a constraint row verbatim, without normalizing it against the
    /// rest of the tableau. Callers grow the tableau safely with the
    /// two-step sequence `add_basic_row(name, ..)` then
    /// `basic_row_ops(name)`.
    pub fn add_basic_row(
        &mut self,
        name: &str,
        coefficients: &[Rational],
        rhs_value: Rational,
    ) -> Result<()> {
        if self.is_basic(name) || self.is_objective(name) {
            return Err(Error::InvalidVariable(format!(
                "`{name}` already names a row"
            )));
        }
        if coefficients.len() != self.regular_vars.len() {
            return Err(Error::InvalidInput(format!(
                "row `{name}` has {} coefficients, expected {}",
                coefficients.len(),
                self.regular_vars.len()
            )));
        }
        let row = self
            .regular_vars
            .iter()
            .cloned()
            .zip(coefficients.iter().copied())
            .collect();
        self.basic_vars.push(name.to_owned());
        self.basic_rows.insert(name.to_owned(), row);
        self.rhs.insert(name.to_owned(), rhs_value);
        Ok(())
    }

    /// Appends a regular column holding zero in every existing row.
    pub fn add_regular_var(&mut self, name: &str) -> Result<()> {
        if self.is_regular(name) {
            return Err(Error::InvalidVariable(format!(
                "`{name}` is already a regular variable"
            )));
        }
        self.regular_vars.push(name.to_owned());
        for row in self
            .basic_rows
            .values_mut()
            .chain(self.objective_rows.values_mut())
        {
            row.insert(name.to_owned(), Rational::zero());
        }
        Ok(())
    }

    /// Renders the tableau as a LaTeX `array` environment. `pivot` names the
    /// (basic-row, regular-column) cell to set in bold. Presentation only.
    pub fn latex(&self, pivot: Option<(&str, &str)>) -> String {
        let mut out = String::new();
        out.push_str("\\begin{array}{l|");
        out.push_str(&"c".repeat(self.regular_vars.len()));
        out.push_str("|c}\n\\text{BVs}");
        for var in &self.regular_vars {
            out.push_str(" & ");
            out.push_str(var);
        }
        out.push_str(" & \\text{RHS} \\\\\n\\hline\n");
        for name in self.objective_vars.iter().chain(self.basic_vars.iter()) {
            out.push_str(name);
            if let Some(row) = self.row(name) {
                for var in &self.regular_vars {
                    let cell = row[var.as_str()].latex().to_string();
                    out.push_str(" & ");
                    if pivot == Some((name.as_str(), var.as_str())) {
                        out.push_str(&format!("\\mathbf{{{cell}}}"));
                    } else {
                        out.push_str(&cell);
                    }
                }
            }
            out.push_str(&format!(" & {} \\\\\n", self.rhs[name.as_str()].latex()));
        }
        out.push_str("\\end{array}\n");
        out
    }

    fn first_objective(&self) -> Result<&str> {
        self.objective_vars
            .first()
            .map(String::as_str)
            .ok_or_else(|| Error::InvalidVariable("the tableau has no objective rows".to_owned()))
    }

    fn row(&self, name: &str) -> Option<&HashMap<String, Rational>> {
        self.basic_rows
            .get(name)
            .or_else(|| self.objective_rows.get(name))
    }

    fn row_mut(&mut self, name: &str) -> Option<&mut HashMap<String, Rational>> {
        if self.basic_rows.contains_key(name) {
            self.basic_rows.get_mut(name)
        } else {
            self.objective_rows.get_mut(name)
        }
    }
}

impl FromStr for Tableau {
    type Err = Error;

    /// Parses the canonical tab/whitespace-delimited text form. A row is
    /// classified as basic when its name already has a regular column,
    /// otherwise as objective. Construction is all-or-nothing.
    fn from_str(input: &str) -> Result<Self> {
        let mut lines = input.lines().filter(|line| !line.trim().is_empty());
        let header = lines
            .next()
            .ok_or_else(|| Error::InvalidInput("empty tableau".to_owned()))?;
        let mut tokens = header.split_whitespace();
        if tokens.next() != Some(HEADER_START) {
            return Err(Error::InvalidInput(format!(
                "header must start with `{HEADER_START}`"
            )));
        }
        let mut regular_vars: Vec<String> = tokens.map(str::to_owned).collect();
        if regular_vars.pop().as_deref() != Some(HEADER_END) {
            return Err(Error::InvalidInput(format!(
                "header must end with `{HEADER_END}`"
            )));
        }
        for (i, var) in regular_vars.iter().enumerate() {
            if regular_vars[..i].contains(var) {
                return Err(Error::InvalidInput(format!(
                    "duplicate column `{var}` in header"
                )));
            }
        }

        let mut tableau = Self {
            regular_vars,
            basic_vars: Vec::new(),
            objective_vars: Vec::new(),
            basic_rows: HashMap::new(),
            objective_rows: HashMap::new(),
            rhs: HashMap::new(),
        };

        for line in lines {
            let mut tokens = line.split_whitespace();
            let name = match tokens.next() {
                Some(name) => name,
                None => continue,
            };
            let values: Vec<&str> = tokens.collect();
            if values.len() != tableau.regular_vars.len() + 1 {
                return Err(Error::InvalidInput(format!(
                    "row `{name}` has {} values, expected {}",
                    values.len(),
                    tableau.regular_vars.len() + 1
                )));
            }
            if tableau.rhs.contains_key(name) {
                return Err(Error::InvalidInput(format!("duplicate row `{name}`")));
            }
            let mut row = HashMap::with_capacity(tableau.regular_vars.len());
            for (var, token) in tableau.regular_vars.iter().zip(&values) {
                row.insert(var.clone(), token.parse::<Rational>()?);
            }
            let rhs_value: Rational = values[tableau.regular_vars.len()].parse()?;
            if tableau.is_regular(name) {
                tableau.basic_vars.push(name.to_owned());
                tableau.basic_rows.insert(name.to_owned(), row);
            } else {
                tableau.objective_vars.push(name.to_owned());
                tableau.objective_rows.insert(name.to_owned(), row);
            }
            tableau.rhs.insert(name.to_owned(), rhs_value);
        }

        Ok(tableau)
    }
}

impl fmt::Display for Tableau {
    /// Canonical text form: header line, then objective rows, then basic
    /// rows, all tab-delimited. Parsing the output reproduces the tableau.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{HEADER_START}")?;
        for var in &self.regular_vars {
            write!(f, "{DELIMITER}{var}")?;
        }
        writeln!(f, "{DELIMITER}{HEADER_END}")?;
        for name in self.objective_vars.iter().chain(self.basic_vars.iter()) {
            write!(f, "{name}")?;
            if let Some(row) = self.row(name) {
                for var in &self.regular_vars {
                    write!(f, "{DELIMITER}{}", row[var.as_str()])?;
                }
            }
            writeln!(f, "{DELIMITER}{}", self.rhs[name.as_str()])?;
        }
        Ok(())
    }
}

impl Serialize for Tableau {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tableau {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
