// Arithmetic on linear-linear tabulated functions
//
// Scalar operations act on the values only. Function operations are carried
// out on the union of both grids with each operand zero-extended outside its
// own domain; wherever the combined left and right limits differ the result
// receives a jump.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::error::{DryadError, Result};
use crate::tabulated::TabulatedFunction;

fn require_linearised(table: &TabulatedFunction, operation: &str) -> Result<()> {
    if table.is_linearised() {
        Ok(())
    } else {
        Err(DryadError::UnsupportedOperation(format!(
            "{} requires a linearised function, found interpolants {:?}",
            operation,
            table.interpolants()
        )))
    }
}

fn map_values<F>(table: &TabulatedFunction, operation: &str, function: F) -> Result<TabulatedFunction>
where
    F: Fn(f64) -> f64,
{
    require_linearised(table, operation)?;
    let mut result = table.clone();
    result.values_mut().iter_mut().for_each(|value| *value = function(*value));
    Ok(result)
}

fn check_divisor(divisor: f64) -> Result<()> {
    if divisor == 0.0 || !divisor.is_finite() {
        return Err(DryadError::InvalidParameter(format!(
            "cannot divide a tabulated function by {}",
            divisor
        )));
    }
    Ok(())
}

/// Combine two functions point by point on their union grid.
fn combine<F>(left: &TabulatedFunction, right: &TabulatedFunction, operation: &str, function: F) -> Result<TabulatedFunction>
where
    F: Fn(f64, f64) -> f64,
{
    require_linearised(left, operation)?;
    require_linearised(right, operation)?;

    let mut abscissae: Vec<f64> = left.x().iter().chain(right.x()).copied().collect();
    abscissae.sort_by(f64::total_cmp);
    abscissae.dedup();

    let last = abscissae.len() - 1;
    let mut x = Vec::with_capacity(abscissae.len() + 4);
    let mut y = Vec::with_capacity(abscissae.len() + 4);
    for (index, &value) in abscissae.iter().enumerate() {
        let (left_before, left_after) = left.one_sided_limits(value);
        let (right_before, right_after) = right.one_sided_limits(value);
        let before = function(left_before, right_before);
        let after = function(left_after, right_after);

        if index == 0 {
            x.push(value);
            y.push(after);
        } else if index == last || before == after {
            x.push(value);
            y.push(before);
        } else {
            x.extend([value, value]);
            y.extend([before, after]);
        }
    }

    TabulatedFunction::linear_split_at_jumps(x, y)
}

/// `-table`
pub fn negate(table: &TabulatedFunction) -> Result<TabulatedFunction> {
    map_values(table, "negation", |value| -value)
}

/// `table + scalar`
pub fn add_scalar(table: &TabulatedFunction, scalar: f64) -> Result<TabulatedFunction> {
    map_values(table, "addition", |value| value + scalar)
}

/// `table - scalar`
pub fn subtract_scalar(table: &TabulatedFunction, scalar: f64) -> Result<TabulatedFunction> {
    map_values(table, "subtraction", |value| value - scalar)
}

/// `table * scalar`
pub fn multiply_scalar(table: &TabulatedFunction, scalar: f64) -> Result<TabulatedFunction> {
    map_values(table, "multiplication", |value| value * scalar)
}

/// `table / scalar`
pub fn divide_scalar(table: &TabulatedFunction, scalar: f64) -> Result<TabulatedFunction> {
    check_divisor(scalar)?;
    map_values(table, "division", |value| value / scalar)
}

/// `left + right` on the union grid
pub fn add(left: &TabulatedFunction, right: &TabulatedFunction) -> Result<TabulatedFunction> {
    combine(left, right, "addition", |a, b| a + b)
}

/// `left - right` on the union grid
pub fn subtract(left: &TabulatedFunction, right: &TabulatedFunction) -> Result<TabulatedFunction> {
    combine(left, right, "subtraction", |a, b| a - b)
}

impl TabulatedFunction {
    /// In-place `self += scalar`; `self` is untouched on error
    pub fn add_assign_scalar(&mut self, scalar: f64) -> Result<()> {
        *self = add_scalar(self, scalar)?;
        Ok(())
    }

    /// In-place `self -= scalar`
    pub fn subtract_assign_scalar(&mut self, scalar: f64) -> Result<()> {
        *self = subtract_scalar(self, scalar)?;
        Ok(())
    }

    /// In-place `self *= scalar`
    pub fn multiply_assign_scalar(&mut self, scalar: f64) -> Result<()> {
        *self = multiply_scalar(self, scalar)?;
        Ok(())
    }

    /// In-place `self /= scalar`
    pub fn divide_assign_scalar(&mut self, scalar: f64) -> Result<()> {
        *self = divide_scalar(self, scalar)?;
        Ok(())
    }

    /// In-place `self += other`
    pub fn add_assign_function(&mut self, other: &TabulatedFunction) -> Result<()> {
        *self = add(self, other)?;
        Ok(())
    }

    /// In-place `self -= other`
    pub fn subtract_assign_function(&mut self, other: &TabulatedFunction) -> Result<()> {
        *self = subtract(self, other)?;
        Ok(())
    }
}

impl Neg for &TabulatedFunction {
    type Output = Result<TabulatedFunction>;

    fn neg(self) -> Self::Output {
        negate(self)
    }
}

impl Neg for TabulatedFunction {
    type Output = Result<TabulatedFunction>;

    fn neg(self) -> Self::Output {
        negate(&self)
    }
}

// Operator impls for owned and borrowed receivers delegating to the free functions
macro_rules! scalar_operator {
    ($trait:ident, $method:ident, $function:ident) => {
        impl $trait<f64> for &TabulatedFunction {
            type Output = Result<TabulatedFunction>;

            fn $method(self, scalar: f64) -> Self::Output {
                $function(self, scalar)
            }
        }

        impl $trait<f64> for TabulatedFunction {
            type Output = Result<TabulatedFunction>;

            fn $method(self, scalar: f64) -> Self::Output {
                $function(&self, scalar)
            }
        }
    };
}

macro_rules! function_operator {
    ($trait:ident, $method:ident, $function:ident) => {
        impl $trait<&TabulatedFunction> for &TabulatedFunction {
            type Output = Result<TabulatedFunction>;

            fn $method(self, other: &TabulatedFunction) -> Self::Output {
                $function(self, other)
            }
        }

        impl $trait<TabulatedFunction> for TabulatedFunction {
            type Output = Result<TabulatedFunction>;

            fn $method(self, other: TabulatedFunction) -> Self::Output {
                $function(&self, &other)
            }
        }
    };
}

scalar_operator!(Add, add, add_scalar);
scalar_operator!(Sub, sub, subtract_scalar);
scalar_operator!(Mul, mul, multiply_scalar);
scalar_operator!(Div, div, divide_scalar);
function_operator!(Add, add, add);
function_operator!(Sub, sub, subtract);
