// Structural verification of tabulated grids

use crate::error::{DryadError, Result};
use crate::interpolation::InterpolationType;

/// Verify the grid, value count and region data of a tabulated function.
///
/// The grid must hold at least two finite, non-decreasing values. An
/// immediate duplicate pair marks a jump; jumps cannot sit at the first or
/// last index and a value may not be repeated three times. Every region needs
/// one interpolation law, the boundaries must be strictly increasing, the last
/// one must point at the last grid index and none may point at the first
/// element of a jump pair.
pub fn verify_grid(
    grid: &[f64],
    number_values: usize,
    boundaries: &[usize],
    interpolants: &[InterpolationType],
) -> Result<()> {
    verify_points(grid)?;

    if grid.len() != number_values {
        return Err(DryadError::InvalidGrid(format!(
            "the number of x values ({}) and y values ({}) differ",
            grid.len(),
            number_values
        )));
    }

    verify_regions(grid, boundaries, interpolants)
}

/// Verify the ordering and jump rules of a grid on its own.
pub fn verify_points(grid: &[f64]) -> Result<()> {
    if grid.len() < 2 {
        return Err(DryadError::InvalidGrid(format!(
            "at least 2 grid points are required, found {}",
            grid.len()
        )));
    }

    if let Some(index) = grid.iter().position(|value| !value.is_finite()) {
        return Err(DryadError::InvalidGrid(format!(
            "the grid value at index {} is not finite ({})",
            index, grid[index]
        )));
    }

    if let Some(index) = grid.windows(2).position(|pair| pair[1] < pair[0]) {
        return Err(DryadError::InvalidGrid(format!(
            "the grid is not sorted: x[{}] = {} > x[{}] = {}",
            index,
            grid[index],
            index + 1,
            grid[index + 1]
        )));
    }

    if let Some(index) = grid
        .windows(3)
        .position(|triple| triple[0] == triple[1] && triple[1] == triple[2])
    {
        return Err(DryadError::InvalidGrid(format!(
            "the grid value {} is repeated more than twice starting at index {}",
            grid[index], index
        )));
    }

    let last = grid.len() - 1;
    if grid[0] == grid[1] {
        return Err(DryadError::InvalidGrid(format!(
            "a jump cannot occur at the first grid point (x = {})",
            grid[0]
        )));
    }
    if grid[last] == grid[last - 1] {
        return Err(DryadError::InvalidGrid(format!(
            "a jump cannot occur at the last grid point (x = {})",
            grid[last]
        )));
    }

    Ok(())
}

/// Verify the boundary and interpolant lists against a valid grid.
pub fn verify_regions(
    grid: &[f64],
    boundaries: &[usize],
    interpolants: &[InterpolationType],
) -> Result<()> {
    if boundaries.is_empty() {
        return Err(DryadError::InvalidGrid(
            "at least one interpolation region is required".to_string(),
        ));
    }

    if boundaries.len() != interpolants.len() {
        return Err(DryadError::InvalidGrid(format!(
            "the number of boundaries ({}) and interpolants ({}) differ",
            boundaries.len(),
            interpolants.len()
        )));
    }

    if let Some(index) = boundaries.windows(2).position(|pair| pair[1] <= pair[0]) {
        return Err(DryadError::InvalidGrid(format!(
            "the boundaries are not strictly increasing at region {}",
            index + 1
        )));
    }

    let last = grid.len() - 1;
    let last_boundary = boundaries[boundaries.len() - 1];
    if last_boundary != last {
        return Err(DryadError::InvalidGrid(format!(
            "the last boundary ({}) does not point to the last grid point ({})",
            last_boundary, last
        )));
    }

    if boundaries[0] == 0 {
        return Err(DryadError::InvalidGrid(
            "the first region contains no interval".to_string(),
        ));
    }

    for &boundary in boundaries {
        if boundary < last && grid[boundary] == grid[boundary + 1] {
            return Err(DryadError::InvalidGrid(format!(
                "boundary {} points to the first x value of the jump at x = {}",
                boundary, grid[boundary]
            )));
        }
    }

    Ok(())
}

/// Indices of the second element of every jump pair in a grid.
pub fn jump_indices(grid: &[f64]) -> Vec<usize> {
    grid.windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0] == pair[1])
        .map(|(index, _)| index + 1)
        .collect()
}
