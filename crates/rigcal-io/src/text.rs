use std::{path::Path, str::FromStr};

use crate::RigIoError;

/// Read a whole text file, tagging errors with the path.
pub(crate) fn read_to_string(path: &Path) -> Result<String, RigIoError> {
    std::fs::read_to_string(path).map_err(|e| RigIoError::io(path, e))
}

/// Write a whole text file, tagging errors with the path.
pub(crate) fn write_string(path: &Path, contents: &str) -> Result<(), RigIoError> {
    std::fs::write(path, contents).map_err(|e| RigIoError::io(path, e))
}

/// Parse all whitespace separated values of a line.
pub(crate) fn parse_values<T: FromStr>(
    text: &str,
    path: &Path,
    line: usize,
) -> Result<Vec<T>, RigIoError>
where
    T::Err: std::fmt::Display,
{
    text.split_whitespace()
        .map(|s| {
            s.parse::<T>()
                .map_err(|e| RigIoError::parse(path, line, format!("{}: {}", s, e)))
        })
        .collect()
}

/// Parse exactly `N` whitespace separated values of a line.
pub(crate) fn parse_array<T: FromStr, const N: usize>(
    text: &str,
    path: &Path,
    line: usize,
) -> Result<[T; N], RigIoError>
where
    T::Err: std::fmt::Display,
{
    let values = parse_values::<T>(text, path, line)?;
    let found = values.len();
    values.try_into().map_err(|_| {
        RigIoError::parse(path, line, format!("expected {} values, found {}", N, found))
    })
}

/// Numbered non-empty lines of a text, one-based.
pub(crate) fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Format a row of values separated by spaces.
pub(crate) fn format_row(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
