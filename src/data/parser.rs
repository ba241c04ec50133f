//! Parser for the Tarkka price page
//!
//! The page does not serve JSON. The hourly bars are embedded in a flot
//! `$.plot(...)` call as a JavaScript object literal, one line like:
//!
//! ```text
//! { data: [[18,4.63]], highlightColor: '#529900', bars: { show: true, ... } }, { data: ... } ], options);
//! ```
//!
//! That line is rewritten into JSON by a fixed series of textual steps and
//! then decoded. Each step is a separate function so it can be tested alone.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Prefix of the line carrying the bar series
const SERIES_PREFIX: &str = "{ data:";

/// Errors that can occur when extracting prices from a response body
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The response body was empty
    #[error("No data received")]
    EmptyResponse,

    /// The series line could not be turned into prices
    #[error("Parse failure: {0}")]
    Failure(String),
}

/// One bar of the chart; only its data points are of interest
#[derive(Debug, Deserialize)]
struct Bar {
    /// `[hour, price]` pairs; only the price of the first one is read
    data: Vec<Vec<Value>>,
}

/// Extracts the hourly prices from a Tarkka page body
///
/// # Arguments
/// * `body` - The complete response body
///
/// # Returns
/// * `Ok(Vec<f64>)` - One price per bar, in page order. Empty if the body has
///   no series line at all.
/// * `Err(ParseError::EmptyResponse)` - If the body is empty
/// * `Err(ParseError::Failure)` - If the series line cannot be decoded
pub fn extract_prices(body: &str) -> Result<Vec<f64>, ParseError> {
    if body.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    match find_series_line(body) {
        Some(line) => parse_series_line(line),
        None => Ok(Vec::new()),
    }
}

/// Returns the first trimmed line starting with `{ data:`
fn find_series_line(body: &str) -> Option<&str> {
    body.split(['\r', '\n'])
        .map(str::trim)
        .find(|line| line.starts_with(SERIES_PREFIX))
}

/// Rewrites a series line into JSON and reads `data[0][1]` of every bar
fn parse_series_line(line: &str) -> Result<Vec<f64>, ParseError> {
    let json = to_json(line);

    let bars: Vec<Bar> =
        serde_json::from_str(&json).map_err(|e| ParseError::Failure(e.to_string()))?;

    bars.iter()
        .enumerate()
        .map(|(index, bar)| {
            bar.data
                .first()
                .and_then(|point| point.get(1))
                .and_then(Value::as_f64)
                .ok_or_else(|| {
                    ParseError::Failure(format!("bar {} has no numeric price", index))
                })
        })
        .collect()
}

/// Applies the literal-to-JSON rewrite steps in order
pub fn to_json(line: &str) -> String {
    let line = prepend_open_bracket(line);
    let line = strip_plot_options(&line);
    let line = close_open_brackets(&line);
    let line = quote_bare_keys(&line);
    normalize_quotes(&line)
}

/// The array's opening `[` sits on the previous line of the page
pub fn prepend_open_bracket(line: &str) -> String {
    format!("[{}", line)
}

/// Removes the first `, options);` (any whitespace before the `)`)
pub fn strip_plot_options(line: &str) -> String {
    const MARKER: &str = ", options";

    let mut from = 0;
    while let Some(offset) = line[from..].find(MARKER) {
        let start = from + offset;
        let after_marker = &line[start + MARKER.len()..];
        let rest = after_marker.trim_start();

        if let Some(tail) = rest.strip_prefix(");") {
            let end = line.len() - tail.len();
            return format!("{}{}", &line[..start], &line[end..]);
        }
        from = start + MARKER.len();
    }

    line.to_string()
}

/// Appends a `]` for every `[` that is never closed
pub fn close_open_brackets(line: &str) -> String {
    let mut depth: usize = 0;
    for c in line.chars() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    let mut closed = String::with_capacity(line.len() + depth);
    closed.push_str(line);
    closed.extend(std::iter::repeat(']').take(depth));
    closed
}

/// Wraps every bare alphanumeric object key in double quotes
///
/// A key is a maximal run of ASCII letters and digits immediately followed
/// by `:`. Runs inside string values are rewritten too.
pub fn quote_bare_keys(line: &str) -> String {
    let mut quoted = String::with_capacity(line.len() + 16);
    let mut run = String::new();

    for c in line.chars() {
        if c.is_ascii_alphanumeric() {
            run.push(c);
            continue;
        }

        if c == ':' && !run.is_empty() {
            quoted.push('"');
            quoted.push_str(&run);
            quoted.push('"');
        } else {
            quoted.push_str(&run);
        }
        run.clear();
        quoted.push(c);
    }
    quoted.push_str(&run);

    quoted
}

/// Converts single quotes to double quotes
pub fn normalize_quotes(line: &str) -> String {
    line.replace('\'', "\"")
}
