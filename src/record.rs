//! Text form of a single exchange: `[<device>:] <f0> <f1> <f2> <f3> <f4>`.
//!
//! Fields may be separated by whitespace, commas, or both. Field count is
//! left to the estimator so that short and long records surface as
//! [`InvalidInputError`](crate::error::InvalidInputError).

use crate::error::RecordError;

#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRecord {
    pub device_id: u32,
    pub timestamps: Vec<f64>,
}

/// Parses one line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ExchangeRecord>, RecordError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (device_id, body) = match line.split_once(':') {
        Some((dev, rest)) => {
            let dev = dev.trim();
            let id = dev
                .parse::<u32>()
                .map_err(|_| RecordError::BadDevice(dev.to_string()))?;
            (id, rest)
        }
        None => (0, line),
    };

    let timestamps = body
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|tok| !tok.is_empty())
        .enumerate()
        .map(|(index, tok)| match tok.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(RecordError::BadField {
                index,
                raw: tok.to_string(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if timestamps.is_empty() {
        return Err(RecordError::Empty);
    }

    Ok(Some(ExchangeRecord {
        device_id,
        timestamps,
    }))
}
