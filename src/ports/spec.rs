use std::collections::BTreeSet;

use anyhow::Result;

use crate::error::TopologyError;

pub const MIN_PORT: u16 = 1;
pub const MAX_PORT: u16 = 1024;

/// Parse a port-range specification into a sorted, deduplicated port list.
///
/// Grammar: comma-separated tokens; each token is a single port (`17`), an
/// inclusive range (`1-48`), or a strided range (`1-48:2`, keeping every
/// second port starting at 1). Ports live in `[1, 1024]`. Overlapping
/// ranges and repeated values collapse silently.
///
/// Parsing is pure: the same input always yields the same output.
pub fn parse_port_spec(spec: &str) -> Result<Vec<u16>> {
    let trimmed = spec.trim();
    if trimmed.is_empty() {
        return Err(err(spec, "empty specification").into());
    }

    let mut ports: BTreeSet<u16> = BTreeSet::new();
    for token in trimmed.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(err(spec, "empty token").into());
        }

        let (range, step) = match token.split_once(':') {
            Some((range, step_text)) => {
                let step: i64 = step_text
                    .trim()
                    .parse()
                    .map_err(|_| err(spec, format!("invalid step in '{}'", token)))?;
                if step <= 0 {
                    return Err(err(spec, format!("step must be positive in '{}'", token)).into());
                }
                if !range.contains('-') {
                    return Err(err(spec, format!("stride requires a range in '{}'", token)).into());
                }
                (range, step as usize)
            }
            None => (token, 1),
        };

        let (start, end) = match range.split_once('-') {
            Some((a, b)) => (parse_port(spec, token, a)?, parse_port(spec, token, b)?),
            None => {
                let p = parse_port(spec, token, range)?;
                (p, p)
            }
        };

        if start > end {
            return Err(err(spec, format!("reversed range {}-{}", start, end)).into());
        }

        for port in (start..=end).step_by(step) {
            ports.insert(port);
        }
    }

    Ok(ports.into_iter().collect())
}

fn parse_port(spec: &str, token: &str, text: &str) -> Result<u16, TopologyError> {
    let value: u32 = text
        .trim()
        .parse()
        .map_err(|_| err(spec, format!("invalid port token '{}'", token)))?;
    if value < MIN_PORT as u32 || value > MAX_PORT as u32 {
        return Err(err(
            spec,
            format!("port {} out of range [{}, {}]", value, MIN_PORT, MAX_PORT),
        ));
    }
    Ok(value as u16)
}

fn err(spec: &str, detail: impl Into<String>) -> TopologyError {
    TopologyError::specification(format!("'{}'", spec.trim()), detail)
}
