//! Shared helpers for command handlers.

use std::collections::HashMap;
use std::io::IsTerminal;

use uptime_core::TimeRange;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Refuses instead of blocking when stdin is not a terminal.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Parse `--hours` into one of the supported analytics windows.
pub fn time_range(hours: u32) -> Result<TimeRange, CliError> {
    TimeRange::from_hours(hours).ok_or_else(|| CliError::Validation {
        field: "hours".into(),
        reason: format!("expected one of 1, 6, 24, 168, 720, got {hours}"),
    })
}

/// Parse repeated `NAME=VALUE` header flags. `None` when none were given.
pub fn parse_headers(raw: &[String]) -> Result<Option<HashMap<String, String>>, CliError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.iter()
        .map(|pair| {
            let (name, value) = pair.split_once('=').ok_or_else(|| CliError::Validation {
                field: "header".into(),
                reason: format!("expected NAME=VALUE, got '{pair}'"),
            })?;
            Ok((name.trim().to_owned(), value.trim().to_owned()))
        })
        .collect::<Result<HashMap<_, _>, _>>()
        .map(Some)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn headers_split_on_first_equals() {
        let parsed = parse_headers(&["Authorization=Bearer a=b".into(), " X-Env = prod".into()])
            .unwrap()
            .unwrap();
        assert_eq!(parsed["Authorization"], "Bearer a=b");
        assert_eq!(parsed["X-Env"], "prod");
        assert!(parse_headers(&[]).unwrap().is_none());
        assert!(parse_headers(&["novalue".into()]).is_err());
    }

    #[test]
    fn only_supported_windows_parse() {
        assert_eq!(time_range(168).unwrap(), TimeRange::SevenDays);
        assert!(time_range(48).is_err());
    }
}
