use crate::Result;

/// Parses user input into a port number in `1..=65535`.
pub fn parse_port(input: &str) -> Result<u16> {
    let trimmed = input.trim();
    let value = trimmed
        .parse::<u32>()
        .map_err(|_| crate::Error::InvalidPort(format!("'{trimmed}' is not a number")))?;

    match u16::try_from(value) {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(crate::Error::InvalidPort(format!("{value} is out of range"))),
    }
}

pub fn validate_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(crate::Error::Other("Count must be at least 1".to_string()));
    }
    Ok(())
}
