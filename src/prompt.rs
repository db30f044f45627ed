//! Line-oriented terminal prompts.

use std::io::{self, BufRead, Write};

use parishat_client::util::validate;

/// Print `label` and read one trimmed line from stdin.
pub fn line(label: &str) -> io::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim().to_owned())
}

/// Like [`line`], showing `current` and keeping it when the answer is blank.
pub fn line_or(label: &str, current: &str) -> io::Result<String> {
    let answer = if current.is_empty() { line(label)? } else { line(&format!("{label} [{current}]"))? };
    Ok(if answer.is_empty() { current.to_owned() } else { answer })
}

/// Read a PIN, dropping anything that is not a digit past the fourth.
pub fn pin(label: &str) -> io::Result<String> {
    Ok(validate::sanitize_pin_input(&line(label)?))
}

pub fn confirm(label: &str) -> io::Result<bool> {
    let answer = line(&format!("{label} [y/N]"))?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}
