//! JSON output for command results.

use anyhow::Result;
use serde::Serialize;

/// Print `data` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> Result<()> {
    println!("{}", to_pretty(data)?);
    Ok(())
}

fn to_pretty<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        id: &'static str,
        risk: f64,
    }

    #[test]
    fn test_pretty_output_is_indented() {
        let text = to_pretty(&Sample { id: "a", risk: 0.5 }).unwrap();
        assert!(text.contains("\n  \"id\": \"a\""));
        assert!(text.contains("\"risk\": 0.5"));
    }

    #[test]
    fn test_slices_serialize_as_arrays() {
        let text = to_pretty(&[1, 2][..]).unwrap();
        assert!(text.starts_with('['));
    }
}
