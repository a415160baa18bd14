use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps passenger contact data so `tracing` fields and `{:?}` never print it in full.
/// Only the last two characters survive, enough to tell recipients apart in logs.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct Masked<T>(pub T);

impl<T: fmt::Display> Masked<T> {
    fn masked(&self) -> String {
        let raw = self.0.to_string();
        let chars: Vec<char> = raw.chars().collect();
        if chars.len() <= 2 {
            return "**".to_string();
        }
        let tail: String = chars[chars.len() - 2..].iter().collect();
        format!("******{}", tail)
    }
}

impl<T: fmt::Display> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl<T: fmt::Display> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // API responses carry the real value; only log output is masked
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_is_masked_in_logs() {
        let phone = Masked("+96555512345".to_string());
        assert_eq!(format!("{}", phone), "******45");
        assert_eq!(format!("{:?}", phone), "******45");
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"+96555512345\"");
    }

    #[test]
    fn test_short_values_fully_hidden() {
        assert_eq!(Masked("7").to_string(), "**");
    }
}
