//! Version reporting.

/// The client version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `ragchat <version>`, plus the backend version when known.
pub fn version_line(backend: Option<&str>) -> String {
    match backend {
        Some(backend) => format!("ragchat {} (backend {})", VERSION, backend),
        None => format!("ragchat {}", VERSION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_format() {
        let parts: Vec<&str> = VERSION.split('.').collect();
        assert!(parts.len() >= 2, "Version should have at least major.minor");
    }

    #[test]
    fn test_version_line() {
        assert_eq!(version_line(None), format!("ragchat {}", VERSION));
        assert!(version_line(Some("0.0.113")).ends_with("(backend 0.0.113)"));
    }
}
