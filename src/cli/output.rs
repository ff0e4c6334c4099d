//! Output formatting for CLI commands

use serde::Serialize;

/// Format output as pretty or compact JSON
pub fn format_output<T: Serialize>(data: &T, pretty: bool) -> String {
    let result = if pretty {
        serde_json::to_string_pretty(data)
    } else {
        serde_json::to_string(data)
    };
    result.unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_format_config() {
        let config = EngineConfig::default();
        let compact = format_output(&config, false);
        assert!(!compact.contains('\n'));
        assert!(compact.contains("\"max_live\":5"));

        let pretty = format_output(&config, true);
        let parsed: EngineConfig = serde_json::from_str(&pretty).unwrap();
        assert_eq!(parsed, config);
    }
}
