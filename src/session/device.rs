/// Human-readable device labels derived from User-Agent strings
///
/// Simple substring matching rather than a full UA parser; the label is
/// only shown in the "your active sessions" view. Parser misses degrade to
/// the unknown defaults, never to an error.

/// Describe a user agent as `"<Browser> on <OS> (<device>)"`.
///
/// Returns the literal `"unknown"` when no user agent was captured.
pub fn describe(user_agent: Option<&str>) -> String {
    let ua = match user_agent {
        Some(ua) if !ua.trim().is_empty() => ua,
        _ => return "unknown".to_string(),
    };

    format!("{} on {} ({})", browser(ua), os(ua), device(ua))
}

fn browser(ua: &str) -> &'static str {
    // Order matters: Edge and Chrome UAs both contain "Safari"
    if ua.contains("Edg/") {
        "Edge"
    } else if ua.contains("Firefox") {
        "Firefox"
    } else if ua.contains("Chrome") {
        "Chrome"
    } else if ua.contains("Safari") {
        "Safari"
    } else if ua.contains("curl") {
        "curl"
    } else {
        "Unknown Browser"
    }
}

fn os(ua: &str) -> &'static str {
    // iOS before macOS: iOS user agents contain "Mac OS X"
    if ua.contains("iPhone") || ua.contains("iPad") {
        "iOS"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("Mac OS X") || ua.contains("macOS") {
        "macOS"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        "Unknown OS"
    }
}

fn device(ua: &str) -> &'static str {
    if ua.contains("iPad") || ua.contains("Tablet") {
        "tablet"
    } else if ua.contains("Mobile") || ua.contains("iPhone") {
        "mobile"
    } else {
        "desktop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_empty_agent_is_unknown() {
        assert_eq!(describe(None), "unknown");
        assert_eq!(describe(Some("")), "unknown");
        assert_eq!(describe(Some("   ")), "unknown");
    }

    #[test]
    fn desktop_chrome_on_macos() {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                  (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        assert_eq!(describe(Some(ua)), "Chrome on macOS (desktop)");
    }

    #[test]
    fn firefox_on_windows() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0";
        assert_eq!(describe(Some(ua)), "Firefox on Windows (desktop)");
    }

    #[test]
    fn edge_is_not_reported_as_chrome() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                  (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
        assert_eq!(describe(Some(ua)), "Edge on Windows (desktop)");
    }

    #[test]
    fn iphone_safari_is_mobile_ios() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
                  (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
        assert_eq!(describe(Some(ua)), "Safari on iOS (mobile)");
    }

    #[test]
    fn recognizable_browser_with_unknown_os_keeps_defaults() {
        assert_eq!(
            describe(Some("Chrome/120.0")),
            "Chrome on Unknown OS (desktop)"
        );
    }

    #[test]
    fn garbage_degrades_to_all_defaults() {
        assert_eq!(
            describe(Some("definitely-not-a-browser")),
            "Unknown Browser on Unknown OS (desktop)"
        );
    }
}
