//! Coarse device classification from the User-Agent string

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Device {
    Mobile,
    Tablet,
    Desktop,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Mobile => "Mobile",
            Device::Tablet => "Tablet",
            Device::Desktop => "Desktop",
        }
    }
}

/// Classify a user agent into one of three buckets.
///
/// Tablet patterns are checked before mobile patterns: an iPad user agent
/// can also contain "mobile", and must not end up in the Mobile bucket.
pub fn classify(user_agent: Option<&str>) -> Device {
    let ua = user_agent.unwrap_or("").to_ascii_lowercase();

    if ua.contains("tablet") || ua.contains("ipad") {
        Device::Tablet
    } else if ua.contains("mobile") || ua.contains("android") || ua.contains("iphone") {
        Device::Mobile
    } else {
        Device::Desktop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipad_is_tablet_not_mobile() {
        let ua = "Mozilla/5.0 (iPad; CPU OS 14_0 like Mac OS X)";
        assert_eq!(classify(Some(ua)), Device::Tablet);
    }

    #[test]
    fn android_is_mobile() {
        let ua = "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36";
        assert_eq!(classify(Some(ua)), Device::Mobile);
    }

    #[test]
    fn iphone_is_mobile() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X)";
        assert_eq!(classify(Some(ua)), Device::Mobile);
    }

    #[test]
    fn macintosh_is_desktop() {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)";
        assert_eq!(classify(Some(ua)), Device::Desktop);
    }

    #[test]
    fn android_tablet_is_tablet() {
        let ua = "Mozilla/5.0 (Linux; Android 12; SM-X200 Tablet)";
        assert_eq!(classify(Some(ua)), Device::Tablet);
    }

    #[test]
    fn missing_user_agent_is_desktop() {
        assert_eq!(classify(None), Device::Desktop);
        assert_eq!(classify(Some("")), Device::Desktop);
    }
}
