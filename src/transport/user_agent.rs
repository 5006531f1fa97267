use rand::seq::SliceRandom;

/// Desktop user agents rotated across direct and proxied attempts
const DESKTOP_UAS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36",
];

/// Mobile user agents used with the mobile-host transport
const MOBILE_UAS: &[&str] = &[
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Mobile Safari/537.36",
];

/// Picks a random desktop user agent
pub fn random_desktop_ua() -> &'static str {
    DESKTOP_UAS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(DESKTOP_UAS[0])
}

/// Picks a random mobile user agent
pub fn random_mobile_ua() -> &'static str {
    MOBILE_UAS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(MOBILE_UAS[0])
}
