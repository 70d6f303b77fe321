//! Browser header presets for HTTP requests.
//!
//! Header names are written the way Chrome sends them over HTTP/1.1; hyper
//! lowercases them on HTTP/2 as browsers do.

/// Chrome 131 headers for a top-level page navigation.
pub fn chrome_131_navigation_headers(user_agent: &str) -> Vec<(String, String)> {
    headers_to_owned(vec![
        ("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7"),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Accept-Encoding", "gzip, deflate, br, zstd"),
        ("User-Agent", user_agent),
        ("Sec-Ch-Ua", r#""Google Chrome";v="131", "Chromium";v="131", "Not_A Brand";v="24""#),
        ("Sec-Ch-Ua-Mobile", "?0"),
        ("Sec-Ch-Ua-Platform", r#""macOS""#),
        ("Sec-Fetch-Dest", "document"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "none"),
        ("Sec-Fetch-User", "?1"),
        ("Upgrade-Insecure-Requests", "1"),
    ])
}

/// Chrome 131 headers for a cross-site `<script>` load.
pub fn chrome_131_script_headers(user_agent: &str, referer: &str) -> Vec<(String, String)> {
    headers_to_owned(vec![
        ("Accept", "*/*"),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Accept-Encoding", "gzip, deflate, br, zstd"),
        ("User-Agent", user_agent),
        ("Referer", referer),
        ("Sec-Ch-Ua", r#""Google Chrome";v="131", "Chromium";v="131", "Not_A Brand";v="24""#),
        ("Sec-Ch-Ua-Mobile", "?0"),
        ("Sec-Ch-Ua-Platform", r#""macOS""#),
        ("Sec-Fetch-Dest", "script"),
        ("Sec-Fetch-Mode", "no-cors"),
        ("Sec-Fetch-Site", "cross-site"),
    ])
}

/// Convert borrowed headers to owned.
pub fn headers_to_owned(headers: Vec<(&str, &str)>) -> Vec<(String, String)> {
    headers.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
