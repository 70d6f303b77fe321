//! HTTP/2 fingerprint configuration (SETTINGS and connection window).

/// HTTP/2 SETTINGS for fingerprinting.
///
/// `None` leaves a setting out of the SETTINGS frame entirely. hyper always
/// sends `ENABLE_PUSH = 0`, so `enable_push` only feeds the Akamai string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Http2Settings {
    pub header_table_size: u32,
    pub enable_push: bool,
    pub max_concurrent_streams: Option<u32>,
    pub initial_window_size: u32,
    pub max_frame_size: Option<u32>,
    pub max_header_list_size: u32,
    /// Connection-level window, i.e. 65535 plus the first WINDOW_UPDATE increment.
    pub initial_connection_window_size: u32,
}

impl Default for Http2Settings {
    fn default() -> Self {
        // Chrome defaults
        Self {
            header_table_size: 65536,
            enable_push: false,
            max_concurrent_streams: None,
            initial_window_size: 6291456,
            max_frame_size: None,
            max_header_list_size: 262144,
            initial_connection_window_size: 15663105 + 65535,
        }
    }
}

impl Http2Settings {
    /// Akamai-style SETTINGS fingerprint string in wire order, e.g.
    /// `1:65536;2:0;4:6291456;6:262144`.
    pub fn akamai_settings(&self) -> String {
        [
            (1, Some(self.header_table_size)),
            (2, Some(u32::from(self.enable_push))),
            (3, self.max_concurrent_streams),
            (4, Some(self.initial_window_size)),
            (5, self.max_frame_size),
            (6, Some(self.max_header_list_size)),
        ]
        .into_iter()
        .filter_map(|(id, value)| value.map(|v| format!("{}:{}", id, v)))
        .collect::<Vec<_>>()
        .join(";")
    }
}
