use std::collections::BTreeMap;

/// Gateway configuration - immutable after startup
///
/// # Environment variables
///
/// All settings can be overridden through environment variables (a `.env`
/// file is honored at startup):
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | HTTP_HOST | 0.0.0.0 | Listen address |
/// | HTTP_PORT | 3005 | HTTP service port |
/// | PRINTERS | printer_1=printer_1 | Comma list of name=cups-queue pairs |
/// | API_KEY | (unset) | X-API-Key secret; unset disables auth |
/// | MAX_UPLOAD_SIZE_MB | 20 | Request body cap in megabytes |
/// | MAX_WIDTH_DEFAULT | 576 | Default raster width in dots (80mm stock) |
/// | LOG_LEVEL | info | Tracing filter when RUST_LOG is unset |
/// | LOG_DIR | (unset) | Daily rolling log file directory |
///
/// # Example
///
/// ```ignore
/// PRINTERS="front=EPSON_TM_T20,kitchen=TM_L90" HTTP_PORT=3005 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address for the HTTP server
    pub host: String,
    /// HTTP service port
    pub http_port: u16,
    /// Logical printer name -> CUPS queue name
    pub printers: BTreeMap<String, String>,
    /// Shared secret for the X-API-Key header; None disables auth
    pub api_key: Option<String>,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
    /// Default raster width in dots when a print-image call omits max_width
    pub max_width_default: u32,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to the defaults above.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3005),
            printers: parse_printers(
                &std::env::var("PRINTERS").unwrap_or_else(|_| "printer_1=printer_1".into()),
            ),
            api_key: std::env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            max_upload_bytes: std::env::var("MAX_UPLOAD_SIZE_MB")
                .ok()
                .and_then(|m| m.parse::<usize>().ok())
                .unwrap_or(20)
                * 1024
                * 1024,
            max_width_default: std::env::var("MAX_WIDTH_DEFAULT")
                .ok()
                .and_then(|w| w.parse().ok())
                .unwrap_or(576),
        }
    }

    /// Build a config with an explicit printer map and API key
    ///
    /// Common in tests, where the environment should not leak in.
    pub fn with_overrides<I, K, V>(printers: I, api_key: Option<&str>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            host: "127.0.0.1".into(),
            http_port: 0,
            printers: printers
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            api_key: api_key.map(String::from),
            max_upload_bytes: 20 * 1024 * 1024,
            max_width_default: 576,
        }
    }

    /// CUPS queue for a configured printer name
    pub fn queue_for(&self, name: &str) -> Option<&str> {
        self.printers.get(name).map(String::as_str)
    }

    /// Configured printer names, sorted
    pub fn printer_names(&self) -> Vec<String> {
        self.printers.keys().cloned().collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Parse a `name=queue,name2=queue2` list; a bare `name` maps to itself
fn parse_printers(list: &str) -> BTreeMap<String, String> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((name, queue)) => (name.trim().to_string(), queue.trim().to_string()),
            None => (entry.to_string(), entry.to_string()),
        })
        .collect()
}
