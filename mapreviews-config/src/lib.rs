//! Loader for harvester configuration with YAML/JSON + environment overlays.
//!
//! A config file lists the businesses to visit and optionally tunes the
//! harvest, browser, output, schedule, and logging sections. Every section
//! except `businesses` has defaults. Environment variables prefixed with
//! `MAPREVIEWS__` override file values (`MAPREVIEWS__HARVEST__TARGET_COUNT=50`),
//! and `${VAR}` placeholders inside string values are expanded last.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const MAXIMUM_INTERVAL_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct MapReviewsConfig {
    pub businesses: Vec<BusinessSpec>,
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One business to scrape. Either `url` or `name` + `address` must lead somewhere.
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessSpec {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl BusinessSpec {
    /// The direct listing URL, ignoring blank values.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Free-text query used when no direct URL is configured.
    pub fn search_query(&self) -> Option<String> {
        let name = self.name.trim();
        let address = self.address.trim();
        if name.is_empty() || address.is_empty() {
            return None;
        }
        Some(format!("{name} {address}"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub target_count: usize,
    pub max_stall_attempts: u32,
    pub scroll_settle_ms: u64,
    pub container_timeout_ms: u64,
    pub control_timeout_ms: u64,
    pub reviews_control_label: String,
    pub open_reviews_settle_ms: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            target_count: 200,
            max_stall_attempts: 80,
            scroll_settle_ms: 2_000,
            container_timeout_ms: 30_000,
            control_timeout_ms: 30_000,
            reviews_control_label: "Reviews".into(),
            open_reviews_settle_ms: 5_000,
        }
    }
}

impl HarvestConfig {
    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }
    pub fn container_timeout(&self) -> Duration {
        Duration::from_millis(self.container_timeout_ms)
    }
    pub fn control_timeout(&self) -> Duration {
        Duration::from_millis(self.control_timeout_ms)
    }
    pub fn open_reviews_settle(&self) -> Duration {
        Duration::from_millis(self.open_reviews_settle_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub navigation_timeout_ms: u64,
    pub search_settle_ms: u64,
    pub warmup_min_ms: u64,
    pub warmup_max_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: true,
            navigation_timeout_ms: 60_000,
            search_settle_ms: 5_000,
            warmup_min_ms: 1_000,
            warmup_max_ms: 2_000,
        }
    }
}

impl BrowserConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
    pub fn search_settle(&self) -> Duration {
        Duration::from_millis(self.search_settle_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub diagnostics_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            diagnostics_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_hours: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { interval_hours: 12 }
    }
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_hours.saturating_mul(60 * 60))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
    pub format: String,
    pub stderr: bool,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            format: "text".into(),
            stderr: true,
            filter: "info".into(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

fn validate(cfg: &MapReviewsConfig) -> Result<(), ConfigError> {
    let fail = |msg: &str| Err(ConfigError::Message(msg.to_string()));
    if cfg.harvest.target_count == 0 {
        return fail("harvest.target_count must be at least 1");
    }
    if cfg.harvest.max_stall_attempts == 0 {
        return fail("harvest.max_stall_attempts must be at least 1");
    }
    if cfg.schedule.interval_hours == 0 {
        return fail("schedule.interval_hours must be at least 1");
    }
    if cfg.schedule.interval_hours > MAXIMUM_INTERVAL_HOURS {
        return fail("schedule.interval_hours must not exceed one year (8760)");
    }
    if cfg.browser.warmup_min_ms > cfg.browser.warmup_max_ms {
        return fail("browser.warmup_min_ms must not exceed browser.warmup_max_ms");
    }
    Ok(())
}

/// Builder hides the `config` crate wiring (file + env overrides).
pub struct MapReviewsConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for MapReviewsConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MapReviewsConfigLoader {
    /// Start an empty builder. `MAPREVIEWS__` env overrides are applied in
    /// [`load`](Self::load), after every file and snippet, so they always win.
    ///
    /// ```
    /// use mapreviews_config::MapReviewsConfigLoader;
    ///
    /// let config = MapReviewsConfigLoader::new()
    ///     .with_yaml_str("businesses: []")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert!(config.businesses.is_empty());
    /// assert_eq!(config.harvest.target_count, 200);
    /// assert_eq!(config.harvest.max_stall_attempts, 80);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use mapreviews_config::MapReviewsConfigLoader;
    ///
    /// let cfg = MapReviewsConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// businesses:
    ///   - name: "Coffee Corner"
    ///     address: "Main St 1"
    /// harvest:
    ///   target_count: 25
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.businesses.len(), 1);
    /// assert_eq!(cfg.businesses[0].search_query().as_deref(), Some("Coffee Corner Main St 1"));
    /// assert_eq!(cfg.harvest.target_count, 25);
    /// assert_eq!(cfg.harvest.scroll_settle_ms, 2_000);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// `${VAR}` placeholders are expanded before the typed structs are built, and the
    /// result is validated.
    ///
    /// ```
    /// use mapreviews_config::MapReviewsConfigLoader;
    ///
    /// unsafe { std::env::set_var("SHOP_URL", "https://maps.example/place/1"); }
    ///
    /// let config = MapReviewsConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// businesses:
    ///   - name: "Shop"
    ///     address: "Somewhere"
    ///     url: "${SHOP_URL}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.businesses[0].url(), Some("https://maps.example/place/1"));
    ///
    /// unsafe { std::env::remove_var("SHOP_URL"); }
    /// ```
    pub fn load(self) -> Result<MapReviewsConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("MAPREVIEWS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: MapReviewsConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        validate(&typed)?;

        Ok(typed)
    }
}
