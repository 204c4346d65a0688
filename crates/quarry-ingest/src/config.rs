use anyhow::Result;
use std::fs;
use std::time::Duration;

/// Runtime configuration for the ingestion service.
#[derive(Clone, Debug, PartialEq)]
pub struct IngestConfig {
    pub shard_count: u32,
    pub max_file_size: usize,
    pub fetch_timeout: Duration,
    /// Language names the grammar registry is built from.
    pub languages: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            shard_count: 8,
            max_file_size: 1_000_000,
            fetch_timeout: Duration::from_secs(30),
            languages: crate::parse::GrammarRegistry::builtin_languages()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// CLI-level options that binaries pass to `load_config`.
/// Keep this small and explicit; binaries can expand for extra fields.
#[derive(Clone, Debug, Default)]
pub struct MergeOpts {
    pub config_path: Option<std::path::PathBuf>,
    pub cli_shard_count: Option<u32>,
    pub cli_max_file_size: Option<usize>,
    pub cli_fetch_timeout_seconds: Option<u64>,
}

/// Load and merge IngestConfig from: defaults <- config file <- env vars <- CLI
pub fn load_config(mut base: IngestConfig, opts: MergeOpts) -> Result<IngestConfig> {
    if let Some(path) = opts.config_path.as_ref() {
        if path.exists() {
            let s = fs::read_to_string(path)?;
            let v: toml::Value = toml::from_str(&s)?;
            if let Some(n) = v.get("shard_count").and_then(|x| x.as_integer()) {
                base.shard_count = n as u32;
            }
            if let Some(n) = v.get("max_file_size").and_then(|x| x.as_integer()) {
                base.max_file_size = n as usize;
            }
            if let Some(n) = v.get("fetch_timeout_seconds").and_then(|x| x.as_integer()) {
                base.fetch_timeout = Duration::from_secs(n as u64);
            }
            if let Some(ls) = v.get("languages").and_then(|x| x.as_array()) {
                base.languages = ls
                    .iter()
                    .filter_map(|x| x.as_str().map(str::to_string))
                    .collect();
            }
        }
    }

    // env vars override file
    if let Ok(n) = std::env::var("QUARRY_SHARD_COUNT") {
        if let Ok(v) = n.parse::<u32>() {
            base.shard_count = v;
        }
    }
    if let Ok(n) = std::env::var("QUARRY_MAX_FILE_SIZE") {
        if let Ok(v) = n.parse::<usize>() {
            base.max_file_size = v;
        }
    }
    if let Ok(n) = std::env::var("QUARRY_FETCH_TIMEOUT_SECONDS") {
        if let Ok(v) = n.parse::<u64>() {
            base.fetch_timeout = Duration::from_secs(v);
        }
    }
    if let Ok(ls) = std::env::var("QUARRY_LANGUAGES") {
        let parsed: Vec<String> = ls
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if !parsed.is_empty() {
            base.languages = parsed;
        }
    }

    // CLI overrides everything
    if let Some(n) = opts.cli_shard_count {
        base.shard_count = n;
    }
    if let Some(n) = opts.cli_max_file_size {
        base.max_file_size = n;
    }
    if let Some(n) = opts.cli_fetch_timeout_seconds {
        base.fetch_timeout = Duration::from_secs(n);
    }

    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    fn init_test_logging() {
        static INIT: std::sync::Once = std::sync::Once::new();
        INIT.call_once(|| {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            tracing_subscriber::fmt().with_env_filter(filter).init();
        });
    }

    fn clear_env() {
        std::env::remove_var("QUARRY_SHARD_COUNT");
        std::env::remove_var("QUARRY_MAX_FILE_SIZE");
        std::env::remove_var("QUARRY_FETCH_TIMEOUT_SECONDS");
        std::env::remove_var("QUARRY_LANGUAGES");
    }

    #[test]
    #[serial_test::serial]
    fn file_env_cli_precedence() {
        init_test_logging();
        clear_env();

        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        let toml = r#"
shard_count = 4
max_file_size = 2048
fetch_timeout_seconds = 5
"#;
        fs::write(tmp.path(), toml).unwrap();

        std::env::set_var("QUARRY_SHARD_COUNT", "6");

        let opts = MergeOpts {
            config_path: Some(tmp.path().to_path_buf()),
            cli_shard_count: Some(12),
            cli_max_file_size: None,
            cli_fetch_timeout_seconds: None,
        };
        let got = load_config(IngestConfig::default(), opts).expect("load");
        // CLI beats env beats file; untouched fields fall through to file.
        assert_eq!(got.shard_count, 12);
        assert_eq!(got.max_file_size, 2048);
        assert_eq!(got.fetch_timeout.as_secs(), 5);

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn env_overrides_file() {
        init_test_logging();
        clear_env();

        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        fs::write(tmp.path(), "shard_count = 3\n").unwrap();
        std::env::set_var("QUARRY_SHARD_COUNT", "5");

        let opts = MergeOpts {
            config_path: Some(tmp.path().to_path_buf()),
            ..MergeOpts::default()
        };
        let got = load_config(IngestConfig::default(), opts).expect("load");
        assert_eq!(got.shard_count, 5);

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn invalid_env_is_ignored() {
        init_test_logging();
        clear_env();

        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        fs::write(tmp.path(), "shard_count = 7\nmax_file_size = 512\n").unwrap();
        std::env::set_var("QUARRY_SHARD_COUNT", "not-a-number");
        std::env::set_var("QUARRY_MAX_FILE_SIZE", "also-bad");

        let opts = MergeOpts {
            config_path: Some(tmp.path().to_path_buf()),
            ..MergeOpts::default()
        };
        let got = load_config(IngestConfig::default(), opts).expect("load");
        // invalid env should be ignored => values from file
        assert_eq!(got.shard_count, 7);
        assert_eq!(got.max_file_size, 512);

        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn languages_from_file_and_env() {
        init_test_logging();
        clear_env();

        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        fs::write(tmp.path(), "languages = [\"rust\", \"go\"]\n").unwrap();

        let opts = MergeOpts {
            config_path: Some(tmp.path().to_path_buf()),
            ..MergeOpts::default()
        };
        let got = load_config(IngestConfig::default(), opts.clone()).expect("load");
        assert_eq!(got.languages, vec!["rust", "go"]);

        std::env::set_var("QUARRY_LANGUAGES", "python, typescript");
        let got = load_config(IngestConfig::default(), opts).expect("load");
        assert_eq!(got.languages, vec!["python", "typescript"]);

        clear_env();
    }

    #[test]
    fn defaults_cover_every_builtin_language() {
        let cfg = IngestConfig::default();
        assert!(cfg.languages.iter().any(|l| l == "rust"));
        assert!(cfg.languages.iter().any(|l| l == "typescript"));
        assert_eq!(cfg.shard_count, 8);
    }
}
