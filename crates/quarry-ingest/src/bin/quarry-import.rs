// Copyright 2025 Quarry Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;
use quarry_ingest::config::{load_config, IngestConfig, MergeOpts};
use quarry_ingest::import::{import_from_url, Catalog, ImportOptions, SourceMeta};
use quarry_ingest::parse::GrammarRegistry;
use quarry_ingest::store::MemShardStore;

#[derive(Parser, Debug)]
#[command(
    name = "quarry-import",
    about = "Import a source tarball into in-memory shards (demo)"
)]
struct Args {
    /// Tarball URL (tar or tar.gz)
    url: String,
    /// Dataset identifier
    #[arg(long, default_value = "default")]
    dataset: String,
    /// Only import entries under this prefix (stripped from stored paths)
    #[arg(long, default_value = "")]
    prefix: String,
    /// Optional TOML config file
    #[arg(long)]
    config: Option<std::path::PathBuf>,
    /// Override the configured shard count
    #[arg(long)]
    shards: Option<u32>,
    #[arg(long)]
    owner: Option<String>,
    #[arg(long)]
    repo: Option<String>,
    #[arg(long)]
    branch: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let cfg = load_config(
        IngestConfig::default(),
        MergeOpts {
            config_path: args.config.clone(),
            cli_shard_count: args.shards,
            ..MergeOpts::default()
        },
    )?;

    let grammars = GrammarRegistry::with_languages(cfg.languages.iter().map(String::as_str));
    let mut stores: Vec<MemShardStore> = (0..cfg.shard_count)
        .map(|_| MemShardStore::default())
        .collect();
    let mut catalog = Catalog::new();
    let meta = SourceMeta {
        owner: args.owner,
        repo: args.repo,
        branch: args.branch,
        imported_at: chrono::Utc::now(),
    };
    let opts = ImportOptions::builder()
        .dataset(&args.dataset)
        .path_prefix(&args.prefix)
        .meta(meta)
        .shard_count(cfg.shard_count)
        .max_file_size(cfg.max_file_size)
        .fetch_timeout(cfg.fetch_timeout)
        .build();

    let summary = import_from_url(&args.url, &opts, &mut catalog, &mut stores, &grammars)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "files_imported": summary.files_imported,
            "total_size_bytes": summary.total_size_bytes,
            "shard_write_counts": stores.iter().map(|s| s.writes.len()).collect::<Vec<_>>(),
        }))?
    );
    Ok(())
}
