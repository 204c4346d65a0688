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

#[derive(Parser, Debug)]
#[command(
    name = "quarry-token",
    about = "Mint a signed org-scoped bearer token for import/query calls"
)]
struct Args {
    /// Organization identifier to bind into the token
    #[arg(long)]
    org: String,
    /// Path to the signing key file (falls back to QUARRY_TOKEN_KEY)
    #[arg(long)]
    key_file: Option<std::path::PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let key = match args.key_file {
        Some(p) => std::fs::read(p)?,
        None => std::env::var("QUARRY_TOKEN_KEY")
            .map(String::into_bytes)
            .map_err(|_| anyhow::anyhow!("provide --key-file or set QUARRY_TOKEN_KEY"))?,
    };
    println!("{}", quarry_ingest::auth::mint_token(&args.org, &key));
    Ok(())
}
