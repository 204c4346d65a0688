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

//! Bearer-token issuing for import/query authentication. The ingestion
//! core itself never inspects these tokens (auth is enforced upstream);
//! minting lives here so operators can issue credentials with the same
//! binary that runs imports.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Mint a long-lived bearer token binding `org` under `key`:
/// `base64(org) "." base64(hmac_sha256(key, org))`.
pub fn mint_token(org: &str, key: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(org.as_bytes());
    let signature = mac.finalize().into_bytes();
    format!(
        "{}.{}",
        base64::engine::general_purpose::STANDARD.encode(org.as_bytes()),
        base64::engine::general_purpose::STANDARD.encode(signature),
    )
}

/// Verify a token minted by [`mint_token`] and return the bound org id.
pub fn verify_token(token: &str, key: &[u8]) -> Option<String> {
    let (org_b64, sig_b64) = token.split_once('.')?;
    let org = base64::engine::general_purpose::STANDARD
        .decode(org_b64)
        .ok()?;
    let sig = base64::engine::general_purpose::STANDARD
        .decode(sig_b64)
        .ok()?;
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(&org);
    mac.verify_slice(&sig).ok()?;
    String::from_utf8(org).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mint_verify_round_trip() {
        let token = mint_token("acme-corp", b"secret-key");
        assert_eq!(
            verify_token(&token, b"secret-key").as_deref(),
            Some("acme-corp")
        );
    }

    #[test]
    fn tampered_org_fails_verification() {
        let token = mint_token("acme-corp", b"secret-key");
        let (_, sig) = token.split_once('.').unwrap();
        let forged = format!(
            "{}.{}",
            base64::engine::general_purpose::STANDARD.encode(b"other-org"),
            sig
        );
        assert!(verify_token(&forged, b"secret-key").is_none());
    }

    #[test]
    fn wrong_key_fails_verification() {
        let token = mint_token("acme-corp", b"secret-key");
        assert!(verify_token(&token, b"different-key").is_none());
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(verify_token("not-a-token", b"k").is_none());
        assert!(verify_token("a.b.c", b"k").is_none());
        assert!(verify_token("", b"k").is_none());
    }
}
