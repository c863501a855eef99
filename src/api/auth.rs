// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - API Key Authentication
 * SHA-256 keyed gateway auth with scoped permissions
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::AuthError;
use crate::store::Store;
use crate::types::{ApiKeyRecord, Scope};

const KEY_PREFIX_LEN: usize = 8;
const KEY_SECRET_LEN: usize = 32;

/// A freshly minted key. The plaintext exists only in this value; the
/// store keeps nothing but the hash.
pub struct MintedKey {
    pub plaintext: String,
    pub record: ApiKeyRecord,
}

/// SHA-256 of the plaintext, hex-encoded. This is the only key form
/// ever persisted or compared.
pub fn hash_key(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    hex::encode(hasher.finalize())
}

/// Display-safe fragment for operator identification
pub fn key_prefix(plaintext: &str) -> String {
    plaintext.chars().take(KEY_PREFIX_LEN).collect()
}

/// Mint a new API key. The caller must surface `plaintext` to the
/// operator exactly once and then drop it.
pub fn mint_key(
    name: &str,
    permissions: Vec<Scope>,
    expires_at: Option<DateTime<Utc>>,
) -> MintedKey {
    let mut rng = rand::thread_rng();
    let secret: String = (0..KEY_SECRET_LEN)
        .map(|_| {
            let chars = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
            chars[rng.gen_range(0..chars.len())] as char
        })
        .collect();
    let plaintext = format!("krt_{}", secret);

    let record = ApiKeyRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        key_hash: hash_key(&plaintext),
        key_prefix: key_prefix(&plaintext),
        permissions,
        expires_at,
        last_used_at: None,
        created_at: Utc::now(),
    };

    MintedKey { plaintext, record }
}

/// Resolve a presented key to its record. Missing, unknown, and expired
/// keys are indistinguishable to the caller beyond the error message.
/// Updates last_used_at on success.
pub async fn authenticate(
    store: &dyn Store,
    presented: Option<&str>,
) -> Result<ApiKeyRecord, AuthError> {
    let plaintext = presented.filter(|k| !k.is_empty()).ok_or(AuthError::MissingKey)?;

    let record = store
        .get_api_key_by_hash(&hash_key(plaintext))
        .await
        .map_err(|_| AuthError::InvalidKey)?
        .ok_or(AuthError::InvalidKey)?;

    let now = Utc::now();
    if record.is_expired(now) {
        return Err(AuthError::ExpiredKey);
    }

    // Best effort; a failed touch must not reject a valid key
    let _ = store.touch_api_key(record.id, now).await;

    Ok(record)
}

/// Scope check after authentication. 403 surface.
pub fn require_scope(record: &ApiKeyRecord, scope: Scope) -> Result<(), AuthError> {
    if record.has_scope(scope) {
        Ok(())
    } else {
        Err(AuthError::InsufficientScope {
            scope: scope.as_str().to_string(),
        })
    }
}
