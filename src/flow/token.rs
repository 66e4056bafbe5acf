// ABOUTME: Extraction of the pet QR token from arbitrary decoded text
// ABOUTME: The first UUID-shaped substring wins, matched case-insensitively and kept as printed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Central Vet

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;

static TOKEN_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}").ok()
});

/// QR token of a pet record
///
/// Only obtainable through [`ScanToken::extract`], so holding one means the
/// decoded text contained a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanToken(String);

impl ScanToken {
    /// Token embedded anywhere in `decoded`
    ///
    /// Labels may print the bare token or a full public URL; both work.
    /// The matched text is kept verbatim, case included.
    #[must_use]
    pub fn extract(decoded: &str) -> Option<Self> {
        let found = TOKEN_PATTERN.as_ref()?.find(decoded)?;
        Uuid::parse_str(found.as_str()).ok()?;
        Some(Self(found.as_str().to_owned()))
    }

    /// Token text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScanToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ScanToken> for String {
    fn from(token: ScanToken) -> Self {
        token.0
    }
}
