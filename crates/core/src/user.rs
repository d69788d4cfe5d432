//! User identity and profile types.

use crate::error::{Error, Result, check_len};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_WALLET_LEN: usize = 44;
pub const MAX_USERNAME_LEN: usize = 80;
pub const MAX_AVATAR_URL_LEN: usize = 255;
pub const MAX_HANDLE_LEN: usize = 80;

/// Number of wallet characters shown when a user has no username.
const WALLET_PREVIEW_LEN: usize = 8;

/// The user a request claims to act as.
///
/// Identity is taken from the request body as-is; there is no signature
/// check behind it. Ownership gates go through [`Caller::owns`] so a real
/// authenticator only has to change how a `Caller` is constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Caller(i64);

impl Caller {
    pub fn new(user_id: i64) -> Self {
        Self(user_id)
    }

    pub fn owns(&self, owner_id: i64) -> bool {
        self.0 == owner_id
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

/// Trim and bound-check a wallet address.
pub fn normalize_wallet(address: &str) -> Result<String> {
    let address = address.trim();
    if address.is_empty() {
        return Err(Error::MissingField("wallet_address"));
    }
    check_len("wallet_address", address, MAX_WALLET_LEN)?;
    Ok(address.to_string())
}

/// Public display name: the username, or a shortened wallet address.
pub fn display_name(username: Option<&str>, wallet_address: &str) -> String {
    match username {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            let preview: String = wallet_address.chars().take(WALLET_PREVIEW_LEN).collect();
            format!("{preview}...")
        }
    }
}

/// Attribution recorded on stored objects: the username, or the full wallet.
pub fn attribution(username: Option<&str>, wallet_address: &str) -> String {
    match username {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => wallet_address.to_string(),
    }
}

/// Partial profile update.
///
/// A field that is absent is left alone. A field that is present overwrites,
/// and an explicit `null` clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, deserialize_with = "crate::serde_ext::present")]
    pub username: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::serde_ext::present")]
    pub avatar_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::serde_ext::present")]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::serde_ext::present")]
    pub x_handle: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::serde_ext::present")]
    pub discord_handle: Option<Option<String>>,
}

impl ProfileUpdate {
    /// Check field bounds and normalize usernames.
    ///
    /// Usernames are trimmed; a blank username clears it rather than
    /// claiming the empty string.
    pub fn validate(mut self) -> Result<Self> {
        if let Some(Some(name)) = &self.username {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                self.username = Some(None);
            } else {
                check_len("username", trimmed, MAX_USERNAME_LEN)?;
                self.username = Some(Some(trimmed.to_string()));
            }
        }
        if let Some(Some(url)) = &self.avatar_url {
            check_len("avatar_url", url, MAX_AVATAR_URL_LEN)?;
        }
        if let Some(Some(handle)) = &self.x_handle {
            check_len("x_handle", handle, MAX_HANDLE_LEN)?;
        }
        if let Some(Some(handle)) = &self.discord_handle {
            check_len("discord_handle", handle, MAX_HANDLE_LEN)?;
        }
        Ok(self)
    }
}
