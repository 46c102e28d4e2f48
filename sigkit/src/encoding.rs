//! Text encodings for signatures and digests.

use crate::{Error, ErrorKind, Result};
use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use core::{fmt, str::FromStr};

/// Text encoding applied at API boundaries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Encoding {
    /// Lowercase hexadecimal.
    Hex,

    /// Standard base64 with padding.
    #[default]
    Base64,

    /// URL-safe base64 without padding.
    Base64Url,
}

impl Encoding {
    /// Name of this encoding.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Base64 => "base64",
            Self::Base64Url => "base64url",
        }
    }

    /// Encode bytes as text.
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Hex => hex::encode(bytes),
            Self::Base64 => STANDARD.encode(bytes),
            Self::Base64Url => URL_SAFE_NO_PAD.encode(bytes),
        }
    }

    /// Decode text produced by [`Encoding::encode`].
    ///
    /// Hex input is accepted in either case; base64url input may carry
    /// trailing `=` padding.
    pub fn decode(self, text: &str) -> Result<Vec<u8>> {
        let decoded = match self {
            Self::Hex => hex::decode(text).map_err(|e| self.decode_error(e)),
            Self::Base64 => STANDARD.decode(text).map_err(|e| self.decode_error(e)),
            Self::Base64Url => URL_SAFE_NO_PAD
                .decode(text.trim_end_matches('='))
                .map_err(|e| self.decode_error(e)),
        }?;

        Ok(decoded)
    }

    fn decode_error(self, source: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::new(ErrorKind::InvalidEncoding)
            .with_context("encoding", self)
            .with_source(source)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            "base64url" => Ok(Self::Base64Url),
            _ => Err(Error::new(ErrorKind::InvalidEncoding).with_context("encoding", name)),
        }
    }
}
