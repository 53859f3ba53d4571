//! ICC profile header checks.

use crate::error::IccError;

/// Minimum bytes: 128-byte header plus the tag count.
const MIN_PROFILE_LEN: usize = 132;

/// A profile whose header passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IccProfile {
    data: Vec<u8>,
}

impl IccProfile {
    /// Validate a profile header.
    pub fn parse(data: &[u8]) -> Result<Self, IccError> {
        if data.len() < MIN_PROFILE_LEN {
            return Err(IccError::Truncated(data.len()));
        }
        if &data[36..40] != b"acsp" {
            return Err(IccError::BadSignature);
        }

        let declared = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if declared > data.len() {
            return Err(IccError::SizeMismatch {
                declared,
                actual: data.len(),
            });
        }

        let end = if declared >= MIN_PROFILE_LEN { declared } else { data.len() };
        Ok(Self {
            data: data[..end].to_vec(),
        })
    }

    /// Data color space signature from the header (e.g. `"RGB "`).
    pub fn color_space(&self) -> &str {
        std::str::from_utf8(&self.data[16..20]).unwrap_or("????")
    }

    /// Whether the profile describes RGB data.
    pub fn is_rgb(&self) -> bool {
        &self.data[16..20] == b"RGB "
    }

    /// Profile bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Take the profile bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
pub(crate) fn test_profile(color_space: &[u8; 4]) -> Vec<u8> {
    let mut data = vec![0u8; 200];
    data[..4].copy_from_slice(&200u32.to_be_bytes());
    data[16..20].copy_from_slice(color_space);
    data[36..40].copy_from_slice(b"acsp");
    data
}
