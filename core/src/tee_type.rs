// Copyright 2025 RISC Zero, Inc.
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

use core::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeeTypeError {
    #[error("unknown TEE type: {0}")]
    Unknown(u8),
}

/// The TEE technology that attested a validator.
///
/// Stored on chain in the byte the standard protocol uses for the `slashed` flag.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum TeeType {
    Sev = 0,
    Tdx = 1,
    Cca = 2,
}

impl TeeType {
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for TeeType {
    type Error = TeeTypeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TeeType::Sev),
            1 => Ok(TeeType::Tdx),
            2 => Ok(TeeType::Cca),
            _ => Err(TeeTypeError::Unknown(value)),
        }
    }
}

/// Projection used by the typed path: a decoded `slashed` flag only distinguishes SEV from TDX.
impl From<bool> for TeeType {
    #[inline]
    fn from(slashed: bool) -> Self {
        if slashed { TeeType::Tdx } else { TeeType::Sev }
    }
}

impl From<TeeType> for u8 {
    #[inline]
    fn from(tee_type: TeeType) -> Self {
        tee_type.as_u8()
    }
}

impl fmt::Display for TeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeeType::Sev => write!(f, "SEV"),
            TeeType::Tdx => write!(f, "TDX"),
            TeeType::Cca => write!(f, "CCA"),
        }
    }
}
