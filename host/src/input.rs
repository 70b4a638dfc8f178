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

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::fmt;
use std::{fs, io::BufReader, path::Path};
use tee_core::VersionedBeaconState;
use tracing::debug;

/// Encoding of a validator registry file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RegistryEncoding {
    /// Concatenated SSZ validator records.
    Ssz,
    /// The same bytes as hex text, optionally `0x` prefixed.
    Hex,
}

impl fmt::Display for RegistryEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEncoding::Ssz => write!(f, "ssz"),
            RegistryEncoding::Hex => write!(f, "hex"),
        }
    }
}

/// Wrapper returned by `/eth/v2/debug/beacon/states/{state_id}`.
///
/// `data` is kept as unparsed text until the version is known.
#[derive(Serialize, Deserialize)]
pub struct BeaconStateResponse {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_optimistic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finalized: Option<bool>,
    pub data: Box<RawValue>,
}

impl BeaconStateResponse {
    pub fn into_state(self) -> Result<VersionedBeaconState, serde_json::Error> {
        VersionedBeaconState::from_json(&self.version, self.data.get())
    }
}

/// Return the raw registry bytes of `contents`.
pub fn decode_registry(contents: Vec<u8>, encoding: RegistryEncoding) -> anyhow::Result<Vec<u8>> {
    match encoding {
        RegistryEncoding::Ssz => Ok(contents),
        RegistryEncoding::Hex => {
            let text = std::str::from_utf8(&contents).context("hex registry is not UTF-8")?;
            let text = text.trim();
            let text = text.strip_prefix("0x").unwrap_or(text);
            hex::decode(text).context("invalid hex registry")
        }
    }
}

/// Reads a validator registry from `path`.
pub fn read_registry(path: &Path, encoding: RegistryEncoding) -> anyhow::Result<Vec<u8>> {
    let contents = fs::read(path)
        .with_context(|| format!("failed to read validator registry {}", path.display()))?;
    debug!(
        "Read {} bytes of {encoding} encoded validators from {}",
        contents.len(),
        path.display()
    );

    decode_registry(contents, encoding)
}

/// Reads a beacon API debug state response from `path`.
pub fn read_state(path: &Path) -> anyhow::Result<VersionedBeaconState> {
    let file = fs::File::open(path)
        .with_context(|| format!("failed to open beacon state {}", path.display()))?;
    let response: BeaconStateResponse = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse beacon state {}", path.display()))?;
    debug!("Beacon state version: {}", response.version);

    response
        .into_state()
        .context("failed to deserialize beacon state data")
}
