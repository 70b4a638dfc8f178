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

use crate::{Slot, Validator};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeaconStateError {
    #[error("{version} state has no validator registry")]
    MissingValidators { version: DataVersion },
    #[error("invalid {version} validator registry: {source}")]
    InvalidValidators {
        version: DataVersion,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown data version: {0}")]
pub struct UnknownDataVersion(pub String);

/// The fork a beacon state was encoded for, named as in the beacon API `version` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataVersion {
    Phase0,
    Altair,
    Bellatrix,
    Capella,
    Deneb,
    Electra,
    Fulu,
}

impl DataVersion {
    pub const ALL: [DataVersion; 7] = [
        DataVersion::Phase0,
        DataVersion::Altair,
        DataVersion::Bellatrix,
        DataVersion::Capella,
        DataVersion::Deneb,
        DataVersion::Electra,
        DataVersion::Fulu,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            DataVersion::Phase0 => "phase0",
            DataVersion::Altair => "altair",
            DataVersion::Bellatrix => "bellatrix",
            DataVersion::Capella => "capella",
            DataVersion::Deneb => "deneb",
            DataVersion::Electra => "electra",
            DataVersion::Fulu => "fulu",
        }
    }
}

impl fmt::Display for DataVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataVersion {
    type Err = UnknownDataVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataVersion::ALL
            .into_iter()
            .find(|version| version.name().eq_ignore_ascii_case(s))
            // lighthouse names phase0 `base`
            .or_else(|| s.eq_ignore_ascii_case("base").then_some(DataVersion::Phase0))
            .ok_or_else(|| UnknownDataVersion(s.to_string()))
    }
}

fn decode_validators(
    version: DataVersion,
    registry: Option<&RawValue>,
) -> Result<Vec<Validator>, BeaconStateError> {
    let registry = registry.ok_or(BeaconStateError::MissingValidators { version })?;
    serde_json::from_str::<Vec<Validator>>(registry.get())
        .map_err(|source| BeaconStateError::InvalidValidators { version, source })
}

macro_rules! fork_beacon_state {
    ($($name:ident => $version:ident),* $(,)?) => {
        $(
            #[doc = concat!("`", stringify!($version), "` beacon state, reduced to the fields read by this crate.")]
            #[derive(Clone, Debug, Serialize, Deserialize)]
            pub struct $name {
                pub slot: Slot,
                /// `state.validators` as received; decoded on access.
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub validators: Option<Box<RawValue>>,
            }

            impl $name {
                pub const VERSION: DataVersion = DataVersion::$version;

                pub fn new(slot: Slot, validators: &[Validator]) -> Result<Self, serde_json::Error> {
                    Ok(Self {
                        slot,
                        validators: Some(serde_json::value::to_raw_value(validators)?),
                    })
                }

                /// Return the decoded `state.validators`.
                pub fn validators(&self) -> Result<Vec<Validator>, BeaconStateError> {
                    decode_validators(Self::VERSION, self.validators.as_deref())
                }
            }
        )*
    };
}

fork_beacon_state! {
    Phase0BeaconState => Phase0,
    AltairBeaconState => Altair,
    BellatrixBeaconState => Bellatrix,
    CapellaBeaconState => Capella,
    DenebBeaconState => Deneb,
    ElectraBeaconState => Electra,
    FuluBeaconState => Fulu,
}

/// A beacon state together with the fork it was decoded for.
#[derive(Clone, Debug)]
pub enum VersionedBeaconState {
    Phase0(Phase0BeaconState),
    Altair(AltairBeaconState),
    Bellatrix(BellatrixBeaconState),
    Capella(CapellaBeaconState),
    Deneb(DenebBeaconState),
    Electra(ElectraBeaconState),
    Fulu(FuluBeaconState),
    /// A state tagged with a version this crate does not know; carries no fork data.
    Unknown(String),
}

impl VersionedBeaconState {
    /// Builds the state from the `version` and `data` members of a beacon API
    /// `/eth/v2/debug/beacon/states/{state_id}` response.
    ///
    /// Members of `data` other than `slot` and `validators` are skipped without being buffered.
    pub fn from_json(version: &str, data: &str) -> Result<Self, serde_json::Error> {
        let Ok(version) = version.parse::<DataVersion>() else {
            return Ok(VersionedBeaconState::Unknown(version.to_string()));
        };

        Ok(match version {
            DataVersion::Phase0 => VersionedBeaconState::Phase0(serde_json::from_str(data)?),
            DataVersion::Altair => VersionedBeaconState::Altair(serde_json::from_str(data)?),
            DataVersion::Bellatrix => VersionedBeaconState::Bellatrix(serde_json::from_str(data)?),
            DataVersion::Capella => VersionedBeaconState::Capella(serde_json::from_str(data)?),
            DataVersion::Deneb => VersionedBeaconState::Deneb(serde_json::from_str(data)?),
            DataVersion::Electra => VersionedBeaconState::Electra(serde_json::from_str(data)?),
            DataVersion::Fulu => VersionedBeaconState::Fulu(serde_json::from_str(data)?),
        })
    }

    pub fn version(&self) -> Option<DataVersion> {
        match self {
            VersionedBeaconState::Phase0(_) => Some(DataVersion::Phase0),
            VersionedBeaconState::Altair(_) => Some(DataVersion::Altair),
            VersionedBeaconState::Bellatrix(_) => Some(DataVersion::Bellatrix),
            VersionedBeaconState::Capella(_) => Some(DataVersion::Capella),
            VersionedBeaconState::Deneb(_) => Some(DataVersion::Deneb),
            VersionedBeaconState::Electra(_) => Some(DataVersion::Electra),
            VersionedBeaconState::Fulu(_) => Some(DataVersion::Fulu),
            VersionedBeaconState::Unknown(_) => None,
        }
    }

    pub fn slot(&self) -> Option<Slot> {
        match self {
            VersionedBeaconState::Phase0(state) => Some(state.slot),
            VersionedBeaconState::Altair(state) => Some(state.slot),
            VersionedBeaconState::Bellatrix(state) => Some(state.slot),
            VersionedBeaconState::Capella(state) => Some(state.slot),
            VersionedBeaconState::Deneb(state) => Some(state.slot),
            VersionedBeaconState::Electra(state) => Some(state.slot),
            VersionedBeaconState::Fulu(state) => Some(state.slot),
            VersionedBeaconState::Unknown(_) => None,
        }
    }
}
