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

use crate::{ExtractError, TeeType, ValidatorIndex, VersionedBeaconState};
use std::collections::BTreeMap;
use tracing::trace;

/// Return the TEE type of every validator in `state`, keyed by validator index.
///
/// The typed decoder reads the TEE byte as the boolean `slashed`, so only [TeeType::Sev] and
/// [TeeType::Tdx] can be recovered here and CCA validators show up as TDX. Use
/// [crate::RawValidators] on the SSZ bytes of the registry when CCA has to be told apart.
pub fn tee_types_from_state(
    state: &VersionedBeaconState,
) -> Result<BTreeMap<ValidatorIndex, TeeType>, ExtractError> {
    let validators = match state {
        VersionedBeaconState::Phase0(state) => state.validators()?,
        VersionedBeaconState::Altair(state) => state.validators()?,
        VersionedBeaconState::Bellatrix(state) => state.validators()?,
        VersionedBeaconState::Capella(state) => state.validators()?,
        VersionedBeaconState::Deneb(state) => state.validators()?,
        VersionedBeaconState::Electra(state) => state.validators()?,
        VersionedBeaconState::Fulu(state) => state.validators()?,
        VersionedBeaconState::Unknown(version) => {
            trace!(%version, "No validator data for unknown fork");
            return Err(ExtractError::MissingValidatorData);
        }
    };
    trace!(
        version = ?state.version(),
        validators = validators.len(),
        "Mapping slashed flags to TEE types"
    );

    Ok(validators
        .iter()
        .enumerate()
        .map(|(index, validator)| (index, TeeType::from(validator.slashed)))
        .collect())
}
