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

//! Recovery of the TEE type that this chain stores in the validator `slashed` field.
//!
//! Two extraction paths exist. [tee_types_from_state] works on an already decoded
//! [VersionedBeaconState] and can only tell SEV from TDX, because the typed decoder has already
//! collapsed the field to a boolean. [tee_type_from_raw_validators] and [RawValidators] read the
//! SSZ validator records directly and return the byte as it is on the wire, including CCA.

use thiserror::Error;

mod beacon_state;
mod raw_validators;
mod tee_type;
mod typed_state;

pub use beacon_state::*;
pub use raw_validators::*;
pub use tee_type::*;
pub use typed_state::*;

pub type Slot = beacon_types::Slot;
pub type Validator = beacon_types::Validator;
pub type ValidatorIndex = usize;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("beacon state has no validator data for a known fork")]
    MissingValidatorData,
    #[error("failed to decode validators: {0}")]
    Decode(#[from] BeaconStateError),
    #[error("validator index {index} out of bounds")]
    IndexOutOfBounds { index: ValidatorIndex },
    #[error("validator registry of {len} bytes is not a whole number of records")]
    TrailingBytes { len: usize },
    #[error("validator {index} has unknown TEE type {value}")]
    UnknownTeeType { index: ValidatorIndex, value: u8 },
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}
