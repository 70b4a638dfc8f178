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

//! Direct access to SSZ encoded validator records.
//!
//! `Validator` is a fixed size SSZ container, so a list of validators is just the records
//! concatenated in index order:
//!
//! | Field                        | Offset | Size |
//! |------------------------------|--------|------|
//! | pubkey                       | 0      | 48   |
//! | withdrawal_credentials       | 48     | 32   |
//! | effective_balance            | 80     | 8    |
//! | slashed (TEE type)           | 88     | 1    |
//! | activation_eligibility_epoch | 89     | 8    |
//! | activation_epoch             | 97     | 8    |
//! | exit_epoch                   | 105    | 8    |
//! | withdrawable_epoch           | 113    | 8    |

use crate::{ExtractError, TeeType, ValidatorIndex, ensure};
use safe_arith::{ArithError, SafeArith};
use std::collections::BTreeMap;
use std::ops::Range;

pub const PUBKEY_OFFSET: usize = 0;
pub const WITHDRAWAL_CREDENTIALS_OFFSET: usize = PUBKEY_OFFSET + 48;
pub const EFFECTIVE_BALANCE_OFFSET: usize = WITHDRAWAL_CREDENTIALS_OFFSET + 32;
pub const TEE_TYPE_OFFSET: usize = EFFECTIVE_BALANCE_OFFSET + 8;
pub const ACTIVATION_ELIGIBILITY_EPOCH_OFFSET: usize = TEE_TYPE_OFFSET + 1;
pub const ACTIVATION_EPOCH_OFFSET: usize = ACTIVATION_ELIGIBILITY_EPOCH_OFFSET + 8;
pub const EXIT_EPOCH_OFFSET: usize = ACTIVATION_EPOCH_OFFSET + 8;
pub const WITHDRAWABLE_EPOCH_OFFSET: usize = EXIT_EPOCH_OFFSET + 8;

/// Size of one SSZ encoded validator record.
pub const VALIDATOR_RECORD_SIZE: usize = WITHDRAWABLE_EPOCH_OFFSET + 8;

const _: () = assert!(TEE_TYPE_OFFSET == 88);
const _: () = assert!(VALIDATOR_RECORD_SIZE == 121);

pub type ValidatorRecord = [u8; VALIDATOR_RECORD_SIZE];

/// Byte range of the record of validator `index`.
fn record_range(index: ValidatorIndex) -> Result<Range<usize>, ArithError> {
    let start = index.safe_mul(VALIDATOR_RECORD_SIZE)?;
    Ok(start..start.safe_add(VALIDATOR_RECORD_SIZE)?)
}

fn record(validators: &[u8], index: ValidatorIndex) -> Result<&ValidatorRecord, ExtractError> {
    record_range(index)
        .ok()
        .and_then(|range| validators.get(range))
        .and_then(|record| record.try_into().ok())
        .ok_or(ExtractError::IndexOutOfBounds { index })
}

/// Return the position of the TEE type byte of validator `index` in a validator list, or `None`
/// if it does not fit in `usize`.
#[inline]
pub fn tee_type_offset(index: ValidatorIndex) -> Option<usize> {
    record_range(index).ok().map(|range| range.start + TEE_TYPE_OFFSET)
}

/// Return the TEE type byte of validator `index` exactly as it appears in the SSZ encoded
/// validator list `validators`.
///
/// Fails with [ExtractError::IndexOutOfBounds] unless the whole record lies inside `validators`.
pub fn tee_type_from_raw_validators(
    validators: &[u8],
    index: ValidatorIndex,
) -> Result<u8, ExtractError> {
    Ok(record(validators, index)?[TEE_TYPE_OFFSET])
}

fn decode_tee_type(
    index: ValidatorIndex,
    value: u8,
) -> Result<(ValidatorIndex, TeeType), ExtractError> {
    TeeType::try_from(value)
        .map(|tee_type| (index, tee_type))
        .map_err(|_| ExtractError::UnknownTeeType { index, value })
}

/// A borrowed, SSZ encoded validator list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawValidators<'a> {
    bytes: &'a [u8],
}

impl<'a> RawValidators<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self, ExtractError> {
        ensure!(
            bytes.len() % VALIDATOR_RECORD_SIZE == 0,
            ExtractError::TrailingBytes { len: bytes.len() }
        );
        Ok(Self { bytes })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / VALIDATOR_RECORD_SIZE
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn record(&self, index: ValidatorIndex) -> Result<&'a ValidatorRecord, ExtractError> {
        record(self.bytes, index)
    }

    pub fn tee_type(&self, index: ValidatorIndex) -> Result<u8, ExtractError> {
        tee_type_from_raw_validators(self.bytes, index)
    }

    /// Iterate over the raw TEE type byte of every validator.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (ValidatorIndex, u8)> + 'a {
        self.bytes
            .chunks_exact(VALIDATOR_RECORD_SIZE)
            .map(|record| record[TEE_TYPE_OFFSET])
            .enumerate()
    }

    /// Return the TEE type of every validator, keyed by validator index.
    pub fn tee_types(&self) -> Result<BTreeMap<ValidatorIndex, TeeType>, ExtractError> {
        self.iter()
            .map(|(index, value)| decode_tee_type(index, value))
            .collect()
    }

    /// Same as [RawValidators::tee_types], with the records split across the rayon pool.
    #[cfg(feature = "rayon")]
    pub fn par_tee_types(&self) -> Result<BTreeMap<ValidatorIndex, TeeType>, ExtractError> {
        use rayon::prelude::*;

        self.bytes
            .par_chunks_exact(VALIDATOR_RECORD_SIZE)
            .enumerate()
            .map(|(index, record)| decode_tee_type(index, record[TEE_TYPE_OFFSET]))
            .collect()
    }
}
