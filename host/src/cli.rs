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

use crate::{RegistryEncoding, read_registry, read_state};
use anyhow::Context;
use clap::Parser;
use std::{collections::BTreeMap, path::PathBuf};
use tee_core::{RawValidators, TeeType, ValidatorIndex, tee_types_from_state};
use tracing::{info, warn};

/// CLI for recovering validator TEE types from beacon chain data
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

/// Subcommands of the extractor CLI.
#[derive(Parser, Debug)]
pub enum Command {
    /// Reads SSZ encoded validator records; recovers SEV, TDX and CCA
    #[clap(name = "raw")]
    Raw {
        /// File holding the concatenated validator records
        file: PathBuf,

        /// Only report the validator with this index
        #[clap(long, short)]
        index: Option<ValidatorIndex>,

        /// Encoding of the registry file
        #[clap(long, short, value_enum, env = "TEE_EXTRACT_ENCODING", default_value_t = RegistryEncoding::Ssz)]
        encoding: RegistryEncoding,

        /// Decode the records on all cores
        #[clap(long, conflicts_with = "index")]
        parallel: bool,
    },
    /// Reads a beacon API debug state response; recovers SEV and TDX only
    #[clap(name = "state")]
    State {
        /// File holding the `/eth/v2/debug/beacon/states/{state_id}` JSON response
        file: PathBuf,
    },
}

/// Runs `command` and returns the TEE type of every reported validator.
///
/// The registry passed to `raw` must hold whole records, also when a single `index` is asked for.
pub fn extract(command: Command) -> anyhow::Result<BTreeMap<ValidatorIndex, TeeType>> {
    match command {
        Command::Raw {
            file,
            index,
            encoding,
            parallel,
        } => {
            let bytes = read_registry(&file, encoding)?;
            let validators = RawValidators::new(&bytes)
                .with_context(|| format!("invalid validator registry {}", file.display()))?;
            match index {
                Some(index) => {
                    let value = validators.tee_type(index)?;
                    let tee_type = TeeType::try_from(value)
                        .with_context(|| format!("validator {index}"))?;
                    Ok(BTreeMap::from([(index, tee_type)]))
                }
                None => {
                    info!("Decoding {} validator records", validators.len());
                    if parallel {
                        Ok(validators.par_tee_types()?)
                    } else {
                        Ok(validators.tee_types()?)
                    }
                }
            }
        }
        Command::State { file } => {
            let state = read_state(&file)?;
            info!(
                "Loaded beacon state: version {:?}, slot {:?}",
                state.version(),
                state.slot()
            );
            warn!("Decoded states only carry the slashed flag, CCA validators are reported as TDX");
            Ok(tee_types_from_state(&state)?)
        }
    }
}

/// Renders `tee_types` as the JSON object printed by the CLI, keyed by validator index.
pub fn to_json(tee_types: &BTreeMap<ValidatorIndex, TeeType>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tee_types)
}
