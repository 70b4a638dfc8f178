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

//! Runs the `tee-extract` commands over registry and state files written to a temporary directory.

use clap::{Parser, error::ErrorKind};
use host::{Args, Command, RegistryEncoding, extract, to_json};
use serde_json::json;
use std::{collections::BTreeMap, fs, path::PathBuf};
use tee_core::{ExtractError, TEE_TYPE_OFFSET, TeeType, TeeTypeError, VALIDATOR_RECORD_SIZE};
use tempfile::TempDir;
use test_log::test;

/// Builds a registry with one record per entry of `tee_types`, each carrying that byte at the TEE
/// type offset and filler everywhere else.
fn registry(tee_types: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(tee_types.len() * VALIDATOR_RECORD_SIZE);
    for (index, tee_type) in tee_types.iter().enumerate() {
        let mut record = [(index % 251) as u8; VALIDATOR_RECORD_SIZE];
        record[TEE_TYPE_OFFSET] = *tee_type;
        bytes.extend_from_slice(&record);
    }
    bytes
}

fn write(dir: &TempDir, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn raw(file: PathBuf, index: Option<usize>, parallel: bool) -> Command {
    Command::Raw {
        file,
        index,
        encoding: RegistryEncoding::Ssz,
        parallel,
    }
}

fn validator_json(slashed: bool) -> serde_json::Value {
    json!({
        "pubkey": format!("0x{}", "00".repeat(48)),
        "withdrawal_credentials": format!("0x{}", "01".repeat(32)),
        "effective_balance": "32000000000",
        "slashed": slashed,
        "activation_eligibility_epoch": "0",
        "activation_epoch": "0",
        "exit_epoch": "18446744073709551615",
        "withdrawable_epoch": "18446744073709551615"
    })
}

#[test]
fn raw_registry_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(&dir, "registry.ssz", registry(&[0, 1, 2]));

    let tee_types = extract(raw(file, None, false)).unwrap();
    assert_eq!(
        tee_types,
        BTreeMap::from([(0, TeeType::Sev), (1, TeeType::Tdx), (2, TeeType::Cca)])
    );

    let output: serde_json::Value = serde_json::from_str(&to_json(&tee_types).unwrap()).unwrap();
    assert_eq!(output, json!({ "0": "SEV", "1": "TDX", "2": "CCA" }));
}

#[test]
fn raw_index_reports_one_validator() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(&dir, "registry.ssz", registry(&[0, 1, 2]));

    let tee_types = extract(raw(file, Some(2), false)).unwrap();
    assert_eq!(tee_types, BTreeMap::from([(2, TeeType::Cca)]));

    let output: serde_json::Value = serde_json::from_str(&to_json(&tee_types).unwrap()).unwrap();
    assert_eq!(output, json!({ "2": "CCA" }));
}

#[test]
fn raw_index_rejects_unknown_tee_type() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(&dir, "registry.ssz", registry(&[0, 7]));

    let err = extract(raw(file.clone(), Some(1), false)).unwrap_err();
    assert_eq!(
        err.downcast_ref::<TeeTypeError>(),
        Some(&TeeTypeError::Unknown(7))
    );

    // other records of the same registry are still readable
    assert_eq!(
        extract(raw(file.clone(), Some(0), false)).unwrap(),
        BTreeMap::from([(0, TeeType::Sev)])
    );

    let err = extract(raw(file, None, false)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::UnknownTeeType { index: 1, value: 7 })
    ));
}

#[test]
fn raw_index_past_end() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(&dir, "registry.ssz", registry(&[0, 1]));

    let err = extract(raw(file, Some(2), false)).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::IndexOutOfBounds { index: 2 })
    ));
}

#[test]
fn raw_index_requires_whole_records() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = registry(&[1, 2]);
    bytes.pop();
    assert_eq!(bytes.len(), 241);
    let file = write(&dir, "registry.ssz", bytes);

    for index in [Some(0), None] {
        let err = extract(raw(file.clone(), index, false)).unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<ExtractError>(),
                Some(ExtractError::TrailingBytes { len: 241 })
            ),
            "{index:?}: {err:#}"
        );
    }
}

#[test]
fn parallel_matches_sequential() {
    let tee_types: Vec<u8> = (0..1000).map(|i| (i * 7 % 3) as u8).collect();
    let dir = tempfile::tempdir().unwrap();
    let file = write(&dir, "registry.ssz", registry(&tee_types));

    let sequential = extract(raw(file.clone(), None, false)).unwrap();
    let parallel = extract(raw(file, None, true)).unwrap();
    assert_eq!(sequential.len(), tee_types.len());
    assert_eq!(parallel, sequential);
}

#[test]
fn hex_registry() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(
        &dir,
        "registry.hex",
        format!("0x{}\n", hex::encode(registry(&[2, 0]))),
    );

    let tee_types = extract(Command::Raw {
        file,
        index: None,
        encoding: RegistryEncoding::Hex,
        parallel: false,
    })
    .unwrap();
    assert_eq!(
        tee_types,
        BTreeMap::from([(0, TeeType::Cca), (1, TeeType::Sev)])
    );
}

#[test]
fn command_line() {
    let parse = |args: &[&str]| Args::try_parse_from([&["tee-extract"][..], args].concat());

    let err = parse(&["raw", "registry.ssz", "--index", "0", "--parallel"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);

    let encoding = |args: &[&str]| match parse(args).unwrap().command {
        Command::Raw { encoding, .. } => encoding,
        command => panic!("expected raw command, got {command:?}"),
    };
    assert_eq!(encoding(&["raw", "registry.ssz"]), RegistryEncoding::Ssz);

    // SAFETY: the environment is only accessed through `std::env` in this test binary.
    unsafe { std::env::set_var("TEE_EXTRACT_ENCODING", "hex") };
    assert_eq!(encoding(&["raw", "registry.hex"]), RegistryEncoding::Hex);
    assert_eq!(
        encoding(&["raw", "registry.ssz", "--encoding", "ssz"]),
        RegistryEncoding::Ssz
    );
    // SAFETY: as above.
    unsafe { std::env::remove_var("TEE_EXTRACT_ENCODING") };

    assert!(matches!(
        parse(&["state", "state.json"]).unwrap().command,
        Command::State { .. }
    ));
}

#[test]
fn state_maps_slashed_flags() {
    let dir = tempfile::tempdir().unwrap();
    let response = json!({
        "version": "deneb",
        "execution_optimistic": false,
        "finalized": true,
        "data": {
            "slot": "96",
            "balances": ["32000000000", "32000000000"],
            "validators": [validator_json(false), validator_json(true)]
        }
    });
    let file = write(&dir, "state.json", response.to_string());

    let tee_types = extract(Command::State { file }).unwrap();
    assert_eq!(
        tee_types,
        BTreeMap::from([(0, TeeType::Sev), (1, TeeType::Tdx)])
    );
}

#[test]
fn unknown_state_version_has_no_validator_data() {
    let dir = tempfile::tempdir().unwrap();
    let response = json!({
        "version": "gloas",
        "data": { "slot": "1", "validators": [validator_json(true)] }
    });
    let file = write(&dir, "state.json", response.to_string());

    let err = extract(Command::State { file }).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::MissingValidatorData)
    ));
}
