// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests of emulators configured from files.

use std::{fs::File, io::Write};

use indoc::indoc;
use tempfile::TempDir;

use super::get_inputs;
use beam_emulator::{read_config_file, BeamEmulator, ErrorKind, InterpolationStrategy};

#[test]
fn test_emulator_from_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("emulator.toml");
    let mut f = File::create(&path).unwrap();
    f.write_all(
        indoc! {r#"
            coefficient_order = 3
            return_beam_above_horizon = true

            [interpolation]
            method = "spline"
            order = 2
        "#}
        .as_bytes(),
    )
    .unwrap();
    drop(f);

    let config = read_config_file(&path).unwrap();
    assert_eq!(
        config.interpolation,
        InterpolationStrategy::Spline { order: 2 }
    );
    let emulator = BeamEmulator::new(get_inputs(2), config).unwrap();
    assert_eq!(emulator.basis().coefficient_order(), 3);
    let beam = emulator.query(&[1.0]).unwrap();
    assert_eq!(beam.dim(), (2, 6));

    // Round trip the config through a json file.
    let json = serde_json::to_string(emulator.config()).unwrap();
    let path = dir.path().join("emulator.json");
    std::fs::write(&path, json).unwrap();
    let config = read_config_file(&path).unwrap();
    assert_eq!(&config, emulator.config());
    let same = BeamEmulator::new(get_inputs(2), config).unwrap();
    assert_eq!(same.query(&[1.0]).unwrap(), beam);
}

#[test]
fn test_bad_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("emulator.toml");
    std::fs::write(
        &path,
        indoc! {r#"
            [interpolation]
            method = "gaussian_process"
            regressor = "Stacking"
        "#},
    )
    .unwrap();
    let err = read_config_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let path = dir.path().join("emulator.yaml");
    std::fs::write(&path, "coefficient_order: 3").unwrap();
    let err = read_config_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
