//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

/// Four entries: three tagged, one without keywords.
///
/// With the built-in alias table this consolidates to
/// LES (2), boundary layer (2), ALM (1), shear (1), wakes (1), wind turbines (1).
pub const FIXTURE_BIB: &str = r#"
@string{jwe = "Journal of Wind Energy"}

@article{smith2020,
  author = {Smith, John and M{\"u}ller, Anna},
  title = {Large-eddy simulation of wind turbine wakes},
  journal = jwe,
  year = 2020,
  doi = {https://doi.org/10.1234/wes.2020.001},
  keywords = {Large Eddy Simulation, wind turbine wakes, LES}
}

@inproceedings{doe2019,
  author = {Doe, Jane},
  title = {Wind Shear Effects},
  keywords = {wind shear, Wind Turbine, boundary layer}
}

@article{lee2021,
  author = {Lee, Kim},
  title = {Actuator line modeling in stable boundary layers},
  doi = {10.5555/alm.2021},
  keywords = {actuator line model, stable boundary layer, LES}
}

@misc{nokw2022,
  title = {No keywords here}
}
"#;

/// Writes `contents` to `name` inside a fresh temp dir.
///
/// The `TempDir` must be kept alive for the path to remain valid.
pub fn write_fixture(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture");
    (dir, path)
}
