// Copyright 2023 Viktor Reusch
//
// This file is part of gpx_kml_routes.
//
// gpx_kml_routes is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// gpx_kml_routes is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License
// for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with gpx_kml_routes. If not, see <https://www.gnu.org/licenses/>.

//! Writing the combined and per-route KML files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use gpx_kml_routes::{combined_document, part_documents, read_gpx, to_bytes, Config};
use tracing::{error, info};

/// File name of the document holding all routes.
pub const COMBINED_FILE: &str = "kml.kml";

/// File name of the document holding route `index`.
pub fn part_file(index: usize) -> String {
    format!("kmlPart-{index}.kml")
}

/// Serialized KML documents ready to be written.
#[derive(Debug)]
pub struct Outputs {
    pub combined: Vec<u8>,
    pub parts: Vec<Vec<u8>>,
}

impl Outputs {
    /// Convert the GPX `source` completely before anything is written.
    pub fn convert(source: &[u8], config: &Config) -> Result<Self> {
        let document = read_gpx(source)?;
        let combined = to_bytes(&combined_document(&document, config)?)?;
        let parts = part_documents(&document, config)?
            .iter()
            .map(to_bytes)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { combined, parts })
    }

    /// Write all files into `dir`.
    ///
    /// Every file is attempted even if a previous one failed. Returns whether
    /// all writes succeeded.
    pub fn write_all(&self, dir: &Path) -> bool {
        let mut success = write_file(&dir.join(COMBINED_FILE), &self.combined);
        for (index, part) in self.parts.iter().enumerate() {
            success &= write_file(&dir.join(part_file(index)), part);
        }
        success
    }
}

fn write_file(path: &Path, data: &[u8]) -> bool {
    match fs::write(path, data).with_context(|| format!("failed to write {}", path.display())) {
        Ok(()) => {
            info!("saved {}", path.display());
            true
        }
        Err(err) => {
            error!("{err:#}");
            false
        }
    }
}
