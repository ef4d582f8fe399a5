//! Locations of the toolkit's bundled input files.
//!
//! Everything is relative to the toolkit installation directory, which also
//! holds the reduced line-region lists (`Reduced_line_list_<n>.txt`).

use std::path::PathBuf;

use crate::domain::AtmosphereFamily;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolkitResources {
    root: PathBuf,
}

impl ToolkitResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn ccf_mask(&self) -> PathBuf {
        self.root.join("input/linelists/CCF/Narval.Sun.370_1048nm/mask.lst")
    }

    pub fn model_atmospheres(&self, family: AtmosphereFamily) -> PathBuf {
        self.root.join("input/atmospheres").join(family.dir_name())
    }

    pub fn atomic_linelist(&self) -> PathBuf {
        self.root
            .join("input/linelists/transitions/GESv6_atom_hfs_iso.420_920nm/atomic_lines.tsv")
    }

    pub fn solar_abundances(&self, family: AtmosphereFamily) -> PathBuf {
        self.root
            .join("input/abundances")
            .join(family.abundances_dir_name())
            .join("stdatom.dat")
    }

    pub fn isotopes(&self) -> PathBuf {
        self.root.join("input/isotopes/SPECTRUM.lst")
    }

    pub fn segments(&self) -> PathBuf {
        self.root.join("input/regions/fe_lines_segments.txt")
    }

    pub fn line_regions(&self, line_list: u32) -> PathBuf {
        self.root.join(format!("Reduced_line_list_{line_list}.txt"))
    }
}
