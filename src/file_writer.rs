use crate::category::{LibraryCategory, get_footprint_library_name, get_library_filename};
use crate::converter::library_merge::{
    empty_library, remove_from_library, replace_in_library, symbol_exists_in_library,
};
use crate::error::Result;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to a symbol written into a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolWrite {
    Added,
    Replaced,
}

/// Manages the output library structure.
#[derive(Debug, Clone)]
pub struct KicadLibrary {
    pub path: PathBuf,
}

impl KicadLibrary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn symbols_dir(&self) -> PathBuf {
        self.path.join("symbols")
    }

    pub fn footprints_dir(&self) -> PathBuf {
        self.path
            .join(format!("{}.pretty", get_footprint_library_name()))
    }

    pub fn models_dir(&self) -> PathBuf {
        self.path
            .join(format!("{}.3dshapes", get_footprint_library_name()))
    }

    /// Creates the necessary directories for symbols, footprints, and 3D models.
    pub fn setup_directories(&self) -> Result<()> {
        fs::create_dir_all(self.symbols_dir())?;
        fs::create_dir_all(self.footprints_dir())?;
        fs::create_dir_all(self.models_dir())?;
        Ok(())
    }

    pub fn symbol_library_path(&self, category: LibraryCategory) -> PathBuf {
        self.symbols_dir().join(get_library_filename(category))
    }

    fn read_symbol_library(path: &Path) -> Result<String> {
        if path.exists() {
            Ok(fs::read_to_string(path)?)
        } else {
            Ok(empty_library())
        }
    }

    /// Replaces the whole file in one rename so readers never see a partial file.
    fn write_atomically(path: &Path, content: impl AsRef<[u8]>) -> Result<()> {
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn contains_symbol(&self, category: LibraryCategory, name: &str) -> Result<bool> {
        let library = Self::read_symbol_library(&self.symbol_library_path(category))?;
        Ok(symbol_exists_in_library(&library, name))
    }

    /// Adds a symbol to its category library, replacing an older version in place.
    pub fn install_symbol(
        &self,
        category: LibraryCategory,
        name: &str,
        entry: &str,
    ) -> Result<SymbolWrite> {
        let lib_path = self.symbol_library_path(category);
        let library = Self::read_symbol_library(&lib_path)?;
        let existed = symbol_exists_in_library(&library, name);
        let updated = replace_in_library(&library, name, entry)?;
        Self::write_atomically(&lib_path, &updated)?;

        if existed {
            info!("Replaced symbol '{}' in {}", name, lib_path.display());
            Ok(SymbolWrite::Replaced)
        } else {
            info!("Added symbol '{}' to {}", name, lib_path.display());
            Ok(SymbolWrite::Added)
        }
    }

    /// Removes a symbol; returns false when it was not installed.
    pub fn remove_symbol(&self, category: LibraryCategory, name: &str) -> Result<bool> {
        let lib_path = self.symbol_library_path(category);
        if !lib_path.exists() {
            return Ok(false);
        }
        let library = fs::read_to_string(&lib_path)?;
        if !symbol_exists_in_library(&library, name) {
            return Ok(false);
        }
        let updated = remove_from_library(&library, name)?;
        Self::write_atomically(&lib_path, &updated)?;
        info!("Removed symbol '{}' from {}", name, lib_path.display());
        Ok(true)
    }

    /// Writes a footprint to its own .kicad_mod file.
    pub fn write_footprint(&self, name: &str, content: &str) -> Result<PathBuf> {
        let fp_path = self.footprints_dir().join(format!("{}.kicad_mod", name));
        Self::write_atomically(&fp_path, content)?;
        debug!("Wrote footprint {}", fp_path.display());
        Ok(fp_path)
    }

    pub fn remove_footprint(&self, name: &str) -> Result<bool> {
        let fp_path = self.footprints_dir().join(format!("{}.kicad_mod", name));
        if !fp_path.exists() {
            return Ok(false);
        }
        fs::remove_file(fp_path)?;
        Ok(true)
    }

    /// Writes a STEP model next to the footprints.
    pub fn write_3d_model(&self, name: &str, step_data: &[u8]) -> Result<PathBuf> {
        let model_path = self.models_dir().join(format!("{}.step", name));
        Self::write_atomically(&model_path, step_data)?;
        debug!("Wrote 3D model {}", model_path.display());
        Ok(model_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leftovers(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.to_string_lossy().ends_with(".tmp"))
            .collect()
    }

    #[test]
    fn test_footprint_and_model_writes_leave_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let lib = KicadLibrary::new(dir.path());
        lib.setup_directories().unwrap();

        let first = lib.write_footprint("LM1117-3.3", "(footprint \"old\")").unwrap();
        let second = lib.write_footprint("LM1117-3.3", "(footprint \"new\")").unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read_to_string(&second).unwrap(), "(footprint \"new\")");
        assert!(leftovers(&lib.footprints_dir()).is_empty());

        let model = lib.write_3d_model("SOT-23", b"ISO-10303-21;").unwrap();
        assert_eq!(fs::read(&model).unwrap(), b"ISO-10303-21;");
        assert!(leftovers(&lib.models_dir()).is_empty());
    }
}
