//! Ability catalog loader.

use std::path::Path;

use battle_core::AbilityDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Ability catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityFile {
    pub abilities: Vec<AbilityDefinition>,
}

/// Loader for the ability catalog from RON files.
pub struct AbilityLoader;

impl AbilityLoader {
    /// Load ability definitions from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<AbilityDefinition>> {
        let content = read_file(path)?;
        let file: AbilityFile = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse ability catalog RON: {}", e))?;

        Ok(file.abilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{AbilityId, AbilityKind, TargetScope};
    use std::io::Write;

    #[test]
    fn shipped_catalog_parses() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data/abilities.ron"));
        let abilities = AbilityLoader::load(path).expect("Failed to load abilities.ron");

        assert!(abilities.len() >= 8);
        let strike = abilities
            .iter()
            .find(|a| a.id == AbilityId::from("strike"))
            .expect("strike missing");
        assert_eq!(strike.kind, AbilityKind::Physical);
        assert_eq!(strike.target, TargetScope::SingleEnemy);
        // Unspecified accuracy defaults to a sure hit.
        assert_eq!(strike.accuracy, 100);
    }

    #[test]
    fn malformed_ron_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(abilities: [(id: \"broken\"").unwrap();
        assert!(AbilityLoader::load(file.path()).is_err());
    }
}
