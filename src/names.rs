use crate::analysis::matchup::ChampionId;
use crate::error::AppError;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

/// Two-way champion name lookup built from `champion_ids.json` (`{ "Name": id }`).
#[derive(Debug, Clone, Default)]
pub struct ChampionNames {
    by_id: HashMap<ChampionId, String>,
    by_name: HashMap<String, ChampionId>,
}

impl ChampionNames {
    pub fn from_map(ids: HashMap<String, ChampionId>) -> Self {
        let mut names = ChampionNames::default();
        for (name, id) in ids {
            names.by_name.insert(lookup_key(&name), id);
            names.by_id.insert(id, name);
        }
        names
    }

    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        let ids: HashMap<String, ChampionId> = serde_json::from_str(json)
            .map_err(|e| AppError::JsonError(format!("Failed to parse champion ids: {}", e)))?;
        Ok(Self::from_map(ids))
    }

    /// Missing file is not an error, champions are then shown by id.
    pub fn load(data_dir: &Path) -> Result<Option<Self>, AppError> {
        let path = data_dir.join("champion_ids.json");
        match fs::read_to_string(&path) {
            Ok(content) => Self::from_json_str(&content).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::IoError(format!("{}: {}", path.display(), e))),
        }
    }

    pub fn name(&self, id: ChampionId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Case-insensitive; spaces and apostrophes are ignored ("Aurelion Sol", "Kai'Sa").
    pub fn id(&self, name: &str) -> Option<ChampionId> {
        self.by_name.get(&lookup_key(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

fn lookup_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '.')
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_both_ways() {
        let names = ChampionNames::from_json_str(r#"{ "AurelionSol": 136, "Kaisa": 145, "Wukong": 62 }"#).unwrap();
        assert_eq!(names.len(), 3);
        assert_eq!(names.name(136), Some("AurelionSol"));
        assert_eq!(names.id("aurelion sol"), Some(136));
        assert_eq!(names.id("Kai'Sa"), Some(145));
        assert_eq!(names.id("Teemo"), None);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = std::env::temp_dir().join("draft_insight_names_missing");
        assert!(ChampionNames::load(&dir).unwrap().is_none());
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        // A directory where the file should be
        let dir = std::env::temp_dir().join("draft_insight_names_unreadable");
        fs::create_dir_all(dir.join("champion_ids.json")).unwrap();
        assert!(matches!(ChampionNames::load(&dir), Err(AppError::IoError(_))));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            ChampionNames::from_json_str("[1, 2]"),
            Err(AppError::JsonError(_))
        ));
    }
}
