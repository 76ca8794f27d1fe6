use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::api::ThemeLoader;
use crate::error::SetupError;
use crate::monster::Monster;

pub fn builtin_monsters() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("ogre", include_str!("../content/monsters/ogre.json")),
        ("goblin", include_str!("../content/monsters/goblin.json")),
        ("black_knight", include_str!("../content/monsters/black_knight.json")),
        ("dragon", include_str!("../content/monsters/dragon.json")),
    ])
}

pub fn parse_monster(asset: &str, text: &str) -> Result<Monster, SetupError> {
    serde_json::from_str(text)
        .map_err(|source| SetupError::MalformedTheme { asset: asset.to_string(), source })
}

/// Monsters compiled into the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinThemes;

impl ThemeLoader for BuiltinThemes {
    fn monster(&self, id: &str) -> Result<Monster, SetupError> {
        let text = builtin_monsters()
            .get(id)
            .copied()
            .ok_or_else(|| SetupError::UnknownMonster(id.to_string()))?;
        parse_monster(id, text)
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = builtin_monsters().keys().map(|k| k.to_string()).collect();
        names.sort();
        names
    }
}

/// A directory of `<id>.json` monster files, for custom themes.
#[derive(Debug, Clone)]
pub struct FileThemes {
    pub dir: PathBuf,
}

impl FileThemes {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ThemeLoader for FileThemes {
    fn monster(&self, id: &str) -> Result<Monster, SetupError> {
        let path = self.dir.join(format!("{id}.json"));
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SetupError::UnknownMonster(id.to_string()));
            }
            Err(e) => {
                let asset = path.display().to_string();
                return Err(SetupError::ThemeUnreadable { asset, source: e });
            }
        };
        parse_monster(&path.display().to_string(), &text)
    }

    fn names(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|x| x == "json"))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        names
    }
}
