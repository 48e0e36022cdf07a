//! On-disk cache of raw release pages
//!
//! Pages are stored as `{dir}/title_{id}.html`. The file name depends on the
//! identifier only, so two titles that map to the same release share a file.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};
use crate::types::{MovieId, RawPage};

#[derive(Debug, Clone)]
pub struct PageStore {
    dir: PathBuf,
}

impl PageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: &MovieId) -> PathBuf {
        self.dir.join(format!("title_{}.html", id))
    }

    pub fn exists(&self, id: &MovieId) -> bool {
        self.path_for(id).is_file()
    }

    /// Write the full page, replacing whatever was stored before
    pub fn save(&self, id: &MovieId, html: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(id);
        fs::write(&path, html)?;
        info!(path = %path.display(), "local file saved");
        Ok(path)
    }

    pub fn load(&self, id: &MovieId) -> Result<RawPage> {
        let path = self.path_for(id);
        if !path.is_file() {
            return Err(Error::NotFound(path));
        }
        let html = fs::read_to_string(&path)?;
        info!(path = %path.display(), "local file loaded");
        Ok(RawPage {
            movie_id: id.clone(),
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load_round_trips() {
        let temp = tempdir().unwrap();
        let store = PageStore::new(temp.path().join("titles"));
        let id = MovieId::from("1077904129");
        let html = "<html>\n  <body>Barbie \u{1F3AC}</body>\n</html>\n";

        assert!(!store.exists(&id));
        let path = store.save(&id, html).unwrap();
        assert_eq!(path, temp.path().join("titles").join("title_1077904129.html"));
        assert!(store.exists(&id));

        let page = store.load(&id).unwrap();
        assert_eq!(page.html, html);
        assert_eq!(page.movie_id, id);
    }

    #[test]
    fn test_save_overwrites() {
        let temp = tempdir().unwrap();
        let store = PageStore::new(temp.path());
        let id = MovieId::from("7");
        store.save(&id, "first version, rather long").unwrap();
        store.save(&id, "second").unwrap();
        assert_eq!(store.load(&id).unwrap().html, "second");
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let temp = tempdir().unwrap();
        let store = PageStore::new(temp.path());
        assert!(matches!(store.load(&MovieId::from("1")), Err(Error::NotFound(_))));
    }
}
