use std::path::PathBuf;
use std::rc::Rc;

use crate::db::{SqliteStorage, DB_FILE};
use crate::error::Result;
use crate::school::School;
use crate::settings::{load_settings, save_settings, settings_path, shellexpand_path};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    std::fs::create_dir_all(&resolved)?;
    std::fs::create_dir_all(resolved.join("exports"))?;

    // Opening every store writes its seed list on first run.
    let storage = Rc::new(SqliteStorage::open(&resolved.join(DB_FILE))?);
    let school = School::open(storage)?;

    println!("Initialized dugsi at {}", resolved.display());
    println!("Settings:  {}", settings_path().display());
    println!("Students:  {}", school.students.all().len());
    println!();
    println!("Next: dugsi login --email admin@dugsiga.com");
    Ok(())
}
