use crate::db::{SqliteStorage, DB_FILE};
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join(DB_FILE);

    println!("School:     {}", settings.school_name);
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `dugsi init` to set up.");
        return Ok(());
    }

    let size = std::fs::metadata(&db_path)?.len();
    println!("DB size:    {}", format_bytes(size));

    let storage = SqliteStorage::open(&db_path)?;
    println!();
    for (key, len, updated) in storage.keys()? {
        println!("{key:<12} {:>10}   {updated}", format_bytes(len as u64));
    }
    Ok(())
}
