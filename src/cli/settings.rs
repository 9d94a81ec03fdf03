use crate::auth::View;
use crate::cli::open_for;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path};

pub fn show() -> Result<()> {
    open_for(View::Settings)?;
    let s = load_settings();
    println!("File:         {}", settings_path().display());
    println!("data_dir      {}", s.data_dir);
    println!("school_name   {}", s.school_name);
    println!("address       {}", s.address);
    println!("phone         {}", s.phone);
    println!("email         {}", s.email);
    println!("currency      {}", s.currency);
    println!("logo_url      {}", s.logo_url);
    println!("classes       {}", s.classes.join(", "));
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    open_for(View::Settings)?;
    let mut s = load_settings();
    s.set(key, value)?;
    save_settings(&s)?;
    println!("Set {key}");
    Ok(())
}
