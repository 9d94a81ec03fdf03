use colored::Colorize;

use crate::auth::Session;
use crate::error::Result;
use crate::school::open_storage;
use crate::settings::get_data_dir;

fn session() -> Result<Session> {
    Ok(Session::new(open_storage(&get_data_dir())?))
}

pub fn login(email: &str, password: Option<String>) -> Result<()> {
    let session = session()?;
    let password = match password {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ")?,
    };
    let user = session.login(email, password)?;
    println!("Logged in as {} ({})", user.name.bold(), user.role);
    Ok(())
}

pub fn logout() -> Result<()> {
    match session()?.logout()? {
        Some(user) => println!("Logged out {}", user.email),
        None => println!("Not logged in."),
    }
    Ok(())
}

pub fn whoami() -> Result<()> {
    match session()?.current_user()? {
        Some(user) => {
            println!("Name:   {}", user.name);
            println!("Email:  {}", user.email);
            println!("Role:   {}", user.role);
            if let Some(id) = &user.student_id {
                println!("Student ID: {id}");
            }
            if let Some(class) = &user.class_id {
                println!("Class:  {class}");
            }
        }
        None => println!("Not logged in."),
    }
    Ok(())
}
