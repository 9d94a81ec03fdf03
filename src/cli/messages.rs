use comfy_table::{Cell, Table};

use crate::auth::View;
use crate::cli::open_for;
use crate::error::Result;
use crate::models::{MessageMethod, Recipient};
use crate::settings::load_settings;

pub fn send(to: &str, message: &str, method: &str) -> Result<()> {
    let (mut school, _) = open_for(View::Messages)?;
    let recipient: Recipient = to.parse()?;
    let method: MessageMethod = method.parse()?;
    let classes = school.known_classes(&load_settings());
    let m = school.messages.send(recipient, message, method, &classes)?;
    println!("Sent to {} via {}", m.recipient, m.method);
    Ok(())
}

pub fn list() -> Result<()> {
    let (school, _) = open_for(View::Messages)?;
    let mut table = Table::new();
    table.set_header(vec!["Date", "To", "Via", "Status", "Message"]);
    for m in school.messages.all() {
        table.add_row(vec![
            Cell::new(&m.date),
            Cell::new(&m.recipient),
            Cell::new(m.method),
            Cell::new(format!("{:?}", m.status)),
            Cell::new(&m.message),
        ]);
    }
    println!("Messages\n{table}");
    Ok(())
}
