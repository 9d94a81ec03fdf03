use std::rc::Rc;

use tracing::info;

use crate::db::Storage;
use crate::error::{DugsiError, Result};
use crate::models::{Message, MessageMethod, MessageStatus, Recipient};
use crate::store::{next_numeric_id, Collection, Subscribers};

pub const MESSAGES_KEY: &str = "messages";

fn seed_messages() -> Vec<Message> {
    vec![
        Message {
            id: 1,
            recipient: Recipient::AllParents,
            message: "School will be closed tomorrow due to heavy rain.".to_string(),
            date: "2023-10-25".to_string(),
            status: MessageStatus::Delivered,
            method: MessageMethod::Sms,
        },
        Message {
            id: 2,
            recipient: Recipient::ClassParents("Form 4".to_string()),
            message: "Exam results are now available.".to_string(),
            date: "2023-11-01".to_string(),
            status: MessageStatus::Delivered,
            method: MessageMethod::WhatsApp,
        },
    ]
}

/// Outgoing notices to parents and staff, newest first.
pub struct MessageLog {
    messages: Collection<Message>,
}

impl MessageLog {
    pub fn load(storage: Rc<dyn Storage>, subscribers: Rc<Subscribers>) -> Result<Self> {
        let messages = Collection::load(MESSAGES_KEY, storage, subscribers, seed_messages)?;
        Ok(Self { messages })
    }

    pub fn all(&self) -> &[Message] {
        self.messages.items()
    }

    /// Class recipients must name one of `classes`. Nothing is delivered;
    /// the message is logged as Sent with today's date.
    pub fn send(
        &mut self,
        recipient: Recipient,
        text: &str,
        method: MessageMethod,
        classes: &[String],
    ) -> Result<Message> {
        if let Recipient::ClassParents(class) = &recipient {
            if !classes.iter().any(|c| c == class) {
                return Err(DugsiError::InvalidClass(class.clone()));
            }
        }
        if text.trim().is_empty() {
            return Err(DugsiError::Other("Message text is empty".to_string()));
        }
        let message = Message {
            id: next_numeric_id(self.messages.items().iter().map(|m| m.id)),
            recipient,
            message: text.to_string(),
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            status: MessageStatus::Sent,
            method,
        };
        let sent = message.clone();
        self.messages.update(|list| list.insert(0, message))?;
        info!(id = sent.id, recipient = %sent.recipient, method = %sent.method, "message sent");
        Ok(sent)
    }
}
