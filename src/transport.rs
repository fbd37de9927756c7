//! Boundary with Telegram.
//!
//! Handlers see plain [`IncomingMessage`] / [`IncomingCallback`] values and
//! answer with a list of [`Outbound`] actions; [`deliver`] performs them with
//! teloxide in order.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageEntity, MessageId};

use crate::render::{RichText, Span, SpanStyle};

/// Telegram rejects callback answers longer than this.
const MAX_ANSWER_CHARS: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingMessage {
    pub user_id: i64,
    pub chat_id: i64,
    pub message_id: i64,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl IncomingMessage {
    /// `None` for messages without a sender or without text.
    pub fn from_teloxide(msg: &Message) -> Option<Self> {
        let user = msg.from()?;
        let text = msg.text()?;
        Some(IncomingMessage {
            user_id: user.id.0 as i64,
            chat_id: msg.chat.id.0,
            message_id: i64::from(msg.id.0),
            text: text.to_string(),
            received_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingCallback {
    pub id: String,
    pub user_id: i64,
    pub chat_id: i64,
    pub message_id: i64,
    pub data: String,
    pub received_at: DateTime<Utc>,
}

impl IncomingCallback {
    /// `None` when the press is not attached to a chat message.
    pub fn from_teloxide(q: &CallbackQuery) -> Option<Self> {
        let message = q.message.as_ref()?;
        Some(IncomingCallback {
            id: q.id.clone(),
            user_id: q.from.id.0 as i64,
            chat_id: message.chat.id.0,
            message_id: i64::from(message.id.0),
            data: q.data.clone().unwrap_or_default(),
            received_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Button {
            label: label.into(),
            data: data.into(),
        }
    }
}

pub type Keyboard = Vec<Vec<Button>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outbound {
    Send {
        chat_id: i64,
        body: RichText,
        keyboard: Keyboard,
    },
    Edit {
        chat_id: i64,
        message_id: i64,
        body: RichText,
        keyboard: Keyboard,
    },
    Answer {
        callback_id: String,
        text: String,
        alert: bool,
    },
}

impl Outbound {
    pub fn send(chat_id: i64, body: RichText, keyboard: Keyboard) -> Self {
        Outbound::Send {
            chat_id,
            body,
            keyboard,
        }
    }

    pub fn edit(chat_id: i64, message_id: i64, body: RichText, keyboard: Keyboard) -> Self {
        Outbound::Edit {
            chat_id,
            message_id,
            body,
            keyboard,
        }
    }

    pub fn ack(callback_id: &str) -> Self {
        Self::answer(callback_id, "", false)
    }

    pub fn notice(callback_id: &str, text: impl Into<String>) -> Self {
        Self::answer(callback_id, text, false)
    }

    pub fn alert(callback_id: &str, text: impl Into<String>) -> Self {
        Self::answer(callback_id, text, true)
    }

    fn answer(callback_id: &str, text: impl Into<String>, alert: bool) -> Self {
        Outbound::Answer {
            callback_id: callback_id.to_string(),
            text: text.into(),
            alert,
        }
    }
}

pub async fn deliver(bot: &Bot, replies: Vec<Outbound>) -> Result<()> {
    for reply in replies {
        match reply {
            Outbound::Send {
                chat_id,
                body,
                keyboard,
            } => {
                let mut request = bot
                    .send_message(ChatId(chat_id), body.text())
                    .entities(to_entities(body.spans()));
                if !keyboard.is_empty() {
                    request = request.reply_markup(to_markup(&keyboard));
                }
                let sent = request
                    .await
                    .with_context(|| format!("send message to chat {}", chat_id))?;
                debug!(
                    "sent message {} to chat {} ({} utf-16 units)",
                    sent.id.0,
                    chat_id,
                    body.utf16_len()
                );
            }
            Outbound::Edit {
                chat_id,
                message_id,
                body,
                keyboard,
            } => {
                let message_id = i32::try_from(message_id)
                    .with_context(|| format!("message id {} out of range", message_id))?;
                let result = bot
                    .edit_message_text(ChatId(chat_id), MessageId(message_id), body.text())
                    .entities(to_entities(body.spans()))
                    .reply_markup(to_markup(&keyboard))
                    .await;
                match result {
                    Ok(_) => debug!("edited message {} in chat {}", message_id, chat_id),
                    Err(err) if is_message_not_modified_error(&err) => {
                        debug!("message {} in chat {} unchanged", message_id, chat_id)
                    }
                    Err(err) => {
                        return Err(err).with_context(|| {
                            format!("edit message {} in chat {}", message_id, chat_id)
                        });
                    }
                }
            }
            Outbound::Answer {
                callback_id,
                text,
                alert,
            } => {
                let mut request = bot.answer_callback_query(callback_id.clone());
                if !text.is_empty() {
                    request = request.text(truncate_chars(&text, MAX_ANSWER_CHARS));
                }
                if alert {
                    request = request.show_alert(true);
                }
                if let Err(err) = request.await {
                    warn!("answer callback query {} failed: {}", callback_id, err);
                    return Err(err).context("answer callback query");
                }
            }
        }
    }
    Ok(())
}

pub fn to_entities(spans: &[Span]) -> Vec<MessageEntity> {
    spans
        .iter()
        .map(|span| match span.style {
            SpanStyle::Bold => MessageEntity::bold(span.offset, span.length),
            SpanStyle::Strikethrough => MessageEntity::strikethrough(span.offset, span.length),
        })
        .collect()
}

pub fn to_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.data.clone()))
                .collect()
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

fn is_message_not_modified_error(err: &teloxide::RequestError) -> bool {
    err.to_string()
        .to_ascii_lowercase()
        .contains("message is not modified")
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
