use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use log::{debug, error, info, warn};
use serde::Deserialize;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::types::AllowedUpdate;
use teloxide::update_listeners::Polling;
use tokio::sync::Mutex;

mod builder;
mod callback;
mod callback_handlers;
mod checks;
mod helpers;
mod message_handlers;
mod pagination;
mod render;
mod store;
mod transport;
mod vocabulary;


use builder::{BuilderSession, BuilderSessions};
use callback::CallbackAction;
use checks::{AttemptDraft, Check, Origin};
use helpers::*;
use pagination::{fetch_page, Direction, Page, DEFAULT_PAGE_SIZE};
use render::{render, RichText, Segment, SpanStyle};
use store::{CheckStore, SqliteStore};
use transport::{deliver, Button, IncomingCallback, IncomingMessage, Keyboard, Outbound};
use vocabulary::{AttemptResult, CheckType, Difficulty, Skill};

const DEFAULT_POLLING_TIMEOUT_SECS: u64 = 10;
const DEFAULT_UPDATES_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
struct ConfigFile {
    token: String,
    database_path: PathBuf,
    page_size: Option<usize>,
    polling_timeout_seconds: Option<u64>,
    updates_limit: Option<u32>,
}

#[derive(Debug, Clone)]
struct Config {
    token: String,
    database_path: PathBuf,
    page_size: usize,
    polling_timeout_seconds: u64,
    updates_limit: u8,
}

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    config: PathBuf,
}

/// Routes inbound messages and callback presses. The message half lives in
/// `message_handlers`, the callback half in `callback_handlers`.
struct CheckBot<S> {
    store: S,
    sessions: BuilderSessions,
    page_size: usize,
}

impl<S: CheckStore> CheckBot<S> {
    fn new(store: S, page_size: usize) -> Self {
        CheckBot {
            store,
            sessions: BuilderSessions::default(),
            page_size,
        }
    }

    fn first_page(&self, user_id: i64) -> Result<Page> {
        fetch_page(&self.store, user_id, 0, Direction::Older, self.page_size)
    }
}

struct AppState {
    core: Mutex<CheckBot<SqliteStore>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = load_config(&args.config)?;

    let store = SqliteStore::open(&config.database_path)?;
    store.initialize_schema()?;
    info!("database ready at {}", config.database_path.display());

    let state = Arc::new(AppState {
        core: Mutex::new(CheckBot::new(store, config.page_size)),
    });

    let bot = Bot::new(config.token.clone());

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(message_handlers::handle_message))
        .branch(Update::filter_callback_query().endpoint(callback_handlers::handle_callback));

    let listener = Polling::builder(bot.clone())
        .timeout(Duration::from_secs(config.polling_timeout_seconds))
        .limit(config.updates_limit)
        .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery])
        .build();

    info!(
        "polling for updates (timeout {}s, limit {})",
        config.polling_timeout_seconds, config.updates_limit
    );

    // Every update maps to the same key, so they are handled one at a time.
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .distribution_function(|_| Some(()))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("update listener failed"),
        )
        .await;

    Ok(())
}
