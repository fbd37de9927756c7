use super::*;

pub(super) async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> Result<()> {
    let Some(incoming) = IncomingMessage::from_teloxide(&msg) else {
        return Ok(());
    };
    debug!(
        "message {} from user {} in chat {}",
        incoming.message_id, incoming.user_id, incoming.chat_id
    );

    let replies = state.core.lock().await.on_message(&incoming);
    deliver(&bot, replies).await
}

impl<S: CheckStore> CheckBot<S> {
    pub(super) fn on_message(&mut self, msg: &IncomingMessage) -> Vec<Outbound> {
        let Some(cmd) = parse_command(&msg.text) else {
            return self.handle_description(msg);
        };

        // Any command abandons a builder in progress.
        self.sessions.clear(msg.user_id);
        match cmd.to_ascii_lowercase().as_str() {
            "start" | "help" => vec![Outbound::send(
                msg.chat_id,
                build_welcome_view(),
                Vec::new(),
            )],
            "white" => self.handle_new_check_command(msg, CheckType::Retriable),
            "red" => self.handle_new_check_command(msg, CheckType::NonRetriable),
            "top" | "list" => self.handle_list_command(msg),
            other => {
                warn!("unsupported command {:?} from user {}", other, msg.user_id);
                let err = anyhow!("unsupported command {}", other);
                vec![Outbound::send(msg.chat_id, build_error_view(&err), Vec::new())]
            }
        }
    }

    fn handle_new_check_command(&mut self, msg: &IncomingMessage, kind: CheckType) -> Vec<Outbound> {
        self.sessions.begin(msg.user_id, kind);
        let (text, kb) = build_skill_prompt(kind);
        vec![Outbound::send(msg.chat_id, text, kb)]
    }

    fn handle_list_command(&mut self, msg: &IncomingMessage) -> Vec<Outbound> {
        match self.first_page(msg.user_id) {
            Ok(page) => {
                let (text, kb) = build_list_view(&page);
                vec![Outbound::send(msg.chat_id, text, kb)]
            }
            Err(err) => {
                error!("list checks of user {} failed: {:#}", msg.user_id, err);
                vec![Outbound::send(
                    msg.chat_id,
                    build_error_view(&format!("{:#}", err)),
                    Vec::new(),
                )]
            }
        }
    }

    /// Free text completes the user's builder, if one is waiting for it.
    fn handle_description(&mut self, msg: &IncomingMessage) -> Vec<Outbound> {
        let origin = Origin {
            user_id: msg.user_id,
            chat_id: msg.chat_id,
            message_id: msg.message_id,
        };
        let check = match self
            .sessions
            .complete(msg.user_id, &msg.text, origin, msg.received_at)
        {
            None => {
                debug!("ignoring text from user {} without a builder", msg.user_id);
                return Vec::new();
            }
            Some(Err(err)) => {
                warn!("check from user {} rejected: {}", msg.user_id, err);
                return vec![Outbound::send(msg.chat_id, build_error_view(&err), Vec::new())];
            }
            Some(Ok(check)) => check,
        };

        match self.store.create_check(&check) {
            Ok(id) => {
                info!("user {} created check {}", msg.user_id, id);
                let stored = Check { id, ..check };
                vec![Outbound::send(
                    msg.chat_id,
                    build_created_view(&stored),
                    Vec::new(),
                )]
            }
            Err(err) => {
                error!("store check for user {} failed: {:#}", msg.user_id, err);
                vec![Outbound::send(
                    msg.chat_id,
                    build_error_view(&format!("{:#}", err)),
                    Vec::new(),
                )]
            }
        }
    }
}
