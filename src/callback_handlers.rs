use super::*;

pub(super) async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<AppState>) -> Result<()> {
    let Some(incoming) = IncomingCallback::from_teloxide(&q) else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    debug!(
        "callback {:?} from user {} on message {} in chat {}",
        incoming.data, incoming.user_id, incoming.message_id, incoming.chat_id
    );

    let replies = state.core.lock().await.on_callback(&incoming);
    deliver(&bot, replies).await
}

impl<S: CheckStore> CheckBot<S> {
    pub(super) fn on_callback(&mut self, q: &IncomingCallback) -> Vec<Outbound> {
        let action = match CallbackAction::parse(&q.data) {
            Ok(action) => action,
            Err(err) => {
                warn!(
                    "rejected callback {:?} from user {}: {}",
                    q.data, q.user_id, err
                );
                return vec![Outbound::alert(&q.id, INVALID_REQUEST)];
            }
        };

        match action {
            CallbackAction::SkillChosen { flow, skill } => {
                let session = if self.has_builder(q.user_id, flow) {
                    self.sessions.set_skill(q.user_id, skill)
                } else {
                    None
                };
                match session {
                    Some(session) => {
                        let (text, kb) = build_difficulty_prompt(session.kind, skill);
                        vec![
                            Outbound::ack(&q.id),
                            Outbound::edit(q.chat_id, q.message_id, text, kb),
                        ]
                    }
                    None => self.stale_builder(q, flow),
                }
            }
            CallbackAction::DifficultyChosen { flow, difficulty, .. } => {
                let session = if self.has_builder(q.user_id, flow) {
                    self.sessions.set_difficulty(q.user_id, difficulty)
                } else {
                    None
                };
                match session {
                    Some(session) => vec![
                        Outbound::ack(&q.id),
                        Outbound::edit(
                            q.chat_id,
                            q.message_id,
                            build_description_prompt(&session),
                            Vec::new(),
                        ),
                    ],
                    None => self.stale_builder(q, flow),
                }
            }
            CallbackAction::ShowCheck { check_id } => self.handle_show_check(q, check_id),
            CallbackAction::Page { direction, anchor } => self.handle_page(q, anchor, direction),
            CallbackAction::BackToList => self.handle_page(q, 0, Direction::Older),
            CallbackAction::RecordAttempt { check_id, result } => {
                self.handle_record_attempt(q, check_id, result)
            }
            CallbackAction::Exhausted => vec![Outbound::notice(&q.id, NO_FURTHER_CHECKS)],
        }
    }

    /// Builder presses only apply to a builder of the same type.
    fn has_builder(&self, user_id: i64, flow: CheckType) -> bool {
        self.sessions
            .get(user_id)
            .map_or(false, |session| session.kind == flow)
    }

    fn stale_builder(&self, q: &IncomingCallback, flow: CheckType) -> Vec<Outbound> {
        warn!(
            "builder press {:?} from user {} without a matching builder",
            q.data, q.user_id
        );
        vec![Outbound::alert(
            &q.id,
            format!(
                "no {} in progress, start one with /{}",
                flow.name().to_lowercase(),
                flow.command()
            ),
        )]
    }

    /// Reads a check owned by the pressing user.
    fn owned_check(&self, q: &IncomingCallback, check_id: i64) -> Result<Check> {
        match self.store.read_check(check_id)? {
            Some(check) if check.origin.user_id == q.user_id => Ok(check),
            _ => Err(anyhow!("check {} not found", check_id)),
        }
    }

    fn handle_show_check(&mut self, q: &IncomingCallback, check_id: i64) -> Vec<Outbound> {
        match self.owned_check(q, check_id) {
            Ok(check) => {
                let (text, kb) = build_check_view(&check);
                vec![
                    Outbound::ack(&q.id),
                    Outbound::edit(q.chat_id, q.message_id, text, kb),
                ]
            }
            Err(err) => {
                warn!("show check for user {} failed: {:#}", q.user_id, err);
                vec![Outbound::alert(&q.id, format!("{:#}", err))]
            }
        }
    }

    fn handle_page(&mut self, q: &IncomingCallback, anchor: i64, direction: Direction) -> Vec<Outbound> {
        match fetch_page(&self.store, q.user_id, anchor, direction, self.page_size) {
            Ok(page) if page.is_empty() && anchor != 0 => {
                vec![Outbound::notice(&q.id, NO_FURTHER_CHECKS)]
            }
            Ok(page) => {
                let (text, kb) = build_list_view(&page);
                vec![
                    Outbound::ack(&q.id),
                    Outbound::edit(q.chat_id, q.message_id, text, kb),
                ]
            }
            Err(err) => {
                error!("list checks of user {} failed: {:#}", q.user_id, err);
                vec![Outbound::alert(&q.id, format!("{:#}", err))]
            }
        }
    }

    fn handle_record_attempt(&mut self, q: &IncomingCallback, check_id: i64, result: i64) -> Vec<Outbound> {
        match self.record_attempt(q, check_id, result) {
            Ok(page) => {
                let (text, kb) = build_list_view(&page);
                vec![
                    Outbound::ack(&q.id),
                    Outbound::edit(q.chat_id, q.message_id, text, kb),
                ]
            }
            Err(err) => {
                warn!(
                    "attempt on check {} by user {} failed: {:#}",
                    check_id, q.user_id, err
                );
                vec![Outbound::alert(&q.id, format!("{:#}", err))]
            }
        }
    }

    /// Stores the attempt and returns the refreshed first list page.
    fn record_attempt(&self, q: &IncomingCallback, check_id: i64, result: i64) -> Result<Page> {
        let attempt = AttemptDraft {
            check_id,
            result,
            chat_id: q.chat_id,
            message_id: q.message_id,
        }
        .validate(q.received_at)?;
        self.owned_check(q, check_id)?.ensure_open()?;
        let attempt_id = self.store.create_attempt(&attempt)?;
        info!(
            "user {} recorded attempt {} ({}) on check {}",
            q.user_id,
            attempt_id,
            attempt.result.name(),
            check_id
        );
        self.first_page(q.user_id)
    }
}
