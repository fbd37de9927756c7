use super::*;

pub(super) const WELCOME_TEXT: &str = "Welcome!\n\
     Create a new /white check (retriable) or a /red check (non-retriable).\n\
     Use /top to browse your checks and record how your attempts went.";
pub(super) const INVALID_REQUEST: &str = "invalid request";
pub(super) const NO_FURTHER_CHECKS: &str = "no further checks";
pub(super) const NO_CHECKS: &str = "You have no checks at the moment";
const SKILLS_PER_ROW: usize = 2;
const CHECKS_PER_ROW: usize = 3;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(super) fn build_welcome_view() -> RichText {
    RichText::plain(WELCOME_TEXT)
}

pub(super) fn build_error_view(err: &dyn std::fmt::Display) -> RichText {
    RichText::plain(format!("update was not handled due to:\n{}", err))
}

pub(super) fn build_skill_prompt(kind: CheckType) -> (RichText, Keyboard) {
    let rows = Skill::ALL
        .chunks(SKILLS_PER_ROW)
        .map(|pair| {
            pair.iter()
                .map(|skill| {
                    let data = CallbackAction::SkillChosen {
                        flow: kind,
                        skill: skill.id(),
                    }
                    .encode();
                    Button::new(skill.name(), data)
                })
                .collect()
        })
        .collect();
    (RichText::plain("select skill:"), rows)
}

pub(super) fn build_difficulty_prompt(flow: CheckType, skill: i64) -> (RichText, Keyboard) {
    let rows = Difficulty::ALL
        .iter()
        .map(|difficulty| {
            let data = CallbackAction::DifficultyChosen {
                flow,
                skill,
                difficulty: difficulty.id(),
            }
            .encode();
            vec![Button::new(difficulty.name(), data)]
        })
        .collect();
    let mut text = RichText::plain("select check difficulty:\n");
    text.push_styled(SpanStyle::Bold, &skill_label(skill));
    (text, rows)
}

pub(super) fn build_description_prompt(session: &BuilderSession) -> RichText {
    let headline = format!(
        "{}/{}",
        skill_label(session.skill.unwrap_or_default()),
        difficulty_label(session.difficulty.unwrap_or_default())
    );
    render(&[
        Segment::Literal("enter description of the check:\n"),
        Segment::Styled(SpanStyle::Bold, &headline),
    ])
}

/// Confirmation sent once a check is stored.
pub(super) fn build_created_view(check: &Check) -> RichText {
    let mut text = RichText::new();
    text.push(&format!("{}:\n", check.kind.name()))
        .push_styled(SpanStyle::Bold, &check.headline())
        .push("\n")
        .push(&check.description)
        .push("\n\nCreated at: ")
        .push(&format_timestamp(check.created_at));
    text
}

pub(super) fn build_list_view(page: &Page) -> (RichText, Keyboard) {
    if page.is_empty() {
        return (RichText::plain(NO_CHECKS), Vec::new());
    }

    let mut text = RichText::new();
    for (index, check) in page.checks.iter().enumerate() {
        if index > 0 {
            text.push("\n\n");
        }
        text.append(build_list_item(index + 1, check));
    }

    let mut rows = Vec::new();
    if page.older.is_some() || page.newer.is_some() {
        rows.push(vec![
            nav_button("⬅️ newer", Direction::Newer, page.newer),
            nav_button("older ➡️", Direction::Older, page.older),
        ]);
    }
    let numbers: Vec<Button> = page
        .checks
        .iter()
        .enumerate()
        .map(|(index, check)| {
            Button::new(
                format!("{}", index + 1),
                CallbackAction::ShowCheck { check_id: check.id }.encode(),
            )
        })
        .collect();
    for chunk in numbers.chunks(CHECKS_PER_ROW) {
        rows.push(chunk.to_vec());
    }

    (text, rows)
}

/// One numbered entry. The type/result marker is struck through once the
/// check is closed; the skill/difficulty line is bold.
pub(super) fn build_list_item(number: usize, check: &Check) -> RichText {
    let mut item = RichText::new();
    item.push(&format!("{}. ", number));
    let marker = list_marker(check);
    if check.closed() {
        item.push_styled(SpanStyle::Strikethrough, &marker);
    } else {
        item.push(&marker);
    }
    item.push("\n")
        .push_styled(SpanStyle::Bold, &check.headline())
        .push("\n")
        .push(&check.description);
    item
}

fn list_marker(check: &Check) -> String {
    match check.latest_result() {
        Some(result) => format!("{} ({})", check.kind.name(), result.name()),
        None => check.kind.name().to_string(),
    }
}

fn nav_button(label: &str, direction: Direction, anchor: Option<i64>) -> Button {
    match anchor {
        Some(anchor) => Button::new(label, CallbackAction::Page { direction, anchor }.encode()),
        None => Button::new("·", CallbackAction::Exhausted.encode()),
    }
}

pub(super) fn build_check_view(check: &Check) -> (RichText, Keyboard) {
    let mut text = RichText::new();
    text.push(&format!("{}:\n", check.kind.name()))
        .push_styled(SpanStyle::Bold, &check.headline())
        .push("\n")
        .push(&check.description)
        .push("\n\nCreated at: ")
        .push(&format_timestamp(check.created_at));

    if check.attempts.is_empty() {
        text.push("\nNo attempts yet");
    } else {
        text.push("\nLast activity: ")
            .push(&format_timestamp(check.activity_at()))
            .push("\nAttempts:");
        for (index, attempt) in check.attempts.iter().enumerate() {
            text.push(&format!(
                "\n{}. {} at {}",
                index + 1,
                attempt.result.name(),
                format_timestamp(attempt.created_at)
            ));
        }
    }

    let mut rows = Vec::new();
    if check.closed() {
        text.push("\n\n").push_styled(SpanStyle::Bold, "closed");
    } else {
        rows.push(
            AttemptResult::ALL
                .iter()
                .map(|result| {
                    Button::new(
                        result.name(),
                        CallbackAction::RecordAttempt {
                            check_id: check.id,
                            result: result.id(),
                        }
                        .encode(),
                    )
                })
                .collect(),
        );
    }
    rows.push(vec![Button::new(
        "⬅️ back",
        CallbackAction::BackToList.encode(),
    )]);

    (text, rows)
}

fn skill_label(skill: i64) -> String {
    Skill::from_id(skill)
        .map(Skill::name)
        .unwrap_or_else(|| format!("skill {}", skill))
}

fn difficulty_label(difficulty: i64) -> String {
    Difficulty::from_id(difficulty)
        .map(|difficulty| difficulty.name().to_string())
        .unwrap_or_else(|| format!("difficulty {}", difficulty))
}

pub(super) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub(super) fn parse_command(text: &str) -> Option<&str> {
    let first = text.split_whitespace().next()?;
    if !first.starts_with('/') {
        return None;
    }
    let cmd = first.trim_start_matches('/');
    Some(cmd.split('@').next().unwrap_or(cmd))
}

pub(super) fn resolve_config_path(path: &Path, config_dir: &Path) -> PathBuf {
    if path.is_relative() {
        config_dir.join(path)
    } else {
        path.to_path_buf()
    }
}

pub(super) fn load_config(path: &Path) -> Result<Config> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let config_file: ConfigFile = toml::from_str(&contents).context("parse config")?;
    let config_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let token = config_file.token.trim().to_string();
    if token.is_empty() {
        return Err(anyhow!("token is empty"));
    }
    let page_size = config_file.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err(anyhow!("page_size must be at least 1"));
    }
    let updates_limit = config_file
        .updates_limit
        .unwrap_or(DEFAULT_UPDATES_LIMIT)
        .clamp(1, 100) as u8;
    Ok(Config {
        token,
        database_path: resolve_config_path(&config_file.database_path, config_dir),
        page_size,
        polling_timeout_seconds: config_file
            .polling_timeout_seconds
            .unwrap_or(DEFAULT_POLLING_TIMEOUT_SECS),
        updates_limit,
    })
}
