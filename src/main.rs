mod app;
mod config;
mod event;
mod session;
mod source;
mod store;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{LevelFilter, error, info, warn};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use app::{App, AppScreen, FeedbackField};
use config::{Config, ConfigPreferences};
use event::{AppEvent, EventHandler};
use session::params::Difficulty;
use session::state::{Phase, SessionError};
use source::categories::category_name;
use source::opentdb::OpenTdbSource;
use store::json_store::FeedbackStore;
use ui::components::feedback_panel::FeedbackPanel;
use ui::components::menu::MenuWidget;
use ui::components::progress_bar::ProgressBar;
use ui::components::question_card::QuestionCard;
use ui::components::status_panel::{QuizStatus, StatusPanel};
use ui::layout::{AppLayout, pack_hint_lines};
use ui::line_input::InputResult;
use ui::theme::Theme;

const LOG_ENV: &str = "QUIZR_LOG";

#[derive(Parser)]
#[command(name = "quizr", version, about = "Terminal trivia quiz")]
struct Cli {
    #[arg(short, long, help = "Start straight into this category id")]
    category: Option<u32>,

    #[arg(short, long, help = "Difficulty (easy, medium, hard)")]
    difficulty: Option<Difficulty>,

    #[arg(short, long, help = "Number of questions per quiz")]
    amount: Option<usize>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,
}

/// The terminal belongs to the UI, so log lines go to a file next to the
/// feedback log. Level comes from `QUIZR_LOG`, defaulting to info.
fn init_logging() {
    let Some(dir) = dirs::data_dir().map(|d| d.join("quizr")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("quizr.log"))
    else {
        return;
    };

    let mut builder = pretty_env_logger::formatted_builder();
    builder
        .filter_level(LevelFilter::Info)
        .target(env_logger::Target::Pipe(Box::new(file)));
    if let Ok(spec) = std::env::var(LOG_ENV) {
        builder.parse_filters(&spec);
    }
    let _ = builder.try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = Config::load().unwrap_or_else(|err| {
        warn!("falling back to default config: {err:#}");
        Config::default()
    });
    if let Some(amount) = cli.amount {
        config.batch_size = amount;
    }
    config.validate(&Theme::available_themes());

    let source = OpenTdbSource::new(
        &config.api_base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let feedback_store = match FeedbackStore::new() {
        Ok(store) => Some(store),
        Err(err) => {
            warn!("feedback will not be saved: {err:#}");
            None
        }
    };

    let events = EventHandler::new(Duration::from_millis(250));
    let mut app = App::new(
        config,
        Box::new(ConfigPreferences::new()),
        Arc::new(source),
        feedback_store,
        events.sender(),
    );

    if let Some(theme_name) = cli.theme {
        match Theme::load(&theme_name) {
            Some(theme) => app.theme = theme,
            None => warn!("unknown theme '{theme_name}', keeping {}", app.theme.name),
        }
    }
    if cli.difficulty.is_some() {
        app.menu.difficulty = cli.difficulty;
    }

    app.launch(cli.category);
    info!("quizr started");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!("quizr stopped: {err:#}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key)?,
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
            AppEvent::BatchFetched(ticket, result) => app.on_batch(ticket, result),
            AppEvent::CategoriesFetched(result) => app.on_categories(result),
            AppEvent::SessionEnded => app.on_session_ended(),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) -> Result<(), SessionError> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return Ok(());
    }

    match app.screen {
        AppScreen::Menu => {
            handle_menu_key(app, key);
            Ok(())
        }
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::Feedback => handle_feedback_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Left => app.cycle_difficulty(false),
        KeyCode::Right | KeyCode::Char('d') => app.cycle_difficulty(true),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Enter => app.start_selected(),
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) -> Result<(), SessionError> {
    match key.code {
        KeyCode::Esc => app.go_to_menu(),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('r') if app.controller.phase() == Phase::Empty => app.reload(),
        KeyCode::Char(ch @ '1'..='9') => {
            let index = ch as usize - '1' as usize;
            app.pick(index)?;
        }
        KeyCode::Up | KeyCode::Char('k') => app.move_pick(false)?,
        KeyCode::Down | KeyCode::Char('j') => app.move_pick(true)?,
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('n') => app.next_question()?,
        _ => {}
    }
    Ok(())
}

fn handle_feedback_key(app: &mut App, key: KeyEvent) -> Result<(), SessionError> {
    let Some(form) = app.feedback.as_mut() else {
        app.go_to_menu();
        return Ok(());
    };

    if key.code == KeyCode::Tab || key.code == KeyCode::BackTab {
        form.toggle_focus();
        return Ok(());
    }

    if form.focus == FeedbackField::Comment {
        match form.comment.handle(key) {
            InputResult::Submit => app.submit_feedback(),
            InputResult::Cancel => form.focus = FeedbackField::Rating,
            InputResult::Continue => {}
        }
        return Ok(());
    }

    match key.code {
        KeyCode::Char(ch @ '1'..='5') => form.set_rating(ch as u8 - b'0'),
        KeyCode::Left | KeyCode::Char('h') => form.adjust_rating(false),
        KeyCode::Right | KeyCode::Char('l') => form.adjust_rating(true),
        KeyCode::Enter => app.submit_feedback(),
        KeyCode::Char('r') => app.retry_same_questions()?,
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        _ => {}
    }
    Ok(())
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = AppLayout::new(area);
    render_header(frame, app, layout.header);

    let hints: &[&str] = match app.screen {
        AppScreen::Menu => {
            render_menu(frame, app, layout.main);
            &["[Up/Down] Category", "[Left/Right] Difficulty", "[Enter] Start", "[t] Theme", "[q] Quit"]
        }
        AppScreen::Quiz => {
            render_quiz(frame, app, layout.main);
            match app.controller.phase() {
                Phase::Empty => &["[r] Retry fetch", "[Esc] Menu"],
                Phase::Active => &["[1-9] Pick", "[Up/Down] Move", "[Enter] Next", "[Esc] Menu"],
                Phase::Loading | Phase::Finished => &["[Esc] Menu"],
            }
        }
        AppScreen::Feedback => {
            render_feedback(frame, app, layout.main);
            &[]
        }
    };
    render_footer(frame, app, layout.footer, hints);
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let info = match app.screen {
        AppScreen::Menu => app.status.clone().unwrap_or_default(),
        AppScreen::Quiz | AppScreen::Feedback => {
            let view = app.controller.view();
            let mut parts = Vec::new();
            if let Some(params) = view.params {
                let name = category_name(&app.menu.categories, params.category)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Category {}", params.category));
                parts.push(name);
                parts.push(
                    params
                        .difficulty
                        .map_or("any difficulty".to_string(), |d| d.to_string()),
                );
            }
            if view.phase == Phase::Active || view.phase == Phase::Finished {
                parts.push(format!("Score {}", view.score));
            }
            parts.join(" | ")
        }
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " quizr ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {info}"),
            Style::default().fg(colors.header_fg()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect, hints: &[&str]) {
    let colors = &app.theme.colors;
    let lines = pack_hint_lines(hints, area.width as usize);
    let Some(first) = lines.into_iter().next() else {
        return;
    };

    // Next stays visible but dimmed until an option is picked.
    let next_disabled = app.screen == AppScreen::Quiz
        && app.controller.phase() == Phase::Active
        && app.controller.view().picked.is_none();
    let spans = match first.find("[Enter] Next") {
        Some(at) if next_disabled => {
            let end = at + "[Enter] Next".len();
            vec![
                Span::styled(first[..at].to_string(), Style::default().fg(colors.muted())),
                Span::styled(
                    first[at..end].to_string(),
                    Style::default()
                        .fg(colors.muted())
                        .add_modifier(Modifier::DIM | Modifier::CROSSED_OUT),
                ),
                Span::styled(first[end..].to_string(), Style::default().fg(colors.muted())),
            ]
        }
        _ => vec![Span::styled(first, Style::default().fg(colors.muted()))],
    };
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_menu(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let menu_area = ui::layout::centered_rect(50, 80, area);
    frame.render_widget(MenuWidget::new(&app.menu, &app.theme), menu_area);
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let view = app.controller.view();
    let status = match view.phase {
        Phase::Loading => Some(QuizStatus::Loading),
        Phase::Empty => Some(QuizStatus::Empty {
            reason: view.empty_reason,
            params: view.params,
        }),
        Phase::Finished => Some(QuizStatus::Finished),
        Phase::Active => None,
    };
    if let Some(status) = status {
        let panel_area = ui::layout::centered_rect(60, 50, area);
        frame.render_widget(StatusPanel::new(status, &app.theme), panel_area);
        return;
    }

    let Some(question) = view.current_question else {
        return;
    };
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    let card = QuestionCard::new(question, view.position + 1, view.picked, &app.theme);
    frame.render_widget(card, main_layout[0]);

    let progress = ProgressBar::new(
        view.position,
        view.total,
        view.progress.unwrap_or(0.0),
        &app.theme,
    );
    frame.render_widget(progress, main_layout[1]);
}

fn render_feedback(frame: &mut ratatui::Frame, app: &App, area: ratatui::layout::Rect) {
    let Some(form) = app.feedback.as_ref() else {
        return;
    };
    let name = form
        .params
        .and_then(|p| category_name(&app.menu.categories, p.category));
    let centered = ui::layout::centered_rect(60, 70, area);
    frame.render_widget(FeedbackPanel::new(form, name, &app.theme), centered);
}
