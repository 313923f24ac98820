use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use rag::{
    Config, Difficulty, ExamCounts, Generation, GenerationRequest, IngestReport, QuestionType,
    create_exam_for_document, format_bank, format_exam, format_questions, generate_questions,
    ingest_path, list_documents, load_bank, save_questions,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Tabs, Wrap,
};
use tokio::sync::mpsc;
use tracing::{error, info};

const MAX_COUNT: usize = 20;

pub async fn run(cfg: Config) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(Arc::new(cfg));
    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Upload,
    Generate,
    Bank,
    Exam,
}

impl Mode {
    const ALL: [Mode; 4] = [Mode::Upload, Mode::Generate, Mode::Bank, Mode::Exam];

    fn title(self) -> &'static str {
        match self {
            Mode::Upload => "Upload Documents",
            Mode::Generate => "Generate Questions",
            Mode::Bank => "View Question Bank",
            Mode::Exam => "Create Exam",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFocus {
    Context,
    Output,
}

enum Response {
    Ingest {
        results: Vec<(PathBuf, Result<IngestReport, String>)>,
        documents: Vec<String>,
    },
    Generate(Result<Generation, String>),
}

#[derive(Default)]
struct Pane {
    scroll: usize,
    content_len: usize,
    view_height: usize,
    auto_scroll: bool,
}

impl Pane {
    fn max_scroll(&self) -> usize {
        self.content_len.saturating_sub(self.view_height)
    }

    fn sync(&mut self, content_len: usize, view_height: usize) {
        self.content_len = content_len;
        self.view_height = view_height;
        if self.auto_scroll {
            self.scroll = 0;
            self.auto_scroll = false;
        } else if self.scroll > self.max_scroll() {
            self.scroll = self.max_scroll();
        }
    }
}

struct App {
    cfg: Arc<Config>,
    mode: Mode,
    documents: Vec<String>,
    doc_idx: usize,
    difficulty: Difficulty,
    q_type: QuestionType,
    count: usize,
    exam_counts: ExamCounts,
    input: String,
    cursor: usize,
    status: String,
    context_text: Option<String>,
    output_text: Option<String>,
    current: Option<Generation>,
    output_focus: OutputFocus,
    context_pane: Pane,
    output_pane: Pane,
    is_loading: bool,
    spinner_idx: usize,
}

impl App {
    fn new(cfg: Arc<Config>) -> Self {
        let documents = list_documents(&cfg);
        Self {
            cfg,
            mode: Mode::Upload,
            documents,
            doc_idx: 0,
            difficulty: Difficulty::Beginner,
            q_type: QuestionType::Mcq,
            count: 5,
            exam_counts: ExamCounts::default(),
            input: String::new(),
            cursor: 0,
            status: "Ready.".to_string(),
            context_text: None,
            output_text: None,
            current: None,
            output_focus: OutputFocus::Output,
            context_pane: Pane::default(),
            output_pane: Pane::default(),
            is_loading: false,
            spinner_idx: 0,
        }
    }

    fn selected_document(&self) -> Option<&str> {
        self.documents.get(self.doc_idx).map(String::as_str)
    }

    fn accepts_input(&self) -> bool {
        matches!(self.mode, Mode::Upload | Mode::Exam)
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    fn insert_char(&mut self, c: char) {
        let idx = self.byte_index();
        self.input.insert(idx, c);
        self.cursor += 1;
    }

    fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let idx = self.byte_index();
        self.input.remove(idx);
    }

    fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_right(&mut self) {
        if self.cursor < self.input.chars().count() {
            self.cursor += 1;
        }
    }

    fn show(&mut self, context: Option<String>, output: String) {
        self.context_text = context;
        self.output_text = Some(output);
        self.context_pane.auto_scroll = true;
        self.output_pane.auto_scroll = true;
    }

    fn submit(&mut self, tx: mpsc::UnboundedSender<Response>) {
        if self.is_loading {
            return;
        }
        match self.mode {
            Mode::Upload => self.ingest(tx),
            Mode::Generate => self.generate(tx),
            Mode::Bank => self.view_bank(),
            Mode::Exam => self.create_exam(),
        }
    }

    fn ingest(&mut self, tx: mpsc::UnboundedSender<Response>) {
        let path = self.input.trim().to_string();
        if path.is_empty() {
            self.status = "No file uploaded. Type a PDF path or a directory.".to_string();
            return;
        }
        self.is_loading = true;
        self.status = format!("Processing {}...", path);
        let cfg = self.cfg.clone();
        tokio::task::spawn_blocking(move || {
            let results = ingest_path(&cfg, &PathBuf::from(path))
                .into_iter()
                .map(|(file, res)| (file, res.map_err(|e| e.to_string())))
                .collect();
            let documents = list_documents(&cfg);
            let _ = tx.send(Response::Ingest { results, documents });
        });
        self.input.clear();
        self.cursor = 0;
    }

    fn generate(&mut self, tx: mpsc::UnboundedSender<Response>) {
        let Some(document) = self.selected_document().map(str::to_string) else {
            self.status = "Please select a PDF first.".to_string();
            return;
        };
        self.is_loading = true;
        self.status = format!("Generating {} {} questions...", self.count, self.q_type);
        let req = GenerationRequest {
            document,
            difficulty: self.difficulty,
            q_type: self.q_type,
            count: self.count,
        };
        let cfg = self.cfg.clone();
        tokio::task::spawn_blocking(move || {
            let result = generate_questions(&cfg, &req).map_err(|e| e.to_string());
            let _ = tx.send(Response::Generate(result));
        });
    }

    fn save_current(&mut self) {
        let Some(generation) = self.current.take() else {
            self.status = "No questions to save.".to_string();
            return;
        };
        self.status = match save_questions(
            &self.cfg,
            &generation.document,
            &generation.topic,
            generation.difficulty,
            generation.q_type,
            &generation.questions,
        ) {
            Ok(0) => "No questions to save.".to_string(),
            Ok(n) => format!(
                "Saved {} {} questions to {} question bank.",
                n, generation.q_type, generation.document
            ),
            Err(err) => {
                error!("saving questions failed: {}", err);
                self.current = Some(generation);
                format!("Failed to save questions: {}", err)
            }
        };
    }

    fn view_bank(&mut self) {
        let Some(document) = self.selected_document().map(str::to_string) else {
            self.status = "Please select a PDF first.".to_string();
            return;
        };
        let bank = load_bank(&self.cfg, &document);
        self.status = format!("{} saved questions for {}", bank.len(), document);
        self.show(None, format_bank(&document, &bank));
    }

    fn create_exam(&mut self) {
        let Some(document) = self.selected_document().map(str::to_string) else {
            self.status = "Please select a PDF first.".to_string();
            return;
        };
        if !self.input.trim().is_empty() {
            match parse_counts(&self.input) {
                Ok(counts) => self.exam_counts = counts,
                Err(msg) => {
                    self.status = msg;
                    return;
                }
            }
        }
        match create_exam_for_document(&self.cfg, &document, self.difficulty, self.exam_counts) {
            Ok(paper) => {
                let json = serde_json::to_string_pretty(&paper).unwrap_or_default();
                self.status = format!("Created {}", paper.title);
                self.show(Some(json), format_exam(&paper));
            }
            Err(err) => {
                self.status = err.to_string();
                self.show(None, String::new());
            }
        }
    }

    fn handle_response(&mut self, response: Response) {
        self.is_loading = false;
        match response {
            Response::Ingest { results, documents } => {
                self.documents = documents;
                let mut lines = Vec::new();
                for (file, res) in &results {
                    match res {
                        Ok(report) => {
                            lines.push(format!(
                                "Successfully processed and vectorized: {} ({} chunks)",
                                report.document, report.chunks
                            ));
                            if let Some(idx) = self.documents.iter().position(|d| *d == report.document) {
                                self.doc_idx = idx;
                            }
                        }
                        Err(err) => {
                            lines.push(format!("Failed to process document: {}: {}", file.display(), err))
                        }
                    }
                }
                if lines.is_empty() {
                    lines.push("No PDF files found.".to_string());
                }
                self.status = lines.last().cloned().unwrap_or_default();
                self.show(None, lines.join("\n"));
            }
            Response::Generate(Ok(generation)) => {
                info!(count = generation.questions.len(), "questions ready");
                self.status = format!(
                    "Generated {} {} questions",
                    generation.questions.len(),
                    generation.q_type
                );
                let context = generation
                    .context
                    .clone()
                    .unwrap_or_else(|| "(generated without document context)".to_string());
                self.show(
                    Some(context),
                    format_questions(&generation.questions, generation.q_type),
                );
                self.current = Some(generation);
            }
            Response::Generate(Err(err)) => {
                self.status = format!("Error: {}", err);
                self.show(None, String::new());
            }
        }
    }

    fn cycle_document(&mut self) {
        if !self.documents.is_empty() {
            self.doc_idx = (self.doc_idx + 1) % self.documents.len();
        }
    }

    fn focused_pane(&mut self) -> &mut Pane {
        match self.output_focus {
            OutputFocus::Context => &mut self.context_pane,
            OutputFocus::Output => &mut self.output_pane,
        }
    }

    fn scroll_up(&mut self, by: usize) {
        let pane = self.focused_pane();
        pane.scroll = pane.scroll.saturating_sub(by);
    }

    fn scroll_down(&mut self, by: usize) {
        let pane = self.focused_pane();
        pane.scroll = (pane.scroll + by).min(pane.max_scroll());
    }

    fn scroll_to_start(&mut self) {
        self.focused_pane().scroll = 0;
    }

    fn scroll_to_end(&mut self) {
        let pane = self.focused_pane();
        pane.scroll = pane.max_scroll();
    }

    fn page(&mut self) -> usize {
        self.focused_pane().view_height.max(1)
    }
}

/// Parses "mcq tf short long" exam counts.
fn parse_counts(input: &str) -> Result<ExamCounts, String> {
    let nums: Vec<usize> = input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("Invalid exam counts: {}", input.trim()))?;
    match nums.as_slice() {
        [mcq, true_false, short, long] => Ok(ExamCounts {
            mcq: *mcq,
            true_false: *true_false,
            short: *short,
            long: *long,
        }),
        _ => Err("Exam counts need four numbers: mcq true_false short long".to_string()),
    }
}

fn inner_width(area: Rect) -> usize {
    area.width.saturating_sub(2) as usize
}

fn inner_height(area: Rect) -> usize {
    area.height.saturating_sub(2) as usize
}

/// Rows `text` takes once word-wrapped to `width` columns.
fn wrapped_line_count(text: &str, width: usize) -> usize {
    if width == 0 {
        return text.lines().count().max(1);
    }
    text.lines().map(|line| wrapped_rows(line, width)).sum::<usize>().max(1)
}

fn wrapped_rows(line: &str, width: usize) -> usize {
    let mut rows = 1;
    let mut used = 0;
    for (i, word) in line.split(' ').enumerate() {
        let len = word.chars().count();
        let sep = usize::from(i > 0 && used > 0);
        if used + sep + len <= width {
            used += sep + len;
        } else if len <= width {
            rows += 1;
            used = len;
        } else {
            // Words wider than the pane are broken across rows.
            if used > 0 {
                rows += 1;
            }
            let extra = (len - 1) / width;
            rows += extra;
            used = len - extra * width;
        }
    }
    rows
}

fn scroll_offset(scroll: usize) -> u16 {
    u16::try_from(scroll).unwrap_or(u16::MAX)
}

fn view_start(len: usize, cursor: usize, max_width: usize) -> usize {
    if len <= max_width {
        return 0;
    }
    let cursor = cursor.min(len);
    let start = cursor.saturating_sub(max_width / 2);
    start.min(len - max_width)
}

fn truncate_input(input: &str, cursor: usize, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let len = input.chars().count();
    let start = view_start(len, cursor, max_width);
    input.chars().skip(start).take(max_width).collect()
}

fn cursor_x_in_view(input: &str, cursor: usize, max_width: usize) -> usize {
    if max_width == 0 {
        return 0;
    }
    let len = input.chars().count();
    let start = view_start(len, cursor, max_width);
    cursor.min(len).saturating_sub(start).min(max_width)
}

fn draw_ui(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    let spinner = ["|", "/", "-", "\\"];

    terminal.draw(|frame| {
        let title_style = Style::default().fg(Color::Black).add_modifier(Modifier::BOLD);
        let info_border = Style::default().fg(Color::Black);
        let muted = Style::default().fg(Color::DarkGray);
        let info_text_style = Style::default().fg(Color::Blue);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(frame.area());
        let output_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(chunks[2]);

        let tabs = Tabs::new(Mode::ALL.iter().map(|m| m.title()))
            .select(app.mode.index())
            .style(muted)
            .highlight_style(title_style.add_modifier(Modifier::REVERSED))
            .block(Block::bordered().title("AI Question Bank Generator").title_style(title_style));
        frame.render_widget(tabs, chunks[0]);

        let document = app.selected_document().unwrap_or("(none uploaded)");
        let counts = app.exam_counts;
        let selectors = format!(
            "Document: {}  |  Difficulty: {}  |  Type: {}  |  Count: {}  |  Exam: {}/{}/{}/{}",
            document, app.difficulty, app.q_type, app.count,
            counts.mcq, counts.true_false, counts.short, counts.long
        );
        let status_title = if app.is_loading {
            format!("Status {}", spinner[app.spinner_idx])
        } else {
            format!("Status: {}", app.status)
        };
        let selector_bar = Paragraph::new(selectors)
            .style(info_text_style)
            .block(Block::bordered().title(status_title).title_style(title_style).border_style(info_border));
        frame.render_widget(selector_bar, chunks[1]);

        let context_text = app
            .context_text
            .clone()
            .unwrap_or_else(|| "Retrieved passages appear here after generating questions.".to_string());
        let output_text = if app.is_loading {
            "Working...".to_string()
        } else {
            app.output_text.clone().unwrap_or_else(|| match app.mode {
                Mode::Upload => "Type the path of a PDF (or a directory of PDFs) and press Enter.".to_string(),
                Mode::Generate => "Pick a document with F3 and press Enter to generate questions.".to_string(),
                Mode::Bank => "Press Enter to view the selected document's question bank.".to_string(),
                Mode::Exam => "Press Enter to create an exam. Optionally type counts: mcq tf short long.".to_string(),
            })
        };

        let focus_mark = |focus: OutputFocus| if app.output_focus == focus { " *" } else { "" };
        let context_title = match app.mode {
            Mode::Exam => format!("Raw JSON{}", focus_mark(OutputFocus::Context)),
            _ => format!("Context{}", focus_mark(OutputFocus::Context)),
        };
        let output_title = format!("{}{}", app.mode.title(), focus_mark(OutputFocus::Output));

        app.context_pane.sync(
            wrapped_line_count(&context_text, inner_width(output_chunks[0])),
            inner_height(output_chunks[0]),
        );
        app.output_pane.sync(
            wrapped_line_count(&output_text, inner_width(output_chunks[1])),
            inner_height(output_chunks[1]),
        );

        for (text, title, area, pane) in [
            (context_text, context_title, output_chunks[0], &app.context_pane),
            (output_text, output_title, output_chunks[1], &app.output_pane),
        ] {
            let block = Block::bordered()
                .title(title)
                .title_style(title_style)
                .border_style(info_border);
            let paragraph = Paragraph::new(text)
                .style(info_text_style)
                .scroll((scroll_offset(pane.scroll), 0))
                .wrap(Wrap { trim: false })
                .block(block);
            frame.render_widget(paragraph, area);

            let mut scrollbar = ScrollbarState::new(pane.content_len).position(pane.scroll);
            let scrollbar_widget = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .track_style(muted)
                .thumb_style(Style::default().fg(Color::Blue));
            frame.render_stateful_widget(
                scrollbar_widget,
                area.inner(Margin { vertical: 1, horizontal: 0 }),
                &mut scrollbar,
            );
        }

        let input_title = match app.mode {
            Mode::Upload => "PDF path",
            Mode::Exam => "Exam counts (mcq tf short long)",
            Mode::Generate | Mode::Bank => "Input (not used in this tab)",
        };
        let input_block = Block::bordered()
            .title(input_title)
            .title_style(title_style)
            .border_style(muted);
        let width = inner_width(chunks[3]);
        let input = Paragraph::new(truncate_input(&app.input, app.cursor, width))
            .style(muted)
            .block(input_block);
        frame.render_widget(input, chunks[3]);

        if app.accepts_input() {
            let cursor_x = cursor_x_in_view(&app.input, app.cursor, width);
            frame.set_cursor_position((chunks[3].x + 1 + cursor_x as u16, chunks[3].y + 1));
        }

        let help_text = match app.mode {
            Mode::Generate => {
                "Enter/Ctrl+G: Generate | Ctrl+S: Save | F3: Doc | F4: Difficulty | F5: Type | F6/F7: Count | Tab: Next tab | Ctrl+O: Focus | Esc: Quit"
            }
            _ => {
                "Enter: Run | F3: Doc | F4: Difficulty | F5: Type | Tab: Next tab | Ctrl+O: Focus | Up/Down/PgUp/PgDn/Home/End: Scroll | Esc/Ctrl+C: Quit"
            }
        };
        let help = Paragraph::new(help_text)
            .style(muted)
            .wrap(Wrap { trim: true })
            .block(Block::bordered().title("Controls").title_style(title_style).border_style(muted));
        frame.render_widget(help, chunks[4]);
    })?;

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Response>();
    let mut events = EventStream::new();
    let mut spinner_tick = tokio::time::interval(Duration::from_millis(100));
    spinner_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    draw_ui(terminal, app)?;

    loop {
        tokio::select! {
            _ = spinner_tick.tick() => {
                if app.is_loading {
                    app.spinner_idx = (app.spinner_idx + 1) % 4;
                    draw_ui(terminal, app)?;
                }
            }
            maybe_response = rx.recv() => {
                if let Some(response) = maybe_response {
                    app.handle_response(response);
                    draw_ui(terminal, app)?;
                }
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                        match key.code {
                            KeyCode::Char('c') if ctrl => return Ok(()),
                            KeyCode::Esc => return Ok(()),
                            KeyCode::Char('s') if ctrl => app.save_current(),
                            KeyCode::Char('g') if ctrl => {
                                if !app.is_loading {
                                    app.generate(tx.clone());
                                }
                            }
                            KeyCode::Char('o') if ctrl => {
                                app.output_focus = match app.output_focus {
                                    OutputFocus::Context => OutputFocus::Output,
                                    OutputFocus::Output => OutputFocus::Context,
                                };
                            }
                            KeyCode::Enter => app.submit(tx.clone()),
                            KeyCode::Tab => {
                                app.mode = app.mode.next();
                                app.input.clear();
                                app.cursor = 0;
                                app.context_text = None;
                                app.output_text = None;
                            }
                            KeyCode::F(3) => app.cycle_document(),
                            KeyCode::F(4) => app.difficulty = app.difficulty.next(),
                            KeyCode::F(5) => app.q_type = app.q_type.next(),
                            KeyCode::F(6) => app.count = app.count.saturating_sub(1).max(1),
                            KeyCode::F(7) => app.count = (app.count + 1).min(MAX_COUNT),
                            KeyCode::Up => app.scroll_up(1),
                            KeyCode::Down => app.scroll_down(1),
                            KeyCode::PageUp => {
                                let by = app.page();
                                app.scroll_up(by);
                            }
                            KeyCode::PageDown => {
                                let by = app.page();
                                app.scroll_down(by);
                            }
                            KeyCode::Home => app.scroll_to_start(),
                            KeyCode::End => app.scroll_to_end(),
                            KeyCode::Left if app.accepts_input() => app.move_left(),
                            KeyCode::Right if app.accepts_input() => app.move_right(),
                            KeyCode::Backspace if app.accepts_input() => app.delete_char(),
                            KeyCode::Char(ch) if app.accepts_input() => app.insert_char(ch),
                            _ => {}
                        }
                        draw_ui(terminal, app)?;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) => {}
                    None => return Ok(()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_counts_parse_from_four_numbers() {
        assert_eq!(
            parse_counts("4 2, 1 0").unwrap(),
            ExamCounts { mcq: 4, true_false: 2, short: 1, long: 0 }
        );
        assert!(parse_counts("1 2 3").is_err());
        assert!(parse_counts("a b c d").is_err());
    }

    #[test]
    fn input_view_follows_cursor_by_chars() {
        assert_eq!(truncate_input("héllo", 5, 10), "héllo");
        assert_eq!(truncate_input("abcdefghij", 10, 4), "ghij");
        assert_eq!(cursor_x_in_view("abcdefghij", 10, 4), 4);
        assert_eq!(cursor_x_in_view("abc", 1, 10), 1);
    }

    #[test]
    fn modes_cycle_through_all_tabs() {
        let mut mode = Mode::Upload;
        for _ in 0..4 {
            mode = mode.next();
        }
        assert_eq!(mode, Mode::Upload);
        assert_eq!(Mode::Exam.next(), Mode::Upload);
    }

    #[test]
    fn editing_handles_multibyte_input() {
        let mut app = App::new(Arc::new(Config {
            upload_dir: PathBuf::from("/nonexistent/uploads"),
            ..Config::default()
        }));
        for ch in "añb".chars() {
            app.insert_char(ch);
        }
        app.move_left();
        app.delete_char();
        assert_eq!(app.input, "ab");
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn wrapped_rows_follow_pane_width() {
        assert_eq!(wrapped_line_count("", 10), 1);
        assert_eq!(wrapped_line_count("abc def", 3), 2);
        assert_eq!(wrapped_line_count("aaaaaaaaaa", 4), 3);
        assert_eq!(wrapped_line_count("one two three\nfour", 8), 3);
        assert_eq!(wrapped_line_count("one two three\nfour", 0), 2);
    }

    #[test]
    fn long_wrapped_output_can_scroll_to_the_end() {
        let text = "word ".repeat(40);
        let mut pane = Pane::default();
        pane.sync(wrapped_line_count(&text, 20), 5);
        assert_eq!(pane.content_len, 10);
        assert_eq!(pane.max_scroll(), 5);
        pane.scroll = usize::MAX;
        pane.sync(pane.content_len, 5);
        assert_eq!(pane.scroll, 5);
    }

    #[test]
    fn scroll_offset_saturates() {
        assert_eq!(scroll_offset(12), 12);
        assert_eq!(scroll_offset(usize::MAX), u16::MAX);
    }

    #[test]
    fn saving_twice_does_not_duplicate_questions() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = App::new(Arc::new(Config {
            upload_dir: tmp.path().join("uploads"),
            bank_dir: tmp.path().join("banks"),
            ..Config::default()
        }));
        app.current = Some(Generation {
            document: "cells.pdf".to_string(),
            topic: "cells".to_string(),
            difficulty: Difficulty::Beginner,
            q_type: QuestionType::Short,
            context: None,
            questions: vec!["1. What is a cell?".to_string(), "2. What is DNA?".to_string()],
        });

        app.save_current();
        assert_eq!(app.status, "Saved 2 short questions to cells.pdf question bank.");
        app.save_current();
        assert_eq!(app.status, "No questions to save.");
        assert_eq!(load_bank(&app.cfg, "cells.pdf").len(), 2);
    }
}
