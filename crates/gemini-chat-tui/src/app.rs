use gemini_chat_core::{
    ClientError, Config, ExchangeController, GeminiClient, GenerateResponse, TextGenerator, Theme,
};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub type ExchangeTask = JoinHandle<Result<GenerateResponse, ClientError>>;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub theme: Theme,

    // Conversation and the request currently in flight
    pub exchange: ExchangeController<GeminiClient>,
    pub exchange_task: Option<ExchangeTask>,
    pub input_cursor: usize, // cursor position in the pending input

    // Transcript viewport
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // API key prompt
    pub show_api_key_input: bool,
    pub api_key_input: String,
    pub api_key_input_cursor: usize,

    pub config: Config,
}

impl App {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = GeminiClient::from_config(&config)?;
        let show_api_key_input = !client.has_api_key();
        let theme = Theme::from_dark_mode(config.dark_mode.unwrap_or(false));

        Ok(Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            theme,

            exchange: ExchangeController::new(client),
            exchange_task: None,
            input_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            show_api_key_input,
            api_key_input: String::new(),
            api_key_input_cursor: 0,

            config,
        })
    }

    pub fn is_busy(&self) -> bool {
        self.exchange.is_busy()
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        tracing::debug!(theme = self.theme.as_str(), "theme toggled");
    }

    /// Send the pending input, if the exchange accepts it
    pub fn submit(&mut self) {
        if self.exchange_task.is_some() {
            return;
        }

        let text = self.exchange.pending_input().to_string();
        let Some(prompt) = self.exchange.begin(&text) else {
            return;
        };
        self.input_cursor = 0;

        // Scroll to bottom so "Bot is typing..." is visible
        self.scroll_to_bottom();

        let generator = self.exchange.generator();
        self.exchange_task = Some(tokio::spawn(async move {
            generator.generate(&prompt).await
        }));
    }

    /// Record the reply once the background request has finished
    pub async fn poll_exchange(&mut self) {
        let finished = self
            .exchange_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.exchange_task.take() {
            let result = match task.await {
                Ok(result) => result,
                Err(join_err) => Err(ClientError::Task(join_err.to_string())),
            };
            self.exchange.complete(result);
            self.scroll_to_bottom();
        }
    }

    /// Use a newly entered API key for the rest of the session and save it
    pub fn apply_api_key(&mut self, key: &str) {
        let key = key.trim();
        if key.is_empty() {
            return;
        }

        self.config.api_key = Some(key.to_string());
        match GeminiClient::from_config(&self.config) {
            Ok(client) => self.exchange.replace_generator(client),
            Err(e) => tracing::error!(error = %e, "failed to rebuild client"),
        }
        if let Err(e) = Config::save_api_key(key) {
            tracing::warn!(error = %e, "failed to save API key");
        }
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.total_chat_lines().saturating_sub(self.visible_chat_height());
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.visible_chat_height() / 2).max(1));
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.visible_chat_height() / 2).max(1));
    }

    /// Scroll chat to bottom so the newest entry is visible
    pub fn scroll_to_bottom(&mut self) {
        let total_lines = self.total_chat_lines();
        let visible_height = self.visible_chat_height();

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        } else {
            self.chat_scroll = 0;
        }
    }

    fn visible_chat_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Estimate how many rows the transcript occupies once wrapped
    fn total_chat_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;

        for entry in self.exchange.conversation().iter() {
            // "You: " / "Bot: " prefix shares the first line
            let text = format!("You: {}", entry.text());
            for line in text.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                total_lines = total_lines.saturating_add(char_count / wrap_width + 1);
            }
            if entry.timestamp().is_some() {
                total_lines = total_lines.saturating_add(1);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        if self.is_busy() {
            total_lines = total_lines.saturating_add(1); // "Bot is typing..."
        }

        // Paragraph scroll offsets are u16
        u16::try_from(total_lines).unwrap_or(u16::MAX)
    }
}
