use crate::context::ObserveContext;
use crate::lifecycle::LifecycleEvent;
use crate::record::{Record, RecordBody, Speaker};
use crate::vocab;

/// Keyword lists and thresholds driving the pipeline. All of it is plain
/// data; [`Default`] carries the compiled-in vocabulary from [`vocab`].
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub noise_keywords: Vec<String>,
    pub builder_markers: Vec<String>,
    pub chat_markers: Vec<String>,
    pub user_markers: Vec<String>,
    pub question_words: Vec<String>,
    pub request_words: Vec<String>,
    pub code_words: Vec<String>,
    pub trivial_phrases: Vec<String>,
    pub echo_prefixes: Vec<String>,
    /// Accepted content length bounds, in characters.
    pub min_content_chars: usize,
    pub max_content_chars: usize,
    /// An unmarked line must exceed this to enter implicit inference.
    pub implicit_min_chars: usize,
    /// An unmarked line longer than this, with no stronger signal, is
    /// attributed to the chat agent.
    pub chat_min_chars: usize,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            noise_keywords: owned(vocab::NOISE_KEYWORDS),
            builder_markers: owned(vocab::BUILDER_MARKERS),
            chat_markers: owned(vocab::CHAT_MARKERS),
            user_markers: owned(vocab::USER_MARKERS),
            question_words: owned(vocab::QUESTION_WORDS),
            request_words: owned(vocab::REQUEST_WORDS),
            code_words: owned(vocab::CODE_WORDS),
            trivial_phrases: owned(vocab::TRIVIAL_PHRASES),
            echo_prefixes: owned(vocab::ECHO_PREFIXES),
            min_content_chars: 10,
            max_content_chars: 5000,
            implicit_min_chars: 20,
            chat_min_chars: 100,
        }
    }
}

/// Layered line filter. Each stage is cheap and order matters: noise
/// rejection runs before marker matching so a log line that happens to
/// contain a role word is never misattributed.
#[derive(Debug, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one raw line into a stamped record, or nothing. Never fails:
    /// unmatched and invalid lines are silently dropped.
    pub fn classify(&self, ctx: &ObserveContext, raw_line: &str) -> Option<Record> {
        let (speaker, text) = self.classify_line(raw_line)?;
        Some(ctx.stamp(speaker, RecordBody::dialogue(text)))
    }

    /// Lifecycle events bypass the text pipeline entirely; each maps to a
    /// fixed speaker and message template.
    pub fn record_event(&self, ctx: &ObserveContext, event: &LifecycleEvent) -> Record {
        ctx.stamp(event.speaker(), RecordBody::dialogue(event.message()))
    }

    /// The pure pipeline: noise filter, marker extractor, implicit
    /// inference, content gate. Returns the speaker and the candidate text.
    pub fn classify_line(&self, raw_line: &str) -> Option<(Speaker, String)> {
        let line = raw_line.trim();
        if line.is_empty() {
            return None;
        }
        if self.is_noise(line) {
            return None;
        }

        let (speaker, content) = match self.match_marker(line) {
            Some((speaker, content)) => (speaker, content),
            None => {
                let speaker = self.infer_unmarked(line)?;
                (speaker, line.to_string())
            }
        };

        if !self.accepts_content(&content) {
            return None;
        }

        Some((speaker, content))
    }

    /// Stage 1: operational chatter is dropped outright, regardless of any
    /// marker or dialogue vocabulary further into the line.
    pub fn is_noise(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.config
            .noise_keywords
            .iter()
            .any(|kw| lower.contains(kw.as_str()))
    }

    /// Stage 2: explicit role markers, case-sensitive. The speaker comes
    /// from the marker; the candidate content is whatever follows it.
    pub fn match_marker(&self, line: &str) -> Option<(Speaker, String)> {
        let marker_sets = [
            (&self.config.builder_markers, Speaker::AgentBuilder),
            (&self.config.chat_markers, Speaker::AgentChat),
            (&self.config.user_markers, Speaker::User),
        ];

        for (markers, speaker) in marker_sets {
            for marker in markers {
                if let Some(idx) = line.find(marker.as_str()) {
                    let content = line[idx + marker.len()..].trim().to_string();
                    return Some((speaker, content));
                }
            }
        }

        None
    }

    /// Stage 3: unmarked dialogue. Requires a dialogue-indicating word and a
    /// minimum length; speaker inference precedence is fixed: interrogative
    /// signals, then implementation vocabulary, then sheer length.
    pub fn infer_unmarked(&self, line: &str) -> Option<Speaker> {
        let char_len = line.chars().count();
        if char_len <= self.config.implicit_min_chars {
            return None;
        }

        let lower = line.to_lowercase();
        let conversational = self
            .config
            .question_words
            .iter()
            .chain(self.config.request_words.iter())
            .any(|w| lower.contains(w.as_str()));
        if !conversational {
            return None;
        }

        let interrogative = line.contains('?')
            || line.contains('？')
            || self
                .config
                .question_words
                .iter()
                .any(|w| lower.contains(w.as_str()));
        if interrogative {
            return Some(Speaker::User);
        }

        if self
            .config
            .code_words
            .iter()
            .any(|w| lower.contains(w.as_str()))
        {
            return Some(Speaker::AgentBuilder);
        }

        if char_len > self.config.chat_min_chars {
            return Some(Speaker::AgentChat);
        }

        None
    }

    /// Stage 4: content validity gate, applied to every candidate no matter
    /// which stage produced it.
    pub fn accepts_content(&self, text: &str) -> bool {
        let char_len = text.chars().count();
        if char_len < self.config.min_content_chars || char_len > self.config.max_content_chars {
            return false;
        }
        if is_purely_numeric(text) || is_purely_symbolic(text) {
            return false;
        }

        let lower = text.trim().to_lowercase();
        if self.config.trivial_phrases.iter().any(|p| *p == lower) {
            return false;
        }

        if self.looks_like_echo(text) {
            return false;
        }

        true
    }

    fn looks_like_echo(&self, text: &str) -> bool {
        let trimmed = text.trim_start();
        if self
            .config
            .echo_prefixes
            .iter()
            .any(|p| trimmed.starts_with(p.as_str()))
        {
            return true;
        }
        is_tool_echo(trimmed)
    }
}

/// Digits, separators and sign characters only.
fn is_purely_numeric(text: &str) -> bool {
    let mut seen = false;
    for c in text.chars() {
        if c.is_whitespace() {
            continue;
        }
        if !(c.is_ascii_digit() || matches!(c, '.' | ',' | ':' | '-' | '+' | '%')) {
            return false;
        }
        seen = true;
    }
    seen
}

/// No alphanumeric content at all.
fn is_purely_symbolic(text: &str) -> bool {
    !text.chars().any(|c| c.is_alphanumeric())
}

/// `name(args)` with a bare identifier head reads as a tool-invocation echo
/// rather than prose.
fn is_tool_echo(text: &str) -> bool {
    if !text.ends_with(')') {
        return false;
    }
    let head = match text.find('(') {
        Some(idx) => &text[..idx],
        None => return false,
    };
    !head.is_empty()
        && head
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | ':'))
}
