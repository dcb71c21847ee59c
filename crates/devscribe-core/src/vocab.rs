//! Default vocabulary for the classification pipeline.
//!
//! These lists are data, not logic: [`crate::ClassifierConfig`] copies them
//! into owned vectors so callers can extend or replace any of them without
//! touching the pipeline stages.

/// Operational chatter. A line containing any of these (case-insensitive) is
/// discarded before any other stage runs. Entries are chosen so that none is
/// a substring of a role marker ("build " and "building", never "build").
pub const NOISE_KEYWORDS: &[&str] = &[
    // package managers / task runners
    "npm",
    "yarn",
    "pnpm",
    "pip install",
    "cargo ",
    "mvn ",
    "gradle",
    // terminal and command execution
    "terminal",
    "command",
    "shell",
    "bash",
    "executing",
    "exited with",
    // build / compile chatter
    "compil",
    "build ",
    "building",
    "built ",
    // generic log vocabulary
    "error",
    "warning",
    "info:",
    "debug:",
    "trace:",
    "exception",
    "stack trace",
    "panicked",
    // tool invocation markers
    "tool call",
    "invoking",
];

/// Explicit role markers, matched case-sensitively anywhere in the line.
pub const BUILDER_MARKERS: &[&str] = &["[Builder]", "Builder:", "[Coder]", "Coder:"];
pub const CHAT_MARKERS: &[&str] = &["[Assistant]", "Assistant:", "[Chat]", "Chat:"];
pub const USER_MARKERS: &[&str] = &["[User]", "User:", "[Me]", "Me:"];

/// Interrogative vocabulary. Presence infers `Speaker::User` for unmarked
/// dialogue.
pub const QUESTION_WORDS: &[&str] = &[
    "how", "what", "why", "when", "where", "which", "怎么", "什么", "为什么", "如何", "吗",
];

/// Request / help / explanation vocabulary. Together with the question words
/// this forms the dialogue-indicating set that admits an unmarked line into
/// implicit inference.
pub const REQUEST_WORDS: &[&str] = &[
    "please", "help", "explain", "show me", "could you", "can you", "would you", "i want",
    "i need", "let me", "请", "帮", "麻烦",
];

/// Implementation vocabulary. Presence infers `Speaker::AgentBuilder` for
/// unmarked dialogue (after the interrogative check).
pub const CODE_WORDS: &[&str] = &[
    "implement",
    "function",
    "class",
    "method",
    "module",
    "refactor",
    "variable",
    "interface",
    "api",
    "创建",
    "实现",
    "函数",
    "重构",
    "代码",
    "接口",
];

/// Trivial status phrases, compared whole-line after trimming and
/// lowercasing.
pub const TRIVIAL_PHRASES: &[&str] = &[
    "ok",
    "okay",
    "yes",
    "no",
    "done",
    "thanks",
    "thank you",
    "thank you very much",
    "good",
    "nice",
    "great",
    "sounds good",
    "lgtm",
    "好的",
    "是的",
    "谢谢",
    "收到",
    "没问题",
];

/// Prefixes that mark a candidate as a command echo.
pub const ECHO_PREFIXES: &[&str] = &["$", ">", "#", "%", "❯", "PS>"];
