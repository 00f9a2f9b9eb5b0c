//! Turns free-form transcripts into [`Intent`]s.
//!
//! Matching is driven by two ordered rule tables. Balance rules are checked
//! before transfer rules, and within each table the first rule that matches
//! wins. Every rule is searched for anywhere in the normalized transcript.

use super::{Amount, Intent, Rejection, parse_amount};

/// Fires when `first` occurs and `then` occurs somewhere after it.
struct BalanceRule {
    first: &'static str,
    then: &'static str,
}

/// Word order of the two captured tokens after the verb.
#[derive(Clone, Copy)]
enum Shape {
    /// `<verb> <amount> to <recipient>`
    AmountToRecipient,
    /// `<verb> <recipient> <amount>`
    RecipientThenAmount,
}

struct TransferRule {
    verb: &'static str,
    shape: Shape,
}

const BALANCE_RULES: &[BalanceRule] = &[
    BalanceRule { first: "check", then: "balance" },
    BalanceRule { first: "what", then: "balance" },
    BalanceRule { first: "my", then: "balance" },
    BalanceRule { first: "balance", then: "check" },
    BalanceRule { first: "show", then: "balance" },
];

const TRANSFER_RULES: &[TransferRule] = &[
    TransferRule { verb: "send", shape: Shape::AmountToRecipient },
    TransferRule { verb: "transfer", shape: Shape::AmountToRecipient },
    TransferRule { verb: "pay", shape: Shape::RecipientThenAmount },
    TransferRule { verb: "give", shape: Shape::RecipientThenAmount },
];

const EXAMPLE_COMMANDS: &[&str] = &[
    "Send 50000 to John",
    "Transfer 25000 to Mary",
    "Check my balance",
    "Pay David 100000",
    "Give Sarah 75000",
];

/// Raw tokens captured by a structural transfer match, before validation.
#[derive(Debug, PartialEq, Eq)]
struct Captures<'a> {
    amount: &'a str,
    recipient: &'a str,
}

/// Stateless command interpreter. Cheap to copy and safe to share across tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandInterpreter;

impl CommandInterpreter {
    pub fn new() -> Self {
        Self
    }

    /// Map a transcript to an intent.
    pub fn interpret(&self, transcript: &str) -> Intent {
        let normalized = normalize(transcript);

        if BALANCE_RULES.iter().any(|rule| rule.matches(&normalized)) {
            return Intent::BalanceInquiry;
        }

        for rule in TRANSFER_RULES {
            if let Some(captures) = rule.find(&normalized) {
                return validate(captures);
            }
        }

        Intent::Rejected(Rejection::CommandNotRecognized)
    }

    /// Whether any rule would structurally match, without validating the
    /// captured amount or recipient. Used for UI hints.
    pub fn can_interpret(&self, transcript: &str) -> bool {
        let normalized = normalize(transcript);
        BALANCE_RULES.iter().any(|rule| rule.matches(&normalized))
            || TRANSFER_RULES.iter().any(|rule| rule.find(&normalized).is_some())
    }

    /// Sample phrases the interpreter understands.
    pub fn example_commands(&self) -> &'static [&'static str] {
        EXAMPLE_COMMANDS
    }
}

fn normalize(transcript: &str) -> String {
    transcript.trim().to_lowercase()
}

fn validate(captures: Captures<'_>) -> Intent {
    let amount: Amount = match parse_amount(captures.amount) {
        Ok(amount) if amount > 0 => amount,
        _ => return Intent::Rejected(Rejection::InvalidAmount),
    };

    let recipient = captures.recipient.trim();
    if recipient.is_empty() {
        return Intent::Rejected(Rejection::MissingRecipient);
    }

    Intent::Transfer {
        amount,
        recipient: capitalize_words(recipient),
    }
}

/// Uppercase the first letter of every word and join with single spaces.
/// The rest of each word keeps its case: "mCdonald" becomes "MCdonald".
pub fn capitalize_words(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

impl BalanceRule {
    fn matches(&self, text: &str) -> bool {
        text.find(self.first)
            .is_some_and(|at| text[at + self.first.len()..].contains(self.then))
    }
}

impl TransferRule {
    /// Leftmost structural match of this rule in `text`.
    fn find<'a>(&self, text: &'a str) -> Option<Captures<'a>> {
        text.match_indices(self.verb).find_map(|(at, _)| {
            let cursor = Cursor::new(text, at + self.verb.len());
            match self.shape {
                Shape::AmountToRecipient => amount_to_recipient(cursor),
                Shape::RecipientThenAmount => recipient_then_amount(cursor),
            }
        })
    }
}

fn is_amount_char(c: char) -> bool {
    c.is_ascii_digit() || c == ','
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c.is_whitespace()
}

/// `\s+ <amount> \s+ to \s+ <name>`
fn amount_to_recipient(mut cursor: Cursor<'_>) -> Option<Captures<'_>> {
    if cursor.eat_while(char::is_whitespace).is_empty() {
        return None;
    }
    let amount = cursor.eat_while(is_amount_char);
    if amount.is_empty() {
        return None;
    }
    if cursor.eat_while(char::is_whitespace).is_empty() || !cursor.eat_literal("to") {
        return None;
    }
    let gap = cursor.eat_while(char::is_whitespace);
    if gap.is_empty() {
        return None;
    }

    let recipient = cursor.eat_while(is_name_char);
    if !recipient.is_empty() {
        return Some(Captures { amount, recipient });
    }
    // A whitespace-only name still matches when the gap can spare a character.
    if gap.chars().count() >= 2 {
        return Some(Captures { amount, recipient: "" });
    }
    None
}

/// `\s+ <name> \s+ <amount>`
fn recipient_then_amount(mut cursor: Cursor<'_>) -> Option<Captures<'_>> {
    let span = cursor.eat_while(is_name_char);
    let amount = cursor.eat_while(is_amount_char);
    if amount.is_empty() {
        return None;
    }

    let leading = span.len() - span.trim_start().len();
    let trailing = span.chars().next_back().filter(|c| c.is_whitespace())?;
    if leading == 0 {
        return None;
    }

    let body = &span[..span.len() - trailing.len_utf8()];
    if body.len() > leading {
        return Some(Captures {
            amount,
            recipient: &body[leading..],
        });
    }
    // Whitespace only: one char each for the two separators and the name.
    if span.chars().count() >= 3 {
        return Some(Captures { amount, recipient: "" });
    }
    None
}

/// Forward-only scanner over a normalized transcript.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, pos: usize) -> Self {
        Self { text, pos }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn eat_literal(&mut self, literal: &str) -> bool {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }
}
