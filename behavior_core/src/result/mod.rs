//! The uniform return contract for all dispatch outcomes.
//!
//! Every dispatch call produces a fully-formed [`EventResult`], never an
//! absence value. "No module implemented this event" and "a handler ran
//! but declined" are distinct variants of a sum type, so missing logic can
//! never be confused with "correctly did nothing".

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Sentinel: no attached module implemented the requested event.
///
/// Internal to the dispatch path. The entity-targeted path converts it
/// into a fatal error before returning to the caller; the turn runner
/// uses it to skip non-participating entities.
pub const NO_HANDLER: EventResult = EventResult::NoHandler;

/// Sentinel: handlers were consulted and every one declined, or a turn
/// phase fired with nothing in the world registered for it.
pub const IGNORE_EVENT: EventResult = EventResult::Ignored;

/// The outcome of a dispatch call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventResult {
    /// A handler ran and produced a verdict.
    Responded(Response),

    /// No attached module implemented the event.
    NoHandler,

    /// Handlers ran but every one explicitly declined.
    Ignored,
}

/// The payload of a responding handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Does the triggering action proceed?
    pub allow: bool,

    /// Narrative feedback, consumed by the narration layer.
    pub feedback: Option<String>,

    /// Auxiliary key/value data for downstream consumers.
    pub context: HashMap<String, Value>,

    /// Ordered short strings for optional UI/LLM prompting.
    pub hints: Vec<String>,
}

impl Response {
    /// Create a response with the given verdict and nothing else.
    pub fn new(allow: bool) -> Self {
        Self {
            allow,
            feedback: None,
            context: HashMap::new(),
            hints: Vec::new(),
        }
    }

    /// Set the narrative feedback.
    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    /// Add an auxiliary context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Append a prompting hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

impl From<Response> for EventResult {
    fn from(response: Response) -> Self {
        EventResult::Responded(response)
    }
}

impl EventResult {
    /// A responding result that lets the action proceed.
    pub fn allow() -> Self {
        Response::new(true).into()
    }

    /// A responding result that lets the action proceed, with feedback.
    pub fn allow_with(feedback: impl Into<String>) -> Self {
        Response::new(true).with_feedback(feedback).into()
    }

    /// A responding result that vetoes the action, with feedback.
    pub fn deny(feedback: impl Into<String>) -> Self {
        Response::new(false).with_feedback(feedback).into()
    }

    /// The response payload, if a handler responded.
    pub fn responded(&self) -> Option<&Response> {
        match self {
            EventResult::Responded(response) => Some(response),
            _ => None,
        }
    }

    /// Whether this is the internal no-handler sentinel.
    pub fn is_no_handler(&self) -> bool {
        matches!(self, EventResult::NoHandler)
    }

    /// Whether every consulted handler declined.
    pub fn is_ignored(&self) -> bool {
        matches!(self, EventResult::Ignored)
    }

    /// Whether the triggering action proceeds.
    ///
    /// Declined and unhandled results never veto.
    pub fn allows(&self) -> bool {
        match self {
            EventResult::Responded(response) => response.allow,
            _ => true,
        }
    }

    /// The narrative feedback, if any.
    pub fn feedback(&self) -> Option<&str> {
        self.responded().and_then(|r| r.feedback.as_deref())
    }

    /// Combine results in handler order into one result.
    ///
    /// `allow` is the logical AND of all responding verdicts: any handler
    /// vetoing the action vetoes it overall. Non-empty feedback strings
    /// are newline-joined in order, context maps merge in order (later
    /// entries win per key), and hints concatenate in order. If every
    /// input declined, the combined result is [`IGNORE_EVENT`] - feedback
    /// is never fabricated.
    pub fn combine(results: impl IntoIterator<Item = EventResult>) -> EventResult {
        let mut saw_response = false;
        let mut allow = true;
        let mut feedback: Vec<String> = Vec::new();
        let mut context: HashMap<String, Value> = HashMap::new();
        let mut hints: Vec<String> = Vec::new();

        for result in results {
            if let EventResult::Responded(response) = result {
                saw_response = true;
                allow = allow && response.allow;
                if let Some(text) = response.feedback {
                    if !text.is_empty() {
                        feedback.push(text);
                    }
                }
                context.extend(response.context);
                hints.extend(response.hints);
            }
        }

        if !saw_response {
            return IGNORE_EVENT;
        }

        EventResult::Responded(Response {
            allow,
            feedback: if feedback.is_empty() {
                None
            } else {
                Some(feedback.join("\n"))
            },
            context,
            hints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_distinct() {
        assert_ne!(NO_HANDLER, IGNORE_EVENT);
        assert!(NO_HANDLER.is_no_handler());
        assert!(IGNORE_EVENT.is_ignored());
        assert!(EventResult::allow().responded().is_some());
    }

    #[test]
    fn test_allows_semantics() {
        assert!(EventResult::allow().allows());
        assert!(!EventResult::deny("no").allows());
        assert!(IGNORE_EVENT.allows());
        assert!(NO_HANDLER.allows());
    }

    #[test]
    fn test_combine_ands_verdicts_and_joins_feedback() {
        let combined = EventResult::combine(vec![
            EventResult::allow_with("scratched"),
            EventResult::deny("but the armor holds"),
        ]);

        let response = combined.responded().expect("responded");
        assert!(!response.allow);
        assert_eq!(
            response.feedback.as_deref(),
            Some("scratched\nbut the armor holds")
        );
    }

    #[test]
    fn test_combine_skips_empty_feedback() {
        let combined = EventResult::combine(vec![
            EventResult::allow(),
            EventResult::allow_with("the door creaks open"),
            Response::new(true).with_feedback("").into(),
        ]);

        assert_eq!(combined.feedback(), Some("the door creaks open"));
        assert!(combined.allows());
    }

    #[test]
    fn test_combine_of_declines_is_ignored() {
        let combined = EventResult::combine(vec![IGNORE_EVENT, IGNORE_EVENT]);
        assert_eq!(combined, IGNORE_EVENT);
    }

    #[test]
    fn test_combine_of_nothing_is_ignored() {
        assert_eq!(EventResult::combine(Vec::new()), IGNORE_EVENT);
    }

    #[test]
    fn test_combine_mixed_ignores_declines() {
        let combined = EventResult::combine(vec![
            IGNORE_EVENT,
            EventResult::allow_with("only one voice"),
        ]);

        assert!(combined.allows());
        assert_eq!(combined.feedback(), Some("only one voice"));
    }

    #[test]
    fn test_combine_merges_context_and_hints_in_order() {
        let first: EventResult = Response::new(true)
            .with_context("damage", 3)
            .with_context("kind", "fire")
            .with_hint("describe the flames")
            .into();
        let second: EventResult = Response::new(true)
            .with_context("damage", 5)
            .with_hint("mention the smell of smoke")
            .into();

        let combined = EventResult::combine(vec![first, second]);
        let response = combined.responded().expect("responded");

        assert_eq!(response.context.get("damage"), Some(&Value::from(5)));
        assert_eq!(response.context.get("kind"), Some(&Value::from("fire")));
        assert_eq!(
            response.hints,
            vec!["describe the flames", "mention the smell of smoke"]
        );
    }
}
