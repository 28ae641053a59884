// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The tag scanner and response assembly.
//!
//! Resolution order: `[REASONING]` blocks are extracted first, then `[FILE]`
//! blocks, then the remaining text is scanned for directive tags. Exactly one
//! primary type is chosen by testing tag kinds in the fixed order Delegation,
//! Clarification, Solution, Stuck, Decline; anything else is an Answer.

use std::sync::LazyLock;

use regex::Regex;

use conclave_core::{Persona, PersonaResponse, ResponseType};

use crate::names::resolve_persona;

/// A `[STORE:identifier] content` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreDirective {
    pub identifier: String,
    pub content: String,
}

/// A `[FILE:path] body [/FILE]` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDirective {
    pub path: String,
    pub content: String,
}

/// Full parse result: the structured response plus side-effect directives in
/// document order.
#[derive(Debug, Clone)]
pub struct ParsedResponse {
    pub response: PersonaResponse,
    pub stores: Vec<StoreDirective>,
    pub recalls: Vec<String>,
    pub files: Vec<FileDirective>,
}

static REASONING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\[REASONING\](.*?)\[/REASONING\]").unwrap());

static FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\[FILE:([^\]\n]+)\](.*?)\[/FILE\]").unwrap());

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\[(/?)(REASONING|DELEGATE|CLARIFY|SOLUTION|STUCK|DECLINE|STORE|REMEMBER|FILE)(?::([^\]\n]*))?\]",
    )
    .unwrap()
});

static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// One directive tag found in the scanned text.
#[derive(Debug, Clone)]
struct TagOccurrence {
    start: usize,
    end: usize,
    closing: bool,
    name: String,
    arg: Option<String>,
}

/// Parses raw model output into a structured response.
///
/// Pure and idempotent on the primary type: parsing the `raw_response` of a
/// previous parse yields the same `response_type`. Never fails; text with no
/// recognizable tags (or only malformed ones) becomes an `Answer`.
pub fn parse(raw: &str) -> ParsedResponse {
    let internal_reasoning = extract_reasoning(raw);
    let without_reasoning = REASONING_RE.replace_all(raw, "");

    let mut files = Vec::new();
    for cap in FILE_RE.captures_iter(&without_reasoning) {
        files.push(FileDirective {
            path: cap[1].trim().to_string(),
            content: cap[2].trim().to_string(),
        });
    }
    let text = FILE_RE.replace_all(&without_reasoning, "").into_owned();

    let occurrences = scan_tags(&text);

    let mut stores = Vec::new();
    let mut recalls = Vec::new();
    for (index, occ) in occurrences.iter().enumerate() {
        if occ.closing {
            continue;
        }
        match occ.name.as_str() {
            "STORE" => {
                let identifier = occ.arg.as_deref().unwrap_or("").trim().to_string();
                if !identifier.is_empty() {
                    stores.push(StoreDirective {
                        identifier,
                        content: payload_of(&text, &occurrences, index).trim().to_string(),
                    });
                }
            }
            "REMEMBER" => {
                let identifier = occ.arg.as_deref().unwrap_or("").trim().to_string();
                if !identifier.is_empty() {
                    recalls.push(identifier);
                }
            }
            _ => {}
        }
    }

    let response = build_response(raw, &text, &occurrences, internal_reasoning);

    ParsedResponse {
        response,
        stores,
        recalls,
        files,
    }
}

fn extract_reasoning(raw: &str) -> Option<String> {
    let parts: Vec<String> = REASONING_RE
        .captures_iter(raw)
        .map(|cap| cap[1].trim().to_string())
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

fn scan_tags(text: &str) -> Vec<TagOccurrence> {
    TAG_RE
        .captures_iter(text)
        .map(|cap| {
            let whole = cap.get(0).expect("regex match has group 0");
            TagOccurrence {
                start: whole.start(),
                end: whole.end(),
                closing: !cap[1].is_empty(),
                name: cap[2].to_uppercase(),
                arg: cap.get(3).map(|m| m.as_str().to_string()),
            }
        })
        .collect()
}

/// Text between the end of the tag at `index` and the start of the next tag
/// (or end of input).
fn payload_of<'a>(text: &'a str, occurrences: &[TagOccurrence], index: usize) -> &'a str {
    let start = occurrences[index].end;
    let end = occurrences
        .get(index + 1)
        .map_or(text.len(), |next| next.start);
    &text[start..end]
}

/// Removes every tag token, collapses runs of three or more newlines to two,
/// and trims.
fn clean(text: &str) -> String {
    let stripped = TAG_RE.replace_all(text, "");
    BLANK_RUN_RE.replace_all(&stripped, "\n\n").trim().to_string()
}

fn build_response(
    raw: &str,
    text: &str,
    occurrences: &[TagOccurrence],
    internal_reasoning: Option<String>,
) -> PersonaResponse {
    // Tag kinds are tested in fixed priority order; within a kind the first
    // occurrence by position wins.
    const PRIORITY: [(&str, ResponseType); 5] = [
        ("DELEGATE", ResponseType::Delegation),
        ("CLARIFY", ResponseType::Clarification),
        ("SOLUTION", ResponseType::Solution),
        ("STUCK", ResponseType::Stuck),
        ("DECLINE", ResponseType::Decline),
    ];

    let primary = PRIORITY.iter().find_map(|(name, response_type)| {
        occurrences
            .iter()
            .position(|occ| !occ.closing && occ.name == *name)
            .map(|index| (index, *response_type))
    });

    let Some((index, response_type)) = primary else {
        let mut response = PersonaResponse::answer(raw);
        response.content = clean(text);
        response.internal_reasoning = internal_reasoning;
        return response;
    };

    let occ = &occurrences[index];
    let preceding = clean(&text[..occ.start]);
    let payload = clean(payload_of(text, occurrences, index));

    let content = match response_type {
        // Solution and Stuck keep both halves.
        ResponseType::Solution | ResponseType::Stuck => match (
            preceding.is_empty(),
            payload.is_empty(),
        ) {
            (true, _) => payload.clone(),
            (_, true) => preceding.clone(),
            (false, false) => format!("{preceding}\n\n{payload}"),
        },
        _ => {
            if preceding.is_empty() {
                payload.clone()
            } else {
                preceding.clone()
            }
        }
    };

    let mut delegate_to_persona: Option<Persona> = None;
    let mut delegation_context: Option<String> = None;
    let mut clarification_question: Option<String> = None;

    match response_type {
        ResponseType::Delegation => {
            delegate_to_persona = occ.arg.as_deref().and_then(resolve_persona);
            if !payload.is_empty() {
                delegation_context = Some(payload);
            }
        }
        ResponseType::Clarification => {
            if !payload.is_empty() {
                clarification_question = Some(payload);
            }
        }
        _ => {}
    }

    PersonaResponse {
        response_type,
        content,
        internal_reasoning,
        delegate_to_persona,
        delegation_context,
        clarification_question,
        is_stuck: response_type == ResponseType::Stuck,
        raw_response: raw.to_string(),
    }
}
