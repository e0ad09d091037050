// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Name extraction from recognized header text.

use smartgrader_core::NameHint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    First,
    Last,
    /// A bare "Name" label: a first name, or a full name to split.
    Either,
}

/// Header labels, longest first so "First name" is never read as "Name".
/// The sheets are printed in English or Romanian ("Nume" is the family
/// name, "Prenume" the given name).
const LABELS: &[(&str, Field)] = &[
    ("family name", Field::Last),
    ("first name", Field::First),
    ("given name", Field::First),
    ("last name", Field::Last),
    ("prenume", Field::First),
    ("surname", Field::Last),
    ("nume", Field::Last),
    ("name", Field::Either),
];

/// Pull first and last name out of OCR text.
///
/// 1. Lines starting with a known label contribute the words after it.
///    A label with nothing after it takes the next unlabeled line.
/// 2. If no last name was labeled and a bare "Name" value has two or more
///    words, it is split into first name + last name.
pub fn parse_name_hint(text: &str) -> NameHint {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let mut first: Option<Vec<String>> = None;
    let mut last: Option<Vec<String>> = None;
    let mut either: Option<Vec<String>> = None;

    for (i, line) in lines.iter().enumerate() {
        let Some((field, rest)) = split_label(line) else {
            continue;
        };

        let mut words = clean_words(rest);
        if words.is_empty() {
            if let Some(next) = lines.get(i + 1).filter(|l| split_label(l).is_none()) {
                words = clean_words(next);
            }
        }
        if words.is_empty() {
            continue;
        }

        let slot = match field {
            Field::First => &mut first,
            Field::Last => &mut last,
            Field::Either => &mut either,
        };
        slot.get_or_insert(words);
    }

    if let Some(words) = either {
        if last.is_none() && first.is_none() && words.len() >= 2 {
            first = Some(words[..1].to_vec());
            last = Some(words[1..].to_vec());
        } else if first.is_none() {
            first = Some(words);
        }
    }

    NameHint {
        first_name: first.map(|w| w.join(" ")),
        last_name: last.map(|w| w.join(" ")),
    }
}

/// Match a label at the start of `line`, returning the text after it.
fn split_label(line: &str) -> Option<(Field, &str)> {
    LABELS.iter().find_map(|&(label, field)| {
        let head = line.get(..label.len())?;
        if !head.eq_ignore_ascii_case(label) {
            return None;
        }
        let rest = &line[label.len()..];
        // The label must end at a word boundary ("Names" is not "Name").
        match rest.chars().next() {
            None => Some((field, rest)),
            Some(c) if c.is_alphanumeric() => None,
            Some(_) => Some((field, rest)),
        }
    })
}

/// Words of a handwritten value, with underscores, colons, and stray
/// punctuation removed. Hyphens and apostrophes inside a word survive.
fn clean_words(value: &str) -> Vec<String> {
    value
        .split(|c: char| c.is_whitespace() || matches!(c, '_' | ':' | '|' | ',' | ';'))
        .map(|token| token.trim_matches(|c: char| !c.is_alphabetic()))
        .filter(|token| token.chars().any(char::is_alphabetic))
        .map(str::to_string)
        .collect()
}
