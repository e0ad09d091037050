// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Answer key parsing for `--answer-key`.

use smartgrader_core::option_index;

/// Correct option index for each question, in question order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerKey(pub Vec<usize>);

/// Parse a key written as letters (`A,B,C`, `a b c`, or `ABC`) or as
/// zero-based indices (`0,1,2`). Separators are commas and/or whitespace;
/// letters and numbers may be mixed.
pub fn parse_answer_key(raw: &str) -> Result<AnswerKey, String> {
    let tokens: Vec<&str> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Err("answer key is empty".into());
    }

    // A single run of letters is one answer per letter.
    if let [word] = tokens.as_slice() {
        if word.len() > 1 && word.chars().all(|c| c.is_ascii_alphabetic()) {
            return word.chars().map(parse_letter).collect::<Result<_, _>>().map(AnswerKey);
        }
    }

    tokens
        .iter()
        .map(|token| parse_token(token))
        .collect::<Result<_, _>>()
        .map(AnswerKey)
}

fn parse_token(token: &str) -> Result<usize, String> {
    if let Ok(index) = token.parse::<usize>() {
        return Ok(index);
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) => parse_letter(letter),
        _ => Err(format!(
            "'{token}' is not an option letter (A-Z) or a zero-based index"
        )),
    }
}

fn parse_letter(letter: char) -> Result<usize, String> {
    option_index(letter).ok_or_else(|| format!("'{letter}' is not an option letter (A-Z)"))
}

impl AnswerKey {
    /// First option index the grid cannot hold, with its question number.
    pub fn out_of_range(&self, num_options: u32) -> Option<(usize, usize)> {
        self.0
            .iter()
            .copied()
            .enumerate()
            .find(|&(_, option)| option >= num_options as usize)
    }
}
