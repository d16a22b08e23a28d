//! Prompt composition
//!
//! Walks a deck's rows in order and joins the selected outputs into the final
//! prompt, along with the two human-readable previews.

use super::library::PromptLibrary;
use crate::model::{Deck, Row, SeedControl, RANDOM_KEY};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

const NO_SELECTIONS: &str = "No selections";
const NO_OUTPUT: &str = "No output";
const EXTRA_PREVIEW_MAX: usize = 120;
const EXTRA_PREVIEW_KEEP: usize = 117;

/// Result of composing one deck
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub prompt: String,
    /// One line per contributing selection
    pub selection_preview: String,
    /// One line per contributing output
    pub output_preview: String,
    /// The seed the random picks were drawn with
    pub seed: u64,
    /// CSV files that could not be read
    pub skipped: Vec<String>,
}

/// The seed used for a run under `control`
pub fn effective_seed(seed: u64, control: SeedControl) -> u64 {
    match control {
        SeedControl::Fixed => seed,
        SeedControl::Increment => seed.wrapping_add(1),
        SeedControl::Decrement => seed.wrapping_sub(1),
        SeedControl::Randomize => rand::random::<u64>(),
    }
}

fn extra_preview_line(text: &str) -> String {
    let first = text.lines().next().unwrap_or(text).trim();
    if first.chars().count() > EXTRA_PREVIEW_MAX {
        let kept: String = first.chars().take(EXTRA_PREVIEW_KEEP).collect();
        format!("{}...", kept)
    } else {
        first.to_string()
    }
}

/// Compose the deck's prompt with the deck's seed settings
pub fn compose(deck: &Deck, library: &mut PromptLibrary) -> Composition {
    let seed = effective_seed(deck.seed, deck.seed_control);
    compose_with_seed(deck, library, seed)
}

pub fn compose_with_seed(deck: &Deck, library: &mut PromptLibrary, seed: u64) -> Composition {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut entries: Vec<_> = deck.rows.entries().iter().collect();
    entries.sort_by_key(|e| (e.order, e.id));

    let mut parts: Vec<String> = Vec::new();
    let mut selections: Vec<String> = Vec::new();
    let mut outputs: Vec<String> = Vec::new();
    let mut skipped = Vec::new();

    for entry in entries {
        match &entry.row {
            Row::Csv(csv) => {
                if csv.file.trim().is_empty() || csv.keys.is_empty() {
                    continue;
                }
                let file = match library.read(&csv.file) {
                    Ok(file) => file,
                    Err(e) => {
                        tracing::warn!(file = %csv.file, "skipping row: {}", e);
                        skipped.push(csv.file.clone());
                        continue;
                    }
                };
                if file.labels.is_empty() {
                    continue;
                }

                for original_key in &csv.keys {
                    let is_random = original_key == RANDOM_KEY;
                    let key = if is_random {
                        match file.labels.choose(&mut rng) {
                            Some(label) => label.as_str(),
                            None => continue,
                        }
                    } else {
                        original_key.as_str()
                    };

                    let Some(out) = file.output(key).map(str::trim) else {
                        continue;
                    };
                    if out.is_empty() {
                        continue;
                    }
                    parts.push(out.to_string());
                    let marker = if is_random { "🔀" } else { "🧾" };
                    selections.push(format!("{} {}", marker, key));
                    outputs.push(format!("💬 {}", out));
                }
            }
            Row::Extra(extra) => {
                let text = extra.text.trim();
                if text.is_empty() {
                    continue;
                }
                parts.push(text.to_string());
                selections.push("📝 Additional prompt".to_string());
                outputs.push(format!("💬 {}", extra_preview_line(text)));
            }
        }
    }

    let separator = if deck.add_comma { ", " } else { " " };
    let body = parts.join(separator).trim().to_string();
    let pre_text = deck.pre_text.trim();

    let mut prompt = match (pre_text.is_empty(), body.is_empty()) {
        (false, false) => format!("{} {}", pre_text, body),
        (false, true) => pre_text.to_string(),
        _ => body,
    };

    if deck.add_comma && !prompt.is_empty() {
        let clean = prompt.trim_end();
        prompt = if clean.ends_with(',') || clean.ends_with('，') {
            clean.to_string()
        } else {
            format!("{},", clean)
        };
    }

    Composition {
        prompt,
        selection_preview: if selections.is_empty() {
            NO_SELECTIONS.to_string()
        } else {
            selections.join("\n")
        },
        output_preview: if outputs.is_empty() {
            NO_OUTPUT.to_string()
        } else {
            outputs.join("\n")
        },
        seed,
        skipped,
    }
}
