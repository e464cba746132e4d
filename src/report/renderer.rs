//! Text rendering of the ranked picks.
//!
//! Output is a pure function of the pick list, the period date and the
//! config: same input, same bytes. Blocks are separated by a blank line,
//! which is also where [`split_message`] prefers to cut.

use chrono::NaiveDate;

use crate::data::models::Sport;
use crate::edge::converter::EdgeLabel;
use crate::edge::ranker::PickList;
use crate::edge::selector::Candidate;

pub const BLOCK_SEPARATOR: &str = "\n\n";

pub const NO_VALUE_MESSAGE: &str = "⛔ No high-value picks found for this period.";
pub const FALLBACK_NOTICE: &str = "⚠️ No high-value picks; showing best available.";
pub const DISCLAIMER: &str =
    "⚠️ Model estimates, not guarantees. Bet responsibly and only what you can afford to lose.";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub title: String,
    /// Maximum characters per delivered message.
    pub chunk_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "📊 Daily Picks".to_string(),
            chunk_limit: 4096,
        }
    }
}

fn format_edge(edge: Option<f64>, label: EdgeLabel) -> String {
    match edge {
        Some(e) => format!("{:+.1}% ({label})", e * 100.0),
        None => format!("N/A ({label})"),
    }
}

fn format_odds(candidate: &Candidate) -> String {
    match candidate.decimal_odds {
        Some(d) => format!(
            "{d:.2} ({})",
            candidate.american_odds().unwrap_or_else(|| "N/A".to_string())
        ),
        None => "N/A".to_string(),
    }
}

fn format_note(candidate: &Candidate) -> String {
    match (candidate.expected_total, candidate.sport()) {
        (Some(t), Sport::Football) => format!("{} · xG total {t:.2}", candidate.note),
        (Some(t), Sport::Baseball) => format!("{} · exp. runs {t:.1}", candidate.note),
        (None, _) => candidate.note.to_string(),
    }
}

/// One block per pick.
pub fn render_candidate(rank: usize, candidate: &Candidate) -> String {
    let event = &candidate.event;
    [
        format!("#{rank} {} · {}", candidate.sport().tag(), event.league),
        format!("🕒 {}", event.starts_at.format("%d/%m %H:%M")),
        format!("🏟️ {}", event.matchup()),
        format!("🎯 {}", candidate.description()),
        format!("💰 Odds: {}", format_odds(candidate)),
        format!("📈 Edge: {}", format_edge(candidate.edge(), candidate.label())),
        format!("📝 {}", format_note(candidate)),
    ]
    .join("\n")
}

/// Combined decimal odds of a parlay: the product of every leg's odds.
pub fn combo_odds(legs: &[Candidate]) -> Option<f64> {
    legs.iter()
        .map(|c| c.decimal_odds)
        .try_fold(1.0, |acc, d| d.map(|d| acc * d))
}

pub fn render_combo(legs: &[Candidate]) -> String {
    let mut lines = vec![format!("🔗 Combo ({} legs)", legs.len())];
    for leg in legs {
        lines.push(format!(
            "• {}: {} @ {}",
            leg.event.matchup(),
            leg.description(),
            leg.decimal_odds
                .map(|d| format!("{d:.2}"))
                .unwrap_or_else(|| "N/A".to_string())
        ));
    }
    if let Some(total) = combo_odds(legs) {
        lines.push(format!("Combined odds: {total:.2}"));
    }
    lines.join("\n")
}

fn header(config: &ReportConfig, period: NaiveDate) -> String {
    format!("{} – {}", config.title, period.format("%Y-%m-%d"))
}

/// Full report: header, ranked blocks, optional combo, disclaimer.
pub fn render_report(list: &PickList, period: NaiveDate, config: &ReportConfig) -> String {
    let mut blocks = vec![header(config, period)];

    if list.is_empty() {
        if list.fallback_notice {
            blocks.push(FALLBACK_NOTICE.to_string());
        }
        blocks.push(NO_VALUE_MESSAGE.to_string());
    } else {
        blocks.extend(
            list.picks
                .iter()
                .enumerate()
                .map(|(i, c)| render_candidate(i + 1, c)),
        );
        if !list.combo.is_empty() {
            blocks.push(render_combo(&list.combo));
        }
    }

    blocks.push(DISCLAIMER.to_string());
    blocks.join(BLOCK_SEPARATOR)
}

/// Short form for the preview and recheck modes: count plus the top pick.
pub fn render_summary(
    list: &PickList,
    period: NaiveDate,
    heading: &str,
    config: &ReportConfig,
) -> String {
    let mut lines = vec![format!("{} – {heading}", header(config, period))];

    match list.best() {
        Some(top) => {
            let count = list.picks.len();
            let noun = if count == 1 { "pick" } else { "picks" };
            lines.push(format!("✅ {count} {noun} with a price"));
            lines.push(format!(
                "⭐ Top: {} – {} @ {} | edge {}",
                top.event.matchup(),
                top.description(),
                format_odds(top),
                format_edge(top.edge(), top.label())
            ));
            if !list.combo.is_empty() {
                lines.push(format!("🔗 Combo available ({} legs)", list.combo.len()));
            }
        }
        None => {
            if list.fallback_notice {
                lines.push(FALLBACK_NOTICE.to_string());
            }
            lines.push(NO_VALUE_MESSAGE.to_string());
        }
    }

    [lines.join("\n"), DISCLAIMER.to_string()].join(BLOCK_SEPARATOR)
}

/// Message length as Telegram counts it: UTF-16 code units, so most
/// emoji count twice.
pub fn message_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Byte index of the longest prefix of `text` within `limit` UTF-16 units.
/// Never zero for non-empty text, so splitting always makes progress.
fn hard_cut(text: &str, limit: usize) -> usize {
    let mut units = 0;
    for (i, c) in text.char_indices() {
        units += c.len_utf16();
        if units > limit {
            return if i == 0 { c.len_utf8() } else { i };
        }
    }
    text.len()
}

/// Split a message into chunks of at most `limit` units (see [`message_len`]).
///
/// Cuts at the last block separator inside the window, else the last line
/// break, else at the limit itself. Concatenating the chunks gives back the
/// original text.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while message_len(rest) > limit {
        let hard = hard_cut(rest, limit);
        let window = &rest[..hard];
        let cut = window
            .rfind(BLOCK_SEPARATOR)
            .map(|i| i + BLOCK_SEPARATOR.len())
            .or_else(|| window.rfind('\n').map(|i| i + 1))
            .unwrap_or(hard);

        chunks.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }

    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

// =============================================================================
// Tests
// =============================================================================
