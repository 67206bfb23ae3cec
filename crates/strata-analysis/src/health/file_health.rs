//! Per-file health on a 1..10 scale.
//!
//! Starts at 10 and subtracts fixed penalties for the file's most complex
//! function, nesting, structural membership (cycles, god components), dead
//! exports, co-change spread and knowledge silos. A second pass amplifies penalties for high-churn files
//! relative to the repository's churn distribution.

use serde::{Deserialize, Serialize};

use crate::stats::percentile;

const MAX_HEALTH: f64 = 10.0;
const MIN_HEALTH: f64 = 1.0;

/// Mean indentation times max indentation, in units of 4 spaces (a tab
/// counts as one unit). Blank lines are ignored.
pub fn indentation_complexity(source: &[u8]) -> f64 {
    let text = String::from_utf8_lossy(source);
    let mut total = 0.0;
    let mut max: f64 = 0.0;
    let mut lines = 0usize;
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        let leading = &line[..line.len() - trimmed.len()];
        let tabs = leading.chars().filter(|&c| c == '\t').count();
        let others = leading.chars().count() - tabs;
        let units = tabs as f64 + others as f64 / 4.0;
        total += units;
        max = max.max(units);
        lines += 1;
    }
    if lines == 0 {
        return 0.0;
    }
    ((total / lines as f64) * max * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileHealthInput {
    /// Highest cognitive complexity of any symbol in the file.
    pub max_symbol_complexity: i64,
    pub complexity: f64,
    pub in_cycle: bool,
    pub has_god: bool,
    /// Exported symbols nobody references, over all exported symbols.
    pub dead_export_ratio: f64,
    pub cochange_entropy: f64,
    pub owner_share: f64,
    pub commit_count: i64,
    pub churn: i64,
}

fn base_health(f: &FileHealthInput) -> f64 {
    let mut score = MAX_HEALTH;
    score -= match f.max_symbol_complexity {
        c if c >= 40 => 4.0,
        c if c >= 25 => 3.0,
        c if c >= 15 => 2.0,
        c if c >= 8 => 1.0,
        _ => 0.0,
    };
    score -= match f.complexity {
        c if c > 20.0 => 1.5,
        c if c > 10.0 => 1.0,
        c if c > 5.0 => 0.5,
        _ => 0.0,
    };
    if f.in_cycle {
        score -= 1.5;
    }
    if f.has_god {
        score -= 1.0;
    }
    score -= match f.dead_export_ratio {
        r if r > 0.5 => 1.0,
        r if r > 0.2 => 0.5,
        _ => 0.0,
    };
    score -= match f.cochange_entropy {
        e if e > 0.85 => 1.0,
        e if e > 0.7 => 0.5,
        _ => 0.0,
    };
    if f.owner_share > 0.9 && f.commit_count >= 5 {
        score -= 0.5;
    }
    score.clamp(MIN_HEALTH, MAX_HEALTH)
}

/// Health of every file, in input order.
pub fn file_health_scores(files: &[FileHealthInput]) -> Vec<f64> {
    let churns: Vec<f64> = files.iter().map(|f| f.churn as f64).collect();
    let p50 = percentile(&churns, 50);
    let p90 = percentile(&churns, 90);
    files
        .iter()
        .map(|f| {
            let mut score = base_health(f);
            let churn = f.churn as f64;
            if churn > p90 && score < 6.0 {
                score -= 1.0;
            } else if churn > p50 && score < 5.0 {
                score -= 0.5;
            }
            score.clamp(MIN_HEALTH, MAX_HEALTH)
        })
        .collect()
}
