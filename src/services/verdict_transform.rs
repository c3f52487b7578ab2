//! Verdict aggregation
//!
//! **[FCE-VT-010]** Pure transform from a list of per-claim verdicts into
//! a 0-100 credibility score, one aggregate label, and per-label counts.
//! No I/O, no side effects; identical inputs (in any claim order) produce
//! identical outputs.
//!
//! Score formula: floor of the confidence-weighted mean of per-claim
//! baseline scores, weight = reported confidence (1.0 when absent),
//! clamped to [0, 100]. Worked reference: claims FALSE@0.8 + TRUE@0.6
//! give (9*0.8 + 95*0.6) / 1.4 = 45.857 → 45.

use std::collections::BTreeMap;

use crate::models::{ClaimResult, ClaimVerdict, Verdict};

/// Neutral score used for empty claim lists and degraded (ERROR/TIMEOUT)
/// terminal rows
pub const NEUTRAL_SCORE: i64 = 50;

/// Aggregated transform output
#[derive(Debug, Clone, PartialEq)]
pub struct VerdictSummary {
    /// Credibility score, always within [0, 100]
    pub score: i64,
    /// Aggregate verdict label
    pub verdict: Verdict,
    /// Occurrences of each claim-level label
    pub counts: BTreeMap<ClaimVerdict, i64>,
}

impl VerdictSummary {
    pub fn claims_analyzed(&self) -> i64 {
        self.counts.values().sum()
    }

    /// TRUE + MOSTLY_TRUE
    pub fn claims_true(&self) -> i64 {
        self.count(ClaimVerdict::True) + self.count(ClaimVerdict::MostlyTrue)
    }

    /// FALSE + MOSTLY_FALSE + MISINFORMATION
    pub fn claims_false(&self) -> i64 {
        self.count(ClaimVerdict::False)
            + self.count(ClaimVerdict::MostlyFalse)
            + self.count(ClaimVerdict::Misinformation)
    }

    pub fn claims_misleading(&self) -> i64 {
        self.count(ClaimVerdict::Misleading)
    }

    /// UNVERIFIED + MIXED
    pub fn claims_unverified(&self) -> i64 {
        self.count(ClaimVerdict::Unverified) + self.count(ClaimVerdict::Mixed)
    }

    fn count(&self, label: ClaimVerdict) -> i64 {
        self.counts.get(&label).copied().unwrap_or(0)
    }
}

/// Baseline credibility score for a single claim verdict
fn baseline_score(verdict: ClaimVerdict) -> f64 {
    match verdict {
        ClaimVerdict::True => 95.0,
        ClaimVerdict::MostlyTrue => 85.0,
        ClaimVerdict::Mixed => 50.0,
        ClaimVerdict::MostlyFalse => 25.0,
        ClaimVerdict::False => 9.0,
        ClaimVerdict::Misleading => 20.0,
        ClaimVerdict::Misinformation => 0.0,
        ClaimVerdict::Unverified => 50.0,
    }
}

/// Severity rank for tie-breaking only (higher = more severe).
/// Never used for scoring.
fn severity(verdict: ClaimVerdict) -> u8 {
    match verdict {
        ClaimVerdict::Misinformation => 7,
        ClaimVerdict::False => 6,
        ClaimVerdict::MostlyFalse => 5,
        ClaimVerdict::Misleading => 4,
        ClaimVerdict::Mixed => 3,
        ClaimVerdict::Unverified => 2,
        ClaimVerdict::MostlyTrue => 1,
        ClaimVerdict::True => 0,
    }
}

/// Aggregate a claim list into score, verdict label, and counts
///
/// **[FCE-VT-010]** Empty claim list is the documented "service returned
/// nothing usable" edge case: UNVERIFIED at the neutral score, all counts
/// zero. Not an error.
pub fn summarize_claims(claims: &[ClaimResult]) -> VerdictSummary {
    if claims.is_empty() {
        return VerdictSummary {
            score: NEUTRAL_SCORE,
            verdict: Verdict::Unverified,
            counts: BTreeMap::new(),
        };
    }

    let mut counts: BTreeMap<ClaimVerdict, i64> = BTreeMap::new();
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for claim in claims {
        *counts.entry(claim.verdict).or_insert(0) += 1;
        let weight = claim.confidence.unwrap_or(1.0);
        weighted_sum += baseline_score(claim.verdict) * weight;
        weight_total += weight;
    }

    // All-zero confidences degenerate to an unweighted mean
    let mean = if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        claims
            .iter()
            .map(|c| baseline_score(c.verdict))
            .sum::<f64>()
            / claims.len() as f64
    };
    let score = (mean.floor() as i64).clamp(0, 100);

    VerdictSummary {
        score,
        verdict: aggregate_label(&counts).as_verdict(),
        counts,
    }
}

/// Pick the aggregate label from per-label counts
///
/// Weakest-link policy: any FALSE or MISINFORMATION claim dominates
/// regardless of count. Otherwise plurality wins, ties broken toward the
/// more severe label.
fn aggregate_label(counts: &BTreeMap<ClaimVerdict, i64>) -> ClaimVerdict {
    if counts.contains_key(&ClaimVerdict::Misinformation) {
        return ClaimVerdict::Misinformation;
    }
    if counts.contains_key(&ClaimVerdict::False) {
        return ClaimVerdict::False;
    }

    counts
        .iter()
        .max_by(|(label_a, count_a), (label_b, count_b)| {
            count_a
                .cmp(count_b)
                .then(severity(**label_a).cmp(&severity(**label_b)))
        })
        .map(|(label, _)| *label)
        .unwrap_or(ClaimVerdict::Unverified)
}
