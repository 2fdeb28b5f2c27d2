use crate::types::report::{
    Explanation, GateListing, GateResult, QualitySummary, RankListing, ScoreReport,
};
use crate::types::scoring::{round_display, LensOutcome};

pub trait ToMarkdown {
    fn to_markdown(&self) -> String;
}

fn score_cell(value: Option<f64>) -> String {
    value
        .map(|score| format!("{:.4}", round_display(score)))
        .unwrap_or_else(|| "n/a".to_string())
}

fn gate_cell(result: &GateResult) -> String {
    if result.passed() {
        "pass".to_string()
    } else {
        format!(
            "fail ({})",
            result
                .blockers
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl ToMarkdown for ScoreReport {
    fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str("# Initiative Score Report\n\n");
        output.push_str(&format!("Snapshot: `{}`\n\n", self.snapshot_version));

        for report in &self.initiatives {
            let initiative = &report.initiative;
            output.push_str(&format!(
                "## {} (#{}, {})\n\n",
                initiative.name, initiative.id, initiative.university
            ));

            output.push_str("| Dimension | Score | Confidence | Seed |\n|---|---|---|---|\n");
            for scored in &report.dimensions {
                output.push_str(&format!(
                    "| {} | {:.4} | {:.4} | {} |\n",
                    scored.dimension,
                    round_display(scored.score),
                    round_display(scored.confidence),
                    score_cell(scored.seed_rating)
                ));
            }
            output.push('\n');
            if let Some(stage) = report.market_validation_stage {
                output.push_str(&format!("Market validation stage: {stage:?}\n\n"));
            }

            output.push_str("Lenses:\n");
            for lens in &report.lenses {
                match &lens.outcome {
                    LensOutcome::Scored { score, confidence } => output.push_str(&format!(
                        "- {}: {:.4} (confidence {:.4})\n",
                        lens.lens,
                        round_display(*score),
                        round_display(*confidence)
                    )),
                    LensOutcome::Unavailable { missing } => output.push_str(&format!(
                        "- {}: unavailable (missing {})\n",
                        lens.lens,
                        missing
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(", ")
                    )),
                }
            }
            output.push('\n');

            output.push_str("Gates:\n");
            for gate in &report.gates {
                output.push_str(&format!(
                    "- {} ({}): {}\n",
                    gate.gate,
                    gate.gate.label(),
                    gate_cell(gate)
                ));
            }
            output.push('\n');

            for warning in &report.warnings {
                output.push_str(&format!("- warning: {}\n", warning.detail));
            }
            if !report.warnings.is_empty() {
                output.push('\n');
            }
        }

        if !self.warnings.is_empty() {
            output.push_str("## Unattributed Warnings\n\n");
            for warning in &self.warnings {
                output.push_str(&format!("- {}\n", warning.detail));
            }
        }
        output
    }
}

impl ToMarkdown for RankListing {
    fn to_markdown(&self) -> String {
        let mut output = format!(
            "# Top {} by {}\n\n{} eligible initiative(s)\n\n",
            self.top_n, self.lens, self.eligible
        );
        let shown = self
            .rows
            .first()
            .map(|row| row.shown.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();

        output.push_str("| Rank | Initiative | University | Score | Confidence |");
        for key in &shown {
            output.push_str(&format!(" {key} |"));
        }
        output.push_str("\n|---|---|---|---|---|");
        output.push_str(&"---|".repeat(shown.len()));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!(
                "| {} | {} (#{}) | {} | {:.4} | {:.4} |",
                row.rank, row.name, row.initiative_id, row.university, row.score, row.confidence
            ));
            for key in &shown {
                output.push_str(&format!(
                    " {} |",
                    score_cell(row.shown.get(key).copied().flatten())
                ));
            }
            output.push('\n');
        }
        output
    }
}

impl ToMarkdown for GateListing {
    fn to_markdown(&self) -> String {
        let mut output = String::from("# Gate Results\n\n| Initiative | A | B | C | D |\n|---|---|---|---|---|\n");
        for initiative in &self.initiatives {
            output.push_str(&format!("| {} (#{}) |", initiative.name, initiative.initiative_id));
            for gate in &initiative.gates {
                output.push_str(&format!(" {} |", gate_cell(gate)));
            }
            output.push('\n');
        }
        output
    }
}

impl ToMarkdown for Explanation {
    fn to_markdown(&self) -> String {
        match self {
            Explanation::NotScored {
                initiative_id,
                dimension,
            } => format!("# {dimension} for #{initiative_id}\n\nnot scored\n"),
            Explanation::Scored {
                initiative_id,
                dimension,
                score,
                confidence,
                entries,
            } => {
                let mut output = format!(
                    "# {dimension} for #{initiative_id}\n\nScore {score:.4}, confidence {confidence:.4}\n\n"
                );
                output.push_str(
                    "| Component | Contribution | Confidence | Provenance |\n|---|---|---|---|\n",
                );
                for entry in entries {
                    output.push_str(&format!(
                        "| {} | {:.4} | {:.4} | {} |\n",
                        entry.component_key,
                        entry.weighted_contribution,
                        entry.confidence,
                        entry.provenance_tag
                    ));
                }
                output
            }
        }
    }
}

impl ToMarkdown for QualitySummary {
    fn to_markdown(&self) -> String {
        let mut output = format!(
            "# Quality Summary\n\nInitiatives: {}\n\nWarnings: {} across {} initiative(s)\n\n",
            self.initiatives, self.warning_count, self.initiatives_with_warnings
        );
        if self.all_gates_zero_pass {
            output.push_str("**No initiative passes any gate.**\n\n");
        }

        output.push_str("## Gates\n\n");
        for gate in &self.gates {
            output.push_str(&format!(
                "- {} ({}): {}/{} passed ({:.1}%)\n",
                gate.gate,
                gate.gate.label(),
                gate.passed,
                gate.evaluated,
                gate.pass_rate * 100.0
            ));
            for blocker in &gate.top_blockers {
                output.push_str(&format!("  - {}: {}\n", blocker.blocker, blocker.count));
            }
        }

        output.push_str("\n## Score Distribution\n\n| Dimension | Scored | Min | Median | Max |\n|---|---|---|---|---|\n");
        for distribution in &self.distributions {
            output.push_str(&format!(
                "| {} | {} | {:.4} | {:.4} | {:.4} |\n",
                distribution.dimension,
                distribution.scored,
                distribution.min,
                distribution.median,
                distribution.max
            ));
        }
        output
    }
}
