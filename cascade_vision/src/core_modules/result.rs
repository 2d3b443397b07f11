// THEORY:
// Every stage of the cascade that produces an answer hands back a `Verdict`: the label,
// its category, a confidence and a short rationale, tagged with the stage that decided.
// The assembler turns the verdict into the immutable `ClassificationResult` returned to
// callers and stamps it with a creation time. Nothing is retried and nothing downstream
// of the deciding stage runs.
//
// Stamps are monotonic across the process: the wall clock is read, but a stamp never
// repeats or precedes the previous one, even if the system clock steps backwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

pub const ERROR_LABEL: &str = "error";
pub const ERROR_CATEGORY: &str = "ERROR";

static LAST_STAMP_NANOS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Wall-clock time, bumped by one nanosecond past the last stamp when the clock lags.
pub fn monotonic_now() -> DateTime<Utc> {
    let wall = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
    let mut last = LAST_STAMP_NANOS.load(Ordering::Relaxed);
    loop {
        let next = wall.max(last.saturating_add(1));
        match LAST_STAMP_NANOS.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return DateTime::from_timestamp_nanos(next),
            Err(seen) => last = seen,
        }
    }
}

/// The cascade stage that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CovertChannel,
    DominantBackground,
    TextRegion,
    Pattern,
    CatalogMatch,
    GenericSynthesis,
    DecodeError,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::CovertChannel => "covert_channel",
            Stage::DominantBackground => "dominant_background",
            Stage::TextRegion => "text_region",
            Stage::Pattern => "pattern",
            Stage::CatalogMatch => "catalog_match",
            Stage::GenericSynthesis => "generic_synthesis",
            Stage::DecodeError => "decode_error",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage's answer before it is stamped.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub stage: Stage,
    pub label: String,
    pub category: String,
    pub confidence: f64,
    pub rationale: String,
    pub detected_shape: Option<String>,
    pub detected_symbol: Option<String>,
}

impl Verdict {
    pub fn new(
        stage: Stage,
        label: impl Into<String>,
        category: impl Into<String>,
        confidence: f64,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            label: label.into(),
            category: category.into(),
            confidence,
            rationale: rationale.into(),
            detected_shape: None,
            detected_symbol: None,
        }
    }

    pub fn with_shape(mut self, shape: Option<impl Into<String>>) -> Self {
        self.detected_shape = shape.map(Into::into);
        self
    }

    pub fn with_symbol(mut self, symbol: Option<impl Into<String>>) -> Self {
        self.detected_symbol = symbol.map(Into::into);
        self
    }

    pub fn assemble(self, filename: &str) -> ClassificationResult {
        ClassificationResult {
            filename: filename.to_string(),
            label: self.label,
            category: self.category,
            confidence: self.confidence.clamp(0.0, 1.0),
            rationale: self.rationale,
            stage: self.stage,
            detected_shape: self.detected_shape,
            detected_symbol: self.detected_symbol,
            created_at: monotonic_now(),
        }
    }
}

/// The final, immutable answer for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub filename: String,
    pub label: String,
    pub category: String,
    pub confidence: f64,
    pub rationale: String,
    pub stage: Stage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_symbol: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ClassificationResult {
    /// The only failure shape a caller ever sees.
    pub fn error(filename: &str, message: impl fmt::Display) -> Self {
        Verdict::new(Stage::DecodeError, ERROR_LABEL, ERROR_CATEGORY, 0.0, format!("decode failed: {message}"))
            .assemble(filename)
    }

    pub fn is_error(&self) -> bool {
        self.category == ERROR_CATEGORY
    }

    /// Compares everything except the timestamp.
    pub fn same_outcome(&self, other: &ClassificationResult) -> bool {
        self.label == other.label
            && self.category == other.category
            && self.confidence == other.confidence
            && self.stage == other.stage
            && self.rationale == other.rationale
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {:.2} via {} ({})",
            self.filename, self.label, self.category, self.confidence, self.stage, self.rationale
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_result_shape() {
        let result = ClassificationResult::error("broken.png", "unexpected EOF");
        assert_eq!(result.label, "error");
        assert_eq!(result.category, "ERROR");
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.stage, Stage::DecodeError);
        assert!(result.is_error());
    }

    #[test]
    fn confidence_is_clamped() {
        let result = Verdict::new(Stage::Pattern, "x", "Y", 1.7, "pattern").assemble("f");
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn serializes_stage_in_snake_case() {
        let result = Verdict::new(Stage::DominantBackground, "PSG", "Ligue 1", 0.95, "dominant background")
            .with_shape(Some("Circular"))
            .assemble("psg.png");
        let json = serde_json::to_value(&result).expect("serializable");
        assert_eq!(json["stage"], "dominant_background");
        assert_eq!(json["detected_shape"], "Circular");
        assert!(json.get("detected_symbol").is_none());

        let back: ClassificationResult = serde_json::from_value(json).expect("round trip");
        assert!(back.same_outcome(&result));
    }

    #[test]
    fn stamps_strictly_increase() {
        let stamps: Vec<_> = (0..500)
            .map(|i| Verdict::new(Stage::Pattern, "x", "Y", 0.5, format!("run {i}")).assemble("f").created_at)
            .collect();
        assert!(stamps.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn stamps_stay_ordered_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..200).map(|_| monotonic_now()).collect::<Vec<_>>()))
            .collect();
        let mut all = Vec::new();
        for handle in handles {
            let stamps = handle.join().expect("thread finished");
            assert!(stamps.windows(2).all(|pair| pair[0] < pair[1]));
            all.extend(stamps);
        }
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 800);
    }

    #[test]
    fn display_is_one_line() {
        let result = Verdict::new(Stage::CovertChannel, "happy", "HAPPY", 0.98, "covert code 1").assemble("a.png");
        let line = result.to_string();
        assert!(line.starts_with("a.png: happy [HAPPY] 0.98 via covert_channel"));
        assert!(!line.contains('\n'));
    }
}
