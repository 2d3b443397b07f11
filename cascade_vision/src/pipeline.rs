// THEORY:
// The `pipeline` module is the top-level API of the classifier. It strings the
// core modules together into a strict cascade over one decoded image:
//
//   covert channel -> dominant background -> text region -> pattern set
//   -> feature extraction + catalog matcher (with generic synthesis)
//
// The first stage that returns an answer decides the label and nothing after it
// runs. The catalog stage always answers, so the cascade always produces a label.
// A `CascadeClassifier` holds nothing but a shared reference to its domain
// profile; it is `Copy`, carries no mutable state, and the same bytes always
// classify to the same label, category and confidence.

use crate::core_modules::background::BACKGROUND_RATIONALE;
use crate::core_modules::covert_channel::COVERT_CONFIDENCE;
use crate::core_modules::domain::{Domain, DomainProfile};
use crate::core_modules::features::FeatureVector;
use crate::core_modules::matcher::{self, MatchOutcome, SCORE_CAP, SYNTHESIS_CONFIDENCE, SYNTHESIS_RATIONALE};
use crate::core_modules::raster::RasterImage;
use crate::core_modules::result::{Stage, Verdict};
use tracing::{debug, info, warn};

// Re-export key data structures for the public API.
pub use crate::core_modules::result::ClassificationResult;

/// The cascade for one domain.
#[derive(Debug, Clone, Copy)]
pub struct CascadeClassifier {
    profile: &'static DomainProfile,
}

impl CascadeClassifier {
    pub fn new(domain: Domain) -> Self {
        Self { profile: domain.profile() }
    }

    pub fn domain(&self) -> Domain {
        self.profile.domain
    }

    pub fn profile(&self) -> &'static DomainProfile {
        self.profile
    }

    /// Decodes `bytes` and runs the cascade. A decode failure comes back as the
    /// `ERROR` result, never as an `Err`.
    pub fn classify(&self, bytes: &[u8], filename: &str) -> ClassificationResult {
        match RasterImage::decode(bytes) {
            Ok(raster) => self.classify_image(&raster, filename),
            Err(err) => {
                warn!(filename, error = %err, "image decode failed");
                ClassificationResult::error(filename, err)
            }
        }
    }

    pub fn classify_image(&self, raster: &RasterImage, filename: &str) -> ClassificationResult {
        let verdict = self.run_cascade(raster);
        info!(
            filename,
            domain = %self.profile.domain,
            stage = %verdict.stage,
            label = %verdict.label,
            confidence = verdict.confidence,
            "classified"
        );
        verdict.assemble(filename)
    }

    fn run_cascade(&self, raster: &RasterImage) -> Verdict {
        // Stage 1: Covert channel
        if let Some(verdict) = self.covert_stage(raster) {
            return verdict;
        }

        // Stage 2: Dominant background
        if let Some(verdict) = self.background_stage(raster) {
            return verdict;
        }

        // Stage 3: Text region
        if let Some(verdict) = self.text_stage(raster) {
            return verdict;
        }

        // Stage 4: Pattern set
        if let Some(verdict) = self.pattern_stage(raster) {
            return verdict;
        }

        // Stage 5: Features, catalog match and synthesis fallback
        self.catalog_stage(raster)
    }

    fn covert_stage(&self, raster: &RasterImage) -> Option<Verdict> {
        let found = self.profile.covert.decode(raster)?;
        debug!(code = found.code, label = found.entry.label, "covert code decoded");
        Some(Verdict::new(
            Stage::CovertChannel,
            found.entry.label,
            found.entry.category,
            COVERT_CONFIDENCE,
            format!("covert code {}: {}", found.code, found.entry.label),
        ))
    }

    fn background_stage(&self, raster: &RasterImage) -> Option<Verdict> {
        let hit = self.profile.background.detect(raster, self.profile.bank)?;
        debug!(label = hit.label, color = %hit.color, votes = hit.votes, "background vote reached");
        Some(self.detector_verdict(Stage::DominantBackground, hit.label, BACKGROUND_RATIONALE.to_string()))
    }

    fn text_stage(&self, raster: &RasterImage) -> Option<Verdict> {
        let hit = self.profile.text.detect(raster, self.profile.bank)?;
        debug!(label = hit.label, color = %hit.color, dark = hit.dark_pixels, "text region found");
        Some(self.detector_verdict(Stage::TextRegion, hit.label, format!("text region on {}", hit.color)))
    }

    fn pattern_stage(&self, raster: &RasterImage) -> Option<Verdict> {
        let detector = self.profile.patterns.detect(raster)?;
        debug!(pattern = detector.name, label = detector.label, "pattern fired");
        Some(self.detector_verdict(Stage::Pattern, detector.label, format!("pattern: {}", detector.name)))
    }

    /// Detector stages report the catalog entry's own shape and emblem.
    fn detector_verdict(&self, stage: Stage, label: &'static str, rationale: String) -> Verdict {
        let entry = self.profile.catalog.by_label(label);
        Verdict::new(
            stage,
            label,
            self.profile.category_for(label),
            self.profile.detector_confidence,
            rationale,
        )
        .with_shape(entry.map(|e| e.shape.as_str()))
        .with_symbol(entry.and_then(|e| e.emblem))
    }

    fn catalog_stage(&self, raster: &RasterImage) -> Verdict {
        let features = FeatureVector::extract(raster, self.profile.color_region);
        let shape = Some(features.detected_shape().as_str());
        let symbol = features.detected_symbol().map(|s| s.as_str());

        match matcher::resolve(&features, &self.profile.catalog, &self.profile.synthesis) {
            MatchOutcome::Catalog(found) => {
                debug!(label = found.entry.label, score = found.score.total, "catalog match");
                Verdict::new(
                    Stage::CatalogMatch,
                    found.entry.label,
                    found.entry.category,
                    found.score.total.min(SCORE_CAP),
                    format!("catalog match: {}", found.score.reasons()),
                )
                .with_shape(shape)
                .with_symbol(symbol)
            }
            MatchOutcome::Synthesized(entry) => {
                debug!(label = %entry.label, best = ?entry.best_score, "no catalog entry above floor");
                Verdict::new(
                    Stage::GenericSynthesis,
                    entry.label,
                    entry.category,
                    SYNTHESIS_CONFIDENCE,
                    SYNTHESIS_RATIONALE,
                )
                .with_shape(shape)
                .with_symbol(symbol)
            }
        }
    }
}

impl From<Domain> for CascadeClassifier {
    fn from(domain: Domain) -> Self {
        Self::new(domain)
    }
}
