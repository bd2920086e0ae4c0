//! Effects Module
//!
//! Media-level effects are processed outside the engine. The engine names the
//! effect, hands the clip's source to an [`EffectProcessor`], and points the
//! clip at whatever comes back.

use serde::{Deserialize, Serialize};

use crate::core::{CoreError, CoreResult, SourceRef, TimeSec};

/// Text burn-in parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextApplyParams {
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_font_color")]
    pub font_color: String,
    /// Box color in `name@alpha` form
    #[serde(default = "default_box_color")]
    pub box_color: String,
    #[serde(default = "default_box_border")]
    pub box_border: u32,
    /// "top", "center" or "bottom"
    #[serde(default = "default_text_position")]
    pub position: String,
}

fn default_font_size() -> u32 {
    64
}

fn default_font_color() -> String {
    "white".to_string()
}

fn default_box_color() -> String {
    "black@0.5".to_string()
}

fn default_box_border() -> u32 {
    20
}

fn default_text_position() -> String {
    "bottom".to_string()
}

impl TextApplyParams {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            font_size: default_font_size(),
            font_color: default_font_color(),
            box_color: default_box_color(),
            box_border: default_box_border(),
            position: default_text_position(),
        }
    }
}

/// Effect to run on a clip's source media
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Effect {
    BackgroundRemoval,
    Captions,
    ColorGrading,
    NoiseReduction,
    SmartTrim,
    AiMusic,
    TextApply(TextApplyParams),
}

impl Effect {
    /// Processor route name understood by the processing backend
    pub fn processor_name(&self) -> &'static str {
        match self {
            Effect::BackgroundRemoval => "bg_remover",
            Effect::Captions => "captions",
            Effect::ColorGrading => "color_grading",
            Effect::NoiseReduction => "noise_reduction",
            Effect::SmartTrim => "smart_trim",
            Effect::AiMusic => "ai_music",
            Effect::TextApply(_) => "text_apply",
        }
    }

    /// Checks parameters before the processor is invoked
    pub fn validate(&self) -> CoreResult<()> {
        if let Effect::TextApply(params) = self {
            if params.text.trim().is_empty() {
                return Err(CoreError::ValidationError(
                    "Text is required for text_apply".to_string(),
                ));
            }
            if params.font_size == 0 {
                return Err(CoreError::ValidationError(
                    "Font size must be > 0".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Media produced by an effect processor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedSource {
    pub source_ref: SourceRef,
    /// Duration of the processed media (seconds)
    pub duration_sec: TimeSec,
}

/// Runs effects on source media
pub trait EffectProcessor {
    fn process(&self, source_ref: &str, effect: &Effect) -> CoreResult<ProcessedSource>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_serialization_is_tagged() {
        let effect = Effect::TextApply(TextApplyParams::new("Hello"));
        let json = serde_json::to_value(&effect).unwrap();

        assert_eq!(json["kind"], "textApply");
        assert_eq!(json["fontSize"], 64);
        assert_eq!(json["position"], "bottom");

        let parsed: Effect = serde_json::from_str(r#"{"kind":"noiseReduction"}"#).unwrap();
        assert_eq!(parsed, Effect::NoiseReduction);
    }

    #[test]
    fn test_text_apply_defaults_from_partial_json() {
        let parsed: Effect = serde_json::from_str(r#"{"kind":"textApply","text":"Hi"}"#).unwrap();
        match parsed {
            Effect::TextApply(params) => {
                assert_eq!(params.box_color, "black@0.5");
                assert_eq!(params.box_border, 20);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_validate_text_apply() {
        assert!(Effect::TextApply(TextApplyParams::new("  ")).validate().is_err());
        assert!(Effect::ColorGrading.validate().is_ok());
        assert_eq!(Effect::BackgroundRemoval.processor_name(), "bg_remover");
    }
}
