//! Form state and the validated session input built from it.

use crate::catalog::CUSTOM_OBJECT;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, EnumString};

pub const MIN_LOAD: u8 = 1;
pub const MAX_LOAD: u8 = 5;
pub const DEFAULT_LOAD: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, EnumIter, Serialize, Deserialize)]
pub enum Timeframe {
    #[strum(ascii_case_insensitive, to_string = "Actual", serialize = "current")]
    #[serde(rename = "Actual")]
    Current,

    #[strum(ascii_case_insensitive, to_string = "Recuerdo", serialize = "memory")]
    #[serde(rename = "Recuerdo")]
    Memory,
}

impl Timeframe {
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Current => "Situación Actual",
            Timeframe::Memory => "Recuerdo (Pasado)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, EnumIter, Serialize, Deserialize)]
pub enum Frequency {
    #[strum(ascii_case_insensitive, to_string = "Repetitivos", serialize = "repetitive")]
    #[serde(rename = "Repetitivos")]
    Repetitive,

    #[strum(
        ascii_case_insensitive,
        to_string = "Poco Frecuentes",
        serialize = "poco-frecuentes",
        serialize = "infrequent"
    )]
    #[serde(rename = "Poco Frecuentes")]
    Infrequent,
}

impl Frequency {
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Repetitive => "Repetitivos (Alta)",
            Frequency::Infrequent => "Poco Frecuentes (Baja)",
        }
    }
}

/// Sensory channel of a submodality parameter. Declaration order is the
/// order parameters are listed in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumString,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum SubmodalityKind {
    #[strum(ascii_case_insensitive)]
    Visual,
    #[strum(ascii_case_insensitive)]
    Auditivo,
    #[strum(ascii_case_insensitive, to_string = "Kinestésico", serialize = "kinestesico")]
    #[serde(rename = "Kinestésico")]
    Kinestesico,
    #[strum(ascii_case_insensitive)]
    Olfativo,
    #[strum(ascii_case_insensitive)]
    Gustativo,
}

/// Free-text submodality entries. Blank values are kept in the map but
/// ignored everywhere they are read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmodalityParams(BTreeMap<SubmodalityKind, String>);

impl SubmodalityParams {
    pub fn set(&mut self, kind: SubmodalityKind, value: impl Into<String>) {
        self.0.insert(kind, value.into());
    }

    pub fn get(&self, kind: SubmodalityKind) -> Option<&str> {
        self.0
            .get(&kind)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Non-blank entries, trimmed, in kind order.
    pub fn entries(&self) -> impl Iterator<Item = (SubmodalityKind, &str)> {
        self.0
            .iter()
            .map(|(k, v)| (*k, v.trim()))
            .filter(|(_, v)| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// `"Visual: verde suave • Auditivo: silencio"`; empty when nothing was entered.
    pub fn format(&self) -> String {
        self.entries()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join(" • ")
    }
}

/// Display label for an emotional load level.
pub fn load_label(load: u8) -> &'static str {
    if load > 3 {
        "Alta"
    } else if load > 1 {
        "Media"
    } else {
        "Baja"
    }
}

/// Validated, immutable input of one generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInput {
    pub situation_text: String,
    pub emotional_load: u8,
    pub selected_emotions: Vec<String>,
    pub representative_object: String,
    pub timeframe: Timeframe,
    pub frequency: Frequency,
    #[serde(default)]
    pub submodality_params: SubmodalityParams,
}

impl SessionInput {
    pub fn primary_emotion(&self) -> &str {
        self.selected_emotions
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn emotions_joined(&self) -> String {
        self.selected_emotions.join(", ")
    }
}

/// Mutable form state. Turned into a [`SessionInput`] by [`SessionDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDraft {
    pub situation: String,
    pub emotional_load: u8,
    pub selected_emotions: Vec<String>,
    pub selected_object: String,
    pub custom_object: String,
    pub timeframe: Option<Timeframe>,
    pub frequency: Option<Frequency>,
    pub params: SubmodalityParams,
}

impl Default for SessionDraft {
    fn default() -> Self {
        Self {
            situation: String::new(),
            emotional_load: DEFAULT_LOAD,
            selected_emotions: Vec::new(),
            selected_object: String::new(),
            custom_object: String::new(),
            timeframe: None,
            frequency: None,
            params: SubmodalityParams::default(),
        }
    }
}

impl SessionDraft {
    /// Selects the emotion, or deselects it if already selected. Selection
    /// order is preserved; the first selected emotion is the primary one.
    pub fn toggle_emotion(&mut self, id: &str) {
        if let Some(pos) = self.selected_emotions.iter().position(|e| e == id) {
            self.selected_emotions.remove(pos);
        } else {
            self.selected_emotions.push(id.to_string());
        }
    }

    pub fn select_object(&mut self, object: &str) {
        self.selected_object = object.to_string();
        if object != CUSTOM_OBJECT {
            self.custom_object.clear();
        }
    }

    pub fn final_object(&self) -> &str {
        if self.selected_object == CUSTOM_OBJECT {
            &self.custom_object
        } else {
            &self.selected_object
        }
    }

    pub fn validate(&self) -> Result<SessionInput, ValidationError> {
        let situation = self.situation.trim();
        if situation.is_empty() {
            return Err(ValidationError::MissingSituation);
        }
        if self.selected_emotions.is_empty() {
            return Err(ValidationError::MissingEmotion);
        }
        let timeframe = self.timeframe.ok_or(ValidationError::MissingTimeframe)?;
        let object = self.final_object().trim();
        if object.is_empty() {
            return Err(ValidationError::MissingObject);
        }
        if !(MIN_LOAD..=MAX_LOAD).contains(&self.emotional_load) {
            return Err(ValidationError::LoadOutOfRange(self.emotional_load));
        }
        let frequency = self.frequency.ok_or(ValidationError::MissingFrequency)?;

        Ok(SessionInput {
            situation_text: situation.to_string(),
            emotional_load: self.emotional_load,
            selected_emotions: self.selected_emotions.clone(),
            representative_object: object.to_string(),
            timeframe,
            frequency,
            submodality_params: self.params.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn complete_draft() -> SessionDraft {
        let mut draft = SessionDraft {
            situation: "  Perdí mi trabajo ".to_string(),
            emotional_load: 4,
            timeframe: Some(Timeframe::Current),
            frequency: Some(Frequency::Repetitive),
            ..Default::default()
        };
        draft.toggle_emotion("Miedo");
        draft.select_object("Reloj");
        draft
    }

    #[test]
    fn complete_draft_validates_and_trims() {
        let input = complete_draft().validate().unwrap();
        assert_eq!(input.situation_text, "Perdí mi trabajo");
        assert_eq!(input.representative_object, "Reloj");
        assert_eq!(input.primary_emotion(), "Miedo");
    }

    #[test]
    fn each_missing_field_is_reported_in_form_order() {
        let mut draft = complete_draft();
        draft.situation = "   ".into();
        assert_eq!(draft.validate(), Err(ValidationError::MissingSituation));

        let mut draft = complete_draft();
        draft.selected_emotions.clear();
        assert_eq!(draft.validate(), Err(ValidationError::MissingEmotion));

        let mut draft = complete_draft();
        draft.timeframe = None;
        assert_eq!(draft.validate(), Err(ValidationError::MissingTimeframe));

        let mut draft = complete_draft();
        draft.select_object("");
        assert_eq!(draft.validate(), Err(ValidationError::MissingObject));

        let mut draft = complete_draft();
        draft.emotional_load = 9;
        assert_eq!(draft.validate(), Err(ValidationError::LoadOutOfRange(9)));

        let mut draft = complete_draft();
        draft.frequency = None;
        assert_eq!(draft.validate(), Err(ValidationError::MissingFrequency));
    }

    #[test]
    fn empty_draft_reports_situation_first() {
        assert_eq!(
            SessionDraft::default().validate(),
            Err(ValidationError::MissingSituation)
        );
    }

    #[test]
    fn custom_object_replaces_selection() {
        let mut draft = complete_draft();
        draft.select_object(CUSTOM_OBJECT);
        assert_eq!(draft.validate(), Err(ValidationError::MissingObject));

        draft.custom_object = "Un reloj oxidado".into();
        assert_eq!(draft.validate().unwrap().representative_object, "Un reloj oxidado");

        draft.select_object("Flor");
        assert!(draft.custom_object.is_empty());
    }

    #[test]
    fn toggling_preserves_selection_order() {
        let mut draft = SessionDraft::default();
        draft.toggle_emotion("Rabia");
        draft.toggle_emotion("Miedo");
        draft.toggle_emotion("Culpa");
        draft.toggle_emotion("Rabia");
        assert_eq!(draft.selected_emotions, vec!["Miedo", "Culpa"]);
    }

    #[test]
    fn params_skip_blank_entries_and_keep_kind_order() {
        let mut params = SubmodalityParams::default();
        params.set(SubmodalityKind::Olfativo, "  ");
        params.set(SubmodalityKind::Auditivo, " silencio ");
        params.set(SubmodalityKind::Visual, "verde suave");
        assert_eq!(params.format(), "Visual: verde suave • Auditivo: silencio");
        assert_eq!(params.get(SubmodalityKind::Olfativo), None);

        let mut blank = SubmodalityParams::default();
        blank.set(SubmodalityKind::Gustativo, "");
        assert!(blank.is_empty());
        assert_eq!(blank.format(), "");
    }

    #[test]
    fn enums_parse_from_form_values_and_cli_spellings() {
        assert_eq!(Timeframe::from_str("Recuerdo").unwrap(), Timeframe::Memory);
        assert_eq!(Timeframe::from_str("actual").unwrap(), Timeframe::Current);
        assert_eq!(Frequency::from_str("Poco Frecuentes").unwrap(), Frequency::Infrequent);
        assert_eq!(Frequency::from_str("poco-frecuentes").unwrap(), Frequency::Infrequent);
        assert_eq!(Frequency::from_str("REPETITIVOS").unwrap(), Frequency::Repetitive);
        assert_eq!(SubmodalityKind::from_str("kinestesico").unwrap(), SubmodalityKind::Kinestesico);
        assert_eq!(Frequency::Infrequent.to_string(), "Poco Frecuentes");
    }

    #[test]
    fn load_labels() {
        assert_eq!(load_label(1), "Baja");
        assert_eq!(load_label(3), "Media");
        assert_eq!(load_label(4), "Alta");
    }

    #[test]
    fn input_serializes_with_form_values() {
        let input = complete_draft().validate().unwrap();
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["timeframe"], "Actual");
        assert_eq!(json["frequency"], "Repetitivos");
    }
}
