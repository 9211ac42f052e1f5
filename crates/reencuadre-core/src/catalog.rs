//! Static option tables for the reframing form.
//!
//! Every emotion is tied to the Stoic virtue it is reframed towards; the
//! remaining tables hold the fixed choices offered for the representative
//! object.

use serde::Serialize;

/// An emotion the user can select, with the virtue used to frame it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmotionEntry {
    pub id: &'static str,
    pub display_label: &'static str,
    pub color_tag: &'static str,
    pub virtue: &'static str,
}

pub const EMOTIONS: &[EmotionEntry] = &[
    EmotionEntry {
        id: "Miedo",
        display_label: "Miedo",
        color_tag: "red",
        virtue: "Coraje",
    },
    EmotionEntry {
        id: "Ansiedad",
        display_label: "Ansiedad",
        color_tag: "orange",
        virtue: "Serenidad",
    },
    EmotionEntry {
        id: "Rabia",
        display_label: "Rabia",
        color_tag: "yellow",
        virtue: "Templanza",
    },
    EmotionEntry {
        id: "Tristeza",
        display_label: "Tristeza",
        color_tag: "blue",
        virtue: "Aceptación",
    },
    EmotionEntry {
        id: "Frustración",
        display_label: "Frustración",
        color_tag: "purple",
        virtue: "Diligencia",
    },
    EmotionEntry {
        id: "Culpa",
        display_label: "Culpa",
        color_tag: "pink",
        virtue: "Responsabilidad",
    },
    EmotionEntry {
        id: "Impotencia",
        display_label: "Impotencia",
        color_tag: "gray",
        virtue: "Humildad",
    },
];

/// Selecting this object means the custom object text is used instead.
pub const CUSTOM_OBJECT: &str = "Otro...";

pub const PREDEFINED_OBJECTS: &[&str] = &[
    "Reloj",
    "Espejo",
    "Piedra",
    "Flor",
    "Luz",
    "Agua",
    CUSTOM_OBJECT,
];

/// Looks up an emotion by id. Ids are matched exactly.
pub fn find_emotion(id: &str) -> Option<&'static EmotionEntry> {
    EMOTIONS.iter().find(|e| e.id == id)
}

pub fn is_known_emotion(id: &str) -> bool {
    find_emotion(id).is_some()
}
