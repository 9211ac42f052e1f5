//! Reframe logic: maps the selected emotions and the thought context to the
//! virtue, action and challenge texts used by the composer.
//!
//! The texts are data. The primary emotion picks an [`EmotionTemplate`];
//! the timeframe and frequency rewrites are then applied in that order.

use crate::catalog::find_emotion;
use crate::input::{Frequency, Timeframe};
use serde::{Deserialize, Serialize};

pub const DEFAULT_VIRTUE: &str = "Disciplina";
pub const MISSING_PRIMARY_EMOTION: &str = "Falta de emoción primaria.";

const DEFAULT_DICHOTOMY: &str = "Dicotomía Estoica: No puedes controlar el origen de la situación (Incontrolable), pero puedes controlar dedicar **X minutos a la acción enfocada (Controlable)**.";
const DEFAULT_CHALLENGE: &str = "Durante 7 días, comprométete a dedicar exactamente X minutos a la quietud, sin intentar resolver la situación.";
const DEFAULT_SUBMODALITY_TIP: &str = "Elige la cualidad que más disminuya la sensación negativa.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReframeBundle {
    pub primary_emotion: Option<String>,
    pub virtue: String,
    pub action_tip: String,
    pub action_focus: String,
    pub dichotomy_example: String,
    pub challenge: String,
    pub submodality_tip: String,
}

#[derive(Debug, Clone, Copy)]
pub struct EmotionTemplate {
    pub emotion_id: &'static str,
    pub action_tip: &'static str,
    pub action_focus: &'static str,
    pub challenge: &'static str,
}

pub const EMOTION_TEMPLATES: &[EmotionTemplate] = &[
    EmotionTemplate {
        emotion_id: "Rabia",
        action_tip: "Acción de Canalización: Dirige esta energía. Ej: Ordenar tu escritorio, hacer 10 sentadillas o escribir una \"carta de rabia\" que nunca enviarás.",
        action_focus: "La Virtud a Cultivar: **Templanza (Moderación en la reacción) y Justicia.**",
        challenge: "Durante 5 días, cada vez que sientas el pico de rabia, oblígate a realizar una acción física y productiva por 5 minutos.",
    },
    EmotionTemplate {
        emotion_id: "Miedo",
        action_tip: "Acción de Anclaje: Trae tu cuerpo al presente. Ej: Respiración 4-7-8, un chasquido de dedos, o nombrar 5 cosas que ves en la habitación.",
        action_focus: "La Virtud a Cultivar: **Coraje (Afrontar la realidad) y Sabiduría.**",
        challenge: "Durante 7 días, comprométete a dedicar 5 minutos a la respiración diafragmática profunda, ignorando la voz interna de alarma.",
    },
    EmotionTemplate {
        emotion_id: "Ansiedad",
        action_tip: "Acción de Quietud: La ansiedad es energía futura. Céntrate en lo único seguro: tu respiración. Ej: Ancla tu atención en el sonido y la sensación del aire entrando y saliendo por 60 segundos.",
        action_focus: "La Virtud a Cultivar: **Serenidad (Confianza en el presente) y Templanza.**",
        challenge: "Durante 7 días, establece 3 recordatorios diarios para detenerte y nombrar 3 objetos que ves, 3 sonidos que escuchas y 3 cosas que sientes.",
    },
    EmotionTemplate {
        emotion_id: "Tristeza",
        action_tip: "Acción de Conexión: La tristeza necesita ser reconocida y compartida. Ej: Llama a un ser querido o escribe una página de gratitud por lo que sí tienes.",
        action_focus: "La Virtud a Cultivar: **Amor (Auto-compasión) y Aceptación.**",
        challenge: "Durante 7 días, escribe un \"Diario de Sentimiento\" por 10 minutos, reconociendo la emoción sin juzgarla.",
    },
    EmotionTemplate {
        emotion_id: "Frustración",
        action_tip: "Acción de Redirección: Enfócate en la micro-acción controlable. Ej: Identifica el primer paso ridículamente pequeño que *sí* puedes hacer.",
        action_focus: "La Virtud a Cultivar: **Diligencia (Persistencia enfocada) y Humildad.**",
        challenge: "Durante 3 días, haz solamente el primer paso (micro-acción) y luego detente. El reto es la consistencia mínima, no la finalización.",
    },
    EmotionTemplate {
        emotion_id: "Impotencia",
        action_tip: "Acción de Enfoque Radical: Separa lo que puedes y no puedes hacer. Elige un solo punto de control (ej: la hora a la que te levantas) y domínalo por un día. El poder reside en el micro-control.",
        action_focus: "La Virtud a Cultivar: **Humildad (Reconocer el límite) y Coraje.**",
        challenge: "Durante 5 días, repite en voz alta: \"Solo puedo controlar mi esfuerzo y mi actitud. Acepto el resto\" cada vez que sientas el pico de impotencia.",
    },
    EmotionTemplate {
        emotion_id: "Culpa",
        action_tip: "Acción de Reparación/Auto-perdón: Cierra el ciclo. Ej: Pide disculpas si es necesario, o escríbele una carta de perdón a tu yo del pasado.",
        action_focus: "La Virtud a Cultivar: **Justicia (Reparación) y Responsabilidad.**",
        challenge: "Durante 5 días, dedica 10 minutos a ejercicios de auto-compasión (Ej: Meditación de Bondad Amorosa), reconociendo que hiciste lo mejor que podías con el conocimiento que tenías.",
    },
];

/// Replaces the first occurrence of `find`. When `find` is absent the
/// text is left alone, or `fallback_suffix` is appended if there is one.
#[derive(Debug, Clone, Copy)]
pub struct Substitution {
    pub find: &'static str,
    pub replace: &'static str,
    pub fallback_suffix: Option<&'static str>,
}

impl Substitution {
    pub fn apply(&self, text: &str) -> String {
        if text.contains(self.find) {
            text.replacen(self.find, self.replace, 1)
        } else if let Some(suffix) = self.fallback_suffix {
            if text.is_empty() {
                suffix.trim_start().to_string()
            } else {
                format!("{}{}", text, suffix)
            }
        } else {
            text.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimeframeRewrite {
    pub timeframe: Timeframe,
    pub dichotomy_example: &'static str,
    pub action_tip: &'static [Substitution],
    pub submodality_tip: Substitution,
}

#[derive(Debug, Clone, Copy)]
pub struct FrequencyRewrite {
    pub frequency: Frequency,
    pub challenge: Substitution,
    pub submodality_tip: &'static str,
}

pub const TIMEFRAME_REWRITES: &[TimeframeRewrite] = &[TimeframeRewrite {
    timeframe: Timeframe::Memory,
    dichotomy_example: "Dicotomía Estoica: No puedes cambiar el evento pasado (Incontrolable), pero puedes controlar la **interpretación y la carga que le asignas hoy (Controlable)**.",
    action_tip: &[
        Substitution {
            find: "que ves en la habitación.",
            replace: "que ves **actualmente** en la habitación.",
            fallback_suffix: None,
        },
        Substitution {
            find: "físico",
            replace: "simbólico/físico",
            fallback_suffix: None,
        },
    ],
    submodality_tip: Substitution {
        find: DEFAULT_SUBMODALITY_TIP,
        replace: "Elige la cualidad que más disminuya la sensación negativa. Si es un recuerdo, experimenta con hacerlo en Blanco y Negro, o ponerle música de circo.",
        fallback_suffix: None,
    },
}];

pub const FREQUENCY_REWRITES: &[FrequencyRewrite] = &[FrequencyRewrite {
    frequency: Frequency::Repetitive,
    challenge: Substitution {
        find: "comprométete a dedicar",
        replace: "establece una \"palabra STOP\" y un anclaje físico (Ej: chasquido) y comprométete a usar el anclaje cada vez que el pensamiento empiece a rodar; después, dedica",
        fallback_suffix: Some(" Cada vez que el pensamiento empiece a rodar, di tu \"palabra STOP\" y usa un anclaje físico (Ej: chasquido) antes de volver al reto."),
    },
    submodality_tip: "Puesto que es un pensamiento repetitivo, enfócate en hacerlo borroso, pequeño y lejano (disociación) para romper el bucle.",
}];

pub fn template_for(emotion_id: &str) -> Option<&'static EmotionTemplate> {
    EMOTION_TEMPLATES.iter().find(|t| t.emotion_id == emotion_id)
}

pub fn timeframe_rewrite(timeframe: Timeframe) -> Option<&'static TimeframeRewrite> {
    TIMEFRAME_REWRITES.iter().find(|r| r.timeframe == timeframe)
}

pub fn frequency_rewrite(frequency: Frequency) -> Option<&'static FrequencyRewrite> {
    FREQUENCY_REWRITES.iter().find(|r| r.frequency == frequency)
}

/// Derives the reframe bundle. The first selected emotion drives template
/// selection; an empty selection yields the placeholder bundle.
pub fn derive_bundle<S: AsRef<str>>(
    selected_emotions: &[S],
    timeframe: Timeframe,
    frequency: Frequency,
) -> ReframeBundle {
    let Some(primary) = selected_emotions.first().map(AsRef::as_ref) else {
        return ReframeBundle {
            primary_emotion: None,
            virtue: DEFAULT_VIRTUE.to_string(),
            action_tip: MISSING_PRIMARY_EMOTION.to_string(),
            action_focus: MISSING_PRIMARY_EMOTION.to_string(),
            dichotomy_example: String::new(),
            challenge: String::new(),
            submodality_tip: String::new(),
        };
    };

    let virtue = find_emotion(primary).map_or(DEFAULT_VIRTUE, |e| e.virtue);
    let template = template_for(primary);

    let mut bundle = ReframeBundle {
        primary_emotion: Some(primary.to_string()),
        virtue: virtue.to_string(),
        action_tip: template.map_or("", |t| t.action_tip).to_string(),
        action_focus: template.map_or("", |t| t.action_focus).to_string(),
        dichotomy_example: DEFAULT_DICHOTOMY.to_string(),
        challenge: template.map_or(DEFAULT_CHALLENGE, |t| t.challenge).to_string(),
        submodality_tip: DEFAULT_SUBMODALITY_TIP.to_string(),
    };

    if let Some(rewrite) = timeframe_rewrite(timeframe) {
        bundle.dichotomy_example = rewrite.dichotomy_example.to_string();
        for substitution in rewrite.action_tip {
            bundle.action_tip = substitution.apply(&bundle.action_tip);
        }
        bundle.submodality_tip = rewrite.submodality_tip.apply(&bundle.submodality_tip);
    }

    if let Some(rewrite) = frequency_rewrite(frequency) {
        bundle.challenge = rewrite.challenge.apply(&bundle.challenge);
        bundle.submodality_tip = rewrite.submodality_tip.to_string();
    }

    bundle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EMOTIONS;

    #[test]
    fn every_catalog_emotion_has_a_template() {
        for emotion in EMOTIONS {
            assert!(template_for(emotion.id).is_some(), "{}", emotion.id);
        }
    }

    #[test]
    fn substitution_replaces_first_occurrence_only() {
        let sub = Substitution {
            find: "a",
            replace: "b",
            fallback_suffix: None,
        };
        assert_eq!(sub.apply("aaa"), "baa");
        assert_eq!(sub.apply("xyz"), "xyz");
    }

    #[test]
    fn substitution_appends_fallback_when_missing() {
        let sub = Substitution {
            find: "nope",
            replace: "",
            fallback_suffix: Some(" tail"),
        };
        assert_eq!(sub.apply("head"), "head tail");
        assert_eq!(sub.apply(""), "tail");
    }

    #[test]
    fn memory_rewrite_frames_actions_in_the_present() {
        let bundle = derive_bundle(&["Miedo"], Timeframe::Memory, Frequency::Infrequent);
        assert!(bundle.action_tip.contains("que ves **actualmente** en la habitación."));
        assert!(bundle.submodality_tip.contains("Blanco y Negro"));
    }

    #[test]
    fn repetitive_rewrite_wins_over_memory_for_submodality_tip() {
        let bundle = derive_bundle(&["Tristeza"], Timeframe::Memory, Frequency::Repetitive);
        assert!(bundle.submodality_tip.contains("borroso, pequeño y lejano"));
        assert!(!bundle.submodality_tip.contains("Blanco y Negro"));
    }

    #[test]
    fn infrequent_current_keeps_template_texts() {
        let bundle = derive_bundle(&["Rabia"], Timeframe::Current, Frequency::Infrequent);
        let template = template_for("Rabia").unwrap();
        assert_eq!(bundle.action_tip, template.action_tip);
        assert_eq!(bundle.challenge, template.challenge);
        assert_eq!(bundle.dichotomy_example, DEFAULT_DICHOTOMY);
        assert_eq!(bundle.submodality_tip, DEFAULT_SUBMODALITY_TIP);
    }
}
