//! Composes the structured reframe result from a session input and its
//! reframe bundle.
//!
//! The result is structured ([`ComposedResult`]) and has a canonical text
//! form ([`ComposedResult::to_text`]) made of a title line, an intro
//! paragraph and blank-line separated sections headed `SECCIÓN <n>: <title>`.
//! User text is normalised before it is placed in the text so the canonical
//! form always parses back into the same sections.

use crate::input::{load_label, SessionInput};
use crate::reframe::ReframeBundle;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter};

pub const RESULT_TITLE: &str = "Reencuadre Terapéutico: El Arquitecto de tu Destino";
pub const SECTION_MARKER: &str = "SECCIÓN";
pub const FRAME_SECTION_TITLE: &str = "Reencuadre por Marcos (La Lente del Crecimiento)";
pub const RESPONSIBILITY_SECTION_TITLE: &str = "Reto de la Responsabilidad Estoica (Acción y Virtud)";
pub const SUBMODALITY_SECTION_TITLE: &str = "Reencuadre de Submodalidades (El Anclaje Sensorial)";
pub const FRAME_TABLE_HEADERS: [&str; 2] = [
    "Marco",
    "Aplicación Estoica/PNL (Redirección Virtuosa y Preguntas de Reencuadre)",
];
pub const NO_PARAMETERS: &str = "No se ingresaron submodalidades iniciales.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize, Deserialize)]
pub enum Frame {
    #[strum(to_string = "Aceptación")]
    Acceptance,
    #[strum(to_string = "Utilidad")]
    Usefulness,
    #[strum(to_string = "Aprendizaje")]
    Learning,
    #[strum(to_string = "Gratitud")]
    Gratitude,
    #[strum(to_string = "Humor")]
    Humor,
    #[strum(to_string = "Abundancia")]
    Abundance,
    #[strum(to_string = "Amor")]
    Love,
    #[strum(to_string = "Compasión")]
    Compassion,
}

/// Per-frame sentence. Placeholders: `{situacion}`, `{objeto}`, `{carga}`,
/// `{carga_texto}`, `{virtud}`, `{emocion}`.
#[derive(Debug, Clone, Copy)]
pub struct FrameTemplate {
    pub frame: Frame,
    pub template: &'static str,
}

pub const FRAME_TEMPLATES: [FrameTemplate; 8] = [
    FrameTemplate {
        frame: Frame::Acceptance,
        template: "Orden Divino: Acepta que la incomodidad de la carga {carga} ({carga_texto}) es la resistencia a lo que es. Pregunta: Si aceptaras que esta sensación es parte normal del proceso, ¿qué nueva estrategia probarías?",
    },
    FrameTemplate {
        frame: Frame::Usefulness,
        template: "Proyección Interna: ¿De qué te sirve este bloqueo? Es útil porque te obliga a revisar tus límites y priorizar el cuidado personal. Pregunta: ¿Cómo puedo usar la emoción de **{emocion}** como una brújula precisa para saber exactamente qué necesito soltar o abrazar?",
    },
    FrameTemplate {
        frame: Frame::Learning,
        template: "Dicotomía Estoica: Aprende que la reacción no funciona. El fracaso es no cambiar tu enfoque. Pregunta: Si \"{situacion}\" tuviera un mensaje positivo, ¿cuál sería el nuevo método de respuesta que te está pidiendo que adoptes?",
    },
    FrameTemplate {
        frame: Frame::Gratitude,
        template: "Agradece que tienes la capacidad de sentir y que el bloqueo te está mostrando la brecha exacta de tus necesidades. Pregunta: ¿Qué tres cosas fundamentales en tu vida agradeces tener justo ahora que te facilitarán la gestión de esta situación?",
    },
    FrameTemplate {
        frame: Frame::Humor,
        template: "Ríe de tu **\"{objeto}\"** y la seriedad con la que tu mente toma el desvío. Dale un nombre tonto a la sensación. Pregunta: Si esa sensación fuera un personaje de dibujos animados, ¿qué consejo absurdo le darías para superarlo?",
    },
    FrameTemplate {
        frame: Frame::Abundance,
        template: "Hay abundancia de recursos internos y oportunidades. Tu habilidad de aprender no se ha agotado. Pregunta: ¿Qué oportunidades de aprendizaje y autoconocimiento hay en tu entorno que aún no has utilizado?",
    },
    FrameTemplate {
        frame: Frame::Love,
        template: "Aplícate la auto-compasión. Ámate lo suficiente como para darte permiso de sentir y descansar; la **{virtud}** también se cultiva con ternura. Pregunta: Si fueras tu propio mentor más sabio, ¿cómo te hablarías para animarte a seguir adelante sin autocastigarte?",
    },
    FrameTemplate {
        frame: Frame::Compassion,
        template: "Siente compasión por el tú que se siente abrumado. Entiende que esa energía necesita una dirección. Pregunta: ¿Cómo canalizarías esta energía en una acción física y productiva ahora mismo (ej: ordenar algo, hacer ejercicio)?",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum SectionBody {
    Table(Table),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedSection {
    pub number: u32,
    pub title: String,
    pub body: SectionBody,
}

impl ComposedSection {
    pub fn heading(&self) -> String {
        format!("{} {}: {}", SECTION_MARKER, self.number, self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedResult {
    pub title: String,
    pub intro: String,
    pub sections: Vec<ComposedSection>,
}

impl ComposedResult {
    /// Canonical text form, accepted by [`crate::render::parse_and_render`].
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&self.intro);
        for section in &self.sections {
            out.push_str("\n\n");
            out.push_str(&section.heading());
            out.push('\n');
            match &section.body {
                SectionBody::Table(table) => out.push_str(&table_text(table)),
                SectionBody::Text(text) => out.push_str(text),
            }
        }
        out.push('\n');
        out
    }
}

impl fmt::Display for ComposedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

fn table_text(table: &Table) -> String {
    let mut lines = Vec::with_capacity(table.rows.len() + 2);
    lines.push(format!("| {} |", table.headers.join(" | ")));
    lines.push(format!("|{}", "---|".repeat(table.headers.len())));
    for row in &table.rows {
        lines.push(format!("| {} |", row.join(" | ")));
    }
    lines.join("\n")
}

/// Collapses whitespace (newlines included) so user text stays on one line.
pub fn inline_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn cell_text(text: &str) -> String {
    inline_text(text).replace('|', "¦")
}

fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}

pub fn compose_result(input: &SessionInput, bundle: &ReframeBundle) -> ComposedResult {
    let situation = inline_text(&input.situation_text);
    let object = inline_text(&input.representative_object);
    let emotions = inline_text(&input.emotions_joined());
    let primary = inline_text(
        bundle
            .primary_emotion
            .as_deref()
            .unwrap_or_else(|| input.primary_emotion()),
    );
    let load = input.emotional_load.to_string();
    let load_text = load_label(input.emotional_load);

    let intro = format!(
        "Tu mente no está fallando; está pidiendo un cambio de estrategia. El obstáculo de la situación **\"{}\"** no es un muro, sino un maestro disfrazado que te está entrenando en la perseverancia, la humildad y la disciplina, virtudes esenciales para tu crecimiento.",
        situation
    );

    let values = [
        ("situacion", situation.as_str()),
        ("objeto", object.as_str()),
        ("carga", load.as_str()),
        ("carga_texto", load_text),
        ("virtud", bundle.virtue.as_str()),
        ("emocion", primary.as_str()),
    ];
    let rows = FRAME_TEMPLATES
        .iter()
        .map(|t| {
            vec![
                format!("**{}**", t.frame),
                cell_text(&fill_template(t.template, &values)),
            ]
        })
        .collect();

    let frames = ComposedSection {
        number: 1,
        title: FRAME_SECTION_TITLE.to_string(),
        body: SectionBody::Table(Table {
            headers: FRAME_TABLE_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows,
        }),
    };

    let responsibility = ComposedSection {
        number: 2,
        title: RESPONSIBILITY_SECTION_TITLE.to_string(),
        body: SectionBody::Text(
            [
                "\"El primer paso para la virtud es la disciplina; el primer paso para la disciplina es la acción enfocada.\"".to_string(),
                "Tu foco no debe ser \"resolver la situación\", sino dominar tu propia consistencia en la respuesta.".to_string(),
                bundle.action_focus.clone(),
                "La Acción Inmediata (Controlable): El problema no es el evento, es tu reacción.".to_string(),
                bundle.dichotomy_example.clone(),
                format!("Reto: {}", bundle.challenge),
                format!(
                    "Proyección Interna: Cada vez que sientas la emoción de **{}** (o una de las seleccionadas: {}), recuerda que es la energía que te pide que cumplas la acción enfocada: **{}**",
                    primary, emotions, bundle.action_tip
                ),
            ]
            .join("\n"),
        ),
    };

    let params = inline_text(&input.submodality_params.format());
    let params = if params.is_empty() {
        NO_PARAMETERS.to_string()
    } else {
        params
    };

    let submodalities = ComposedSection {
        number: 3,
        title: SUBMODALITY_SECTION_TITLE.to_string(),
        body: SectionBody::Text(
            [
                format!("Tu Objeto Representativo (**{}**) encapsula la carga emocional negativa. Vamos a jugar con sus cualidades sensoriales para transformarlo en un ancla de determinación tranquila.", object),
                String::new(),
                "**Diagnóstico PNL:**".to_string(),
                format!("Tiempo de la Situación: **{}**", input.timeframe),
                format!("Emociones Seleccionadas: **{}**", emotions),
                format!("Emoción Principal para Lógica: **{}**", primary),
                format!("Frecuencia de Pensamiento: **{}**", input.frequency),
                format!("Parámetros Debilitados: {}", params),
                format!("Carga Emocional: {}/5 ({})", input.emotional_load, load_text),
                String::new(),
                "Instrucción: Vas a manipular estas submodalidades en tu mente. Realiza las siguientes pruebas y observa qué cambios disminuyen inmediatamente la carga negativa que sientes:".to_string(),
                String::new(),
                "1. **Cambio de Cualidad (Adaptado a Foco):**".to_string(),
                "Si la imagen es grande, hazla pequeña. Si está cerca, aléjala. Si es ruidosa, silénciala. Si es cálida, enfríala a una temperatura confortable.".to_string(),
                format!("Foco de Transformación: **{}**", bundle.submodality_tip),
                String::new(),
                "2. **Anclaje de Determinación:**".to_string(),
                format!("Ahora, fija tu **{}** con las nuevas submodalidades que elegiste (ej: Pequeño, Lejano, Fresco). Esta es tu nueva ancla de foco y consistencia y te recordará que la **virtud de la {}** es tu verdadero poder.", object, bundle.virtue),
            ]
            .join("\n"),
        ),
    };

    ComposedResult {
        title: RESULT_TITLE.to_string(),
        intro,
        sections: vec![frames, responsibility, submodalities],
    }
}
