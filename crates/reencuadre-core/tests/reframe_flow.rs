use reencuadre_core::catalog::EMOTIONS;
use reencuadre_core::composer::{compose_result, SectionBody};
use reencuadre_core::input::{Frequency, SessionDraft, SubmodalityKind, Timeframe};
use reencuadre_core::reframe::{derive_bundle, DEFAULT_VIRTUE};
use reencuadre_core::render::{parse_and_render, Block, HtmlRenderer, Inline, RenderTree};

fn draft(emotions: &[&str], timeframe: Timeframe, frequency: Frequency) -> SessionDraft {
    let mut draft = SessionDraft {
        situation: "Tengo una entrevista de trabajo el lunes".into(),
        emotional_load: 5,
        timeframe: Some(timeframe),
        frequency: Some(frequency),
        ..Default::default()
    };
    for emotion in emotions {
        draft.toggle_emotion(emotion);
    }
    draft.select_object("Reloj");
    draft.params.set(SubmodalityKind::Visual, "blanco y negro");
    draft
}

#[test]
fn test_primary_emotion_is_first_selected() {
    for entry in EMOTIONS {
        let bundle = derive_bundle(&[entry.id, "Culpa"], Timeframe::Current, Frequency::Infrequent);
        assert_eq!(bundle.primary_emotion.as_deref(), Some(entry.id));
        assert_eq!(bundle.virtue, entry.virtue);
        assert!(!bundle.action_tip.is_empty());
        assert!(!bundle.action_focus.is_empty());
    }
}

#[test]
fn test_unknown_emotion_falls_back_to_discipline() {
    let bundle = derive_bundle(&["Nostalgia"], Timeframe::Current, Frequency::Infrequent);
    assert_eq!(bundle.virtue, DEFAULT_VIRTUE);
    assert_eq!(bundle.action_tip, "");
    assert_eq!(bundle.action_focus, "");
}

#[test]
fn test_fear_current_repetitive() {
    let bundle = derive_bundle(&["Miedo"], Timeframe::Current, Frequency::Repetitive);
    assert!(bundle.action_focus.contains("Coraje"));
    assert!(bundle.challenge.contains("palabra STOP"));
}

#[test]
fn test_fear_memory_reinterprets_past_event() {
    let bundle = derive_bundle(&["Miedo"], Timeframe::Memory, Frequency::Infrequent);
    assert!(bundle.dichotomy_example.contains("evento pasado"));
    assert!(bundle.dichotomy_example.contains("interpretación"));
}

#[test]
fn test_composed_text_round_trips_through_parser() {
    for emotions in [&["Miedo"][..], &["Tristeza", "Rabia"][..], &["Nostalgia"][..]] {
        let input = draft(emotions, Timeframe::Memory, Frequency::Repetitive)
            .validate()
            .unwrap();
        let bundle = derive_bundle(&input.selected_emotions, input.timeframe, input.frequency);
        let composed = compose_result(&input, &bundle);

        let parsed = parse_and_render(&composed.to_text());
        let expected: Vec<String> = composed.sections.iter().map(|s| s.heading()).collect();
        assert_eq!(parsed.headings(), expected);
        assert_eq!(parsed.title, composed.title);

        let SectionBody::Table(table) = &composed.sections[0].body else {
            panic!("first section is the frame table");
        };
        let Block::Table { headers, rows } = &parsed.sections[0].block else {
            panic!("frame section parsed as table");
        };
        assert_eq!(headers, &table.headers);
        assert_eq!(rows.len(), table.rows.len());
        assert_eq!(
            rows[0][0],
            vec![Inline::Strong(
                table.rows[0][0].trim_matches('*').to_string()
            )]
        );
    }
}

#[test]
fn test_table_extraction_keeps_well_formed_rows() {
    let text = "\
Título
Intro

SECCIÓN 1: Reencuadre por Marcos (La Lente del Crecimiento)
| Marco | Reencuadre |
|---|---|
| **Uno** | a |
| roto |
| **Dos** | b |
| x | y | z |
| **Tres** | c |

SECCIÓN 2: Reto
cuerpo";
    let tree = parse_and_render(text);
    let Block::Table { rows, .. } = &tree.sections[0].block else {
        panic!("expected table");
    };
    assert_eq!(rows.len(), 3);
    assert_eq!(tree.sections.len(), 2);
}

#[test]
fn test_table_section_without_divider_is_dropped() {
    let text = "Título\n\nSECCIÓN 1: Reencuadre por Marcos\n| solo cabecera |\n\nSECCIÓN 2: Reto\ncuerpo";
    let tree = parse_and_render(text);
    assert_eq!(tree.headings(), vec!["SECCIÓN 2: Reto"]);
}

#[test]
fn test_html_output_escapes_user_text() {
    let mut draft = draft(&["Rabia"], Timeframe::Current, Frequency::Infrequent);
    draft.situation = "<script>alert(1)</script>".into();
    let input = draft.validate().unwrap();
    let bundle = derive_bundle(&input.selected_emotions, input.timeframe, input.frequency);
    let tree = parse_and_render(&compose_result(&input, &bundle).to_text());
    let html = HtmlRenderer.render(&tree);
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
}

#[test]
fn test_parsed_text_sections_match_direct_render() {
    let input = draft(&["Ansiedad"], Timeframe::Memory, Frequency::Repetitive)
        .validate()
        .unwrap();
    let bundle = derive_bundle(&input.selected_emotions, input.timeframe, input.frequency);
    let result = compose_result(&input, &bundle);

    let direct = RenderTree::from_composed(&result);
    let parsed = parse_and_render(&result.to_text());

    assert_eq!(parsed.title, direct.title);
    assert_eq!(parsed.intro, direct.intro);
    for (parsed, direct) in parsed.sections.iter().zip(&direct.sections) {
        if !direct.is_table() {
            assert_eq!(parsed, direct);
        }
    }
}
