//! Common test utilities for building intake flows.
use anamnesis::flow::{Action, BmiConfig, FeatureBranch, LoopConfig};
use anamnesis::prelude::*;

/// A realistic obstetric pre-consultation flow.
///
/// Covers yes/no routing, the obstetric formula, a loop with one block per
/// pregnancy, BMI, a checklist with `next_if_contains`, an answer branch, a
/// feature-flag branch and a `show_if` node.
#[allow(dead_code)]
pub const INTAKE_FLOW_JSON: &str = r#"{
    "start_node": "motivo",
    "nodes": {
        "motivo": {
            "type": "text",
            "text": "¿Cuál es el motivo de su consulta?",
            "save_to": "motivo_consulta",
            "next_node": "embarazo_previo"
        },
        "embarazo_previo": {
            "type": "yes_no",
            "text": "¿Ha estado embarazada anteriormente?",
            "save_to": "embarazos_previos",
            "next_on_yes": "gestas",
            "next_on_no": "peso"
        },
        "gestas": { "type": "number", "save_to": "gestas", "next_node": "partos" },
        "partos": { "type": "number", "save_to": "partos", "next_node": "cesareas" },
        "cesareas": { "type": "number", "save_to": "cesareas", "next_node": "abortos" },
        "abortos": { "type": "number", "save_to": "abortos", "next_node": "formula" },
        "formula": {
            "type": "action",
            "handler": "obstetric_formula",
            "next_node": "preparar_embarazos"
        },
        "preparar_embarazos": {
            "type": "action",
            "handler": "prepare_loop",
            "config": {
                "target_field": "embarazos",
                "count_field": "gestas",
                "body_start": "anio_embarazo",
                "body_end": "cierre_embarazo"
            },
            "next_node": "peso"
        },
        "anio_embarazo": {
            "type": "year",
            "text": "Año del embarazo",
            "save_to": "anio",
            "next_node": "tipo_parto"
        },
        "tipo_parto": {
            "type": "single_select",
            "text": "¿Cómo terminó el embarazo?",
            "save_to": "tipo_parto",
            "options": [
                { "label": "Vaginal" },
                { "label": "Cesárea", "next_node": "motivo_cesarea" },
                { "label": "Aborto" }
            ],
            "next_node": "cierre_embarazo"
        },
        "motivo_cesarea": {
            "type": "text",
            "save_to": "motivo_cesarea",
            "next_node": "cierre_embarazo"
        },
        "cierre_embarazo": { "type": "action", "handler": "loop_step" },
        "peso": { "type": "number", "text": "Peso (kg)", "save_to": "peso", "next_node": "talla" },
        "talla": { "type": "number", "text": "Talla (m)", "save_to": "talla", "next_node": "imc" },
        "imc": { "type": "action", "handler": "compute_bmi", "next_node": "flujo" },
        "flujo": {
            "type": "multi_select",
            "text": "¿Presenta flujo vaginal?",
            "save_to": "flujo_vaginal",
            "options": [
                { "label": "Blanca" },
                { "label": "Sanguinolenta" },
                { "label": "Ninguno" }
            ],
            "next_if_contains": { "value": "Ninguno", "next_node": "examen_extendido" },
            "next_node": "ruta_flujo"
        },
        "ruta_flujo": {
            "type": "action",
            "handler": "answer_branch",
            "config": {
                "rules": [
                    {
                        "field": "flujo_vaginal",
                        "contains_any": ["Blanca", "Sanguinolenta"],
                        "unless_answered": "detalle_flujo",
                        "next_node": "detalle_flujo"
                    }
                ]
            },
            "next_node": "examen_extendido"
        },
        "detalle_flujo": {
            "type": "text",
            "save_to": "detalle_flujo",
            "next_node": "examen_extendido"
        },
        "examen_extendido": {
            "type": "action",
            "handler": "feature_branch",
            "config": { "flag": "extended_exam", "if_enabled": "dolor", "if_disabled": "fin" }
        },
        "dolor": {
            "type": "scale",
            "text": "Dolor pélvico (0-10)",
            "save_to": "dolor",
            "min": 0,
            "max": 10,
            "show_if": { "key": "embarazos_previos", "value": true },
            "next_node": "fin"
        },
        "fin": { "type": "action", "handler": "finish" }
    }
}"#;

#[allow(dead_code)]
pub fn intake_flow() -> FlowDefinition {
    FlowDefinition::from_json(INTAKE_FLOW_JSON).expect("intake flow should parse")
}

/// Answers the intake flow along the "previous pregnancies" path, stopping
/// right before the BMI inputs.
#[allow(dead_code)]
pub fn answer_obstetric_history(session: &mut Session) {
    session.advance("Control anual").unwrap();
    session.advance(true).unwrap();
    session.advance(2).unwrap(); // gestas
    session.advance(1).unwrap(); // partos
    session.advance(1).unwrap(); // cesareas
    session.advance(0).unwrap(); // abortos
    session.advance(2018).unwrap();
    session.advance("Vaginal").unwrap();
    session.advance(2021).unwrap();
    session.advance("Cesárea").unwrap();
    session.advance("Podálico").unwrap();
}

/// `A` (yes/no) routes to `B` on yes and `C` on no; both end the flow.
#[allow(dead_code)]
pub fn yes_no_flow() -> FlowDefinition {
    FlowDefinition::new(
        "A",
        vec![
            Node::new(
                "A",
                NodeKind::YesNo {
                    on_yes: Some("B".to_string()),
                    on_no: Some("C".to_string()),
                },
            )
            .with_save_to("a"),
            Node::new("B", NodeKind::Text).with_save_to("b"),
            Node::new("C", NodeKind::Text).with_save_to("c"),
        ],
    )
    .unwrap()
}

/// `q0 -> q1 -> ... -> q{n-1}`, each a text question saving to `f{i}`.
#[allow(dead_code)]
pub fn linear_flow(n: usize) -> FlowDefinition {
    let nodes = (0..n).map(|i| {
        let node = Node::new(format!("q{}", i), NodeKind::Text).with_save_to(format!("f{}", i));
        if i + 1 < n {
            node.with_next(format!("q{}", i + 1))
        } else {
            node
        }
    });
    FlowDefinition::new("q0", nodes).unwrap()
}

/// A loop over `count` pets (fixed or read from `count_field`), asking the
/// name and species of each one, then a closing question.
#[allow(dead_code)]
pub fn pet_loop_flow(count: LoopCount) -> FlowDefinition {
    let (count_field, count) = match count {
        LoopCount::Field => (Some("pet_count".to_string()), None),
        LoopCount::Fixed(value) => (None, Some(value)),
    };
    FlowDefinition::new(
        "how_many",
        vec![
            Node::new("how_many", NodeKind::Number)
                .with_save_to("pet_count")
                .with_next("prepare"),
            Node::new(
                "prepare",
                NodeKind::Action(Action::PrepareLoop(LoopConfig {
                    target_field: "pets".to_string(),
                    count_field,
                    count,
                    body_start: "pet_name".to_string(),
                    body_end: Some("step".to_string()),
                })),
            )
            .with_next("closing"),
            Node::new("pet_name", NodeKind::Text)
                .with_save_to("name")
                .with_next("pet_species"),
            Node::new("pet_species", NodeKind::Text)
                .with_save_to("species")
                .with_next("step"),
            Node::new("step", NodeKind::Action(Action::LoopStep)),
            Node::new("closing", NodeKind::Text).with_save_to("notes"),
        ],
    )
    .unwrap()
}

#[allow(dead_code)]
pub enum LoopCount {
    Field,
    Fixed(Value),
}

#[allow(dead_code)]
pub fn bmi_node(id: &str, next: &str) -> Node {
    Node::new(id, NodeKind::Action(Action::ComputeBmi(BmiConfig::default()))).with_next(next)
}

#[allow(dead_code)]
pub fn flag_branch_node(id: &str, flag: &str, if_enabled: &str, if_disabled: &str) -> Node {
    Node::new(
        id,
        NodeKind::Action(Action::FeatureBranch(FeatureBranch {
            flag: flag.to_string(),
            if_enabled: Some(if_enabled.to_string()),
            if_disabled: Some(if_disabled.to_string()),
        })),
    )
}

/// Answers for a state with nothing but the given global answers.
#[allow(dead_code)]
pub fn state_with(answers: &[(&str, Value)]) -> EngineState {
    let answers = answers
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    EngineState::new("unused", answers)
}
