//! Integration tests for Anamnesis
//!
//! End-to-end runs of a full intake flow: loading, answering, snapshots and
//! submission.
//!
mod common;
use anamnesis::error::FlowConversionError;
use anamnesis::prelude::*;
use common::*;
use std::fs;

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn test_full_obstetric_intake() {
        let mut session = Session::new(Engine::new(intake_flow()));

        answer_obstetric_history(&mut session);
        assert_eq!(session.current_node_id(), Some("peso"));
        assert_eq!(
            session.answers().get("formula_obstetrica"),
            Some(&json!("IIG IP IC"))
        );

        session.advance(60).unwrap();
        session.advance(1.6).unwrap();
        assert_eq!(session.answers().get("imc"), Some(&json!(23.44)));

        session.advance(json!(["Blanca"])).unwrap();
        assert_eq!(session.current_node_id(), Some("detalle_flujo"));
        session.advance("Escaso").unwrap();

        assert!(session.is_finished());
        assert_eq!(session.state().finish_reason, Some(FinishReason::FinishNode));

        let answers = session.answers();
        assert_eq!(answers.get("motivo_consulta"), Some(&json!("Control anual")));
        assert_eq!(answers.get("embarazos_previos"), Some(&json!(true)));
        assert_eq!(
            answers.get("embarazos"),
            Some(&json!([
                { "anio": 2018, "tipo_parto": "Vaginal" },
                { "anio": 2021, "tipo_parto": "Cesárea", "motivo_cesarea": "Podálico" }
            ]))
        );
        assert_eq!(answers.get("flujo_vaginal"), Some(&json!(["Blanca"])));
        assert_eq!(answers.get("detalle_flujo"), Some(&json!("Escaso")));
        assert!(!answers.contains_key("dolor"));

        // Action nodes and the final step are not part of the history.
        let ids: Vec<&str> = session
            .history()
            .iter()
            .map(|e| e.node_id.as_str())
            .collect();
        assert_eq!(ids.len(), 14);
        assert!(!ids.contains(&"formula"));
        assert!(!ids.contains(&"imc"));
        assert!(!ids.contains(&"detalle_flujo"));

        println!("{}", TranscriptFormatter::format_history(session.history()));
    }

    #[test]
    fn test_no_previous_pregnancies_with_extended_exam() {
        let engine = Engine::builder(intake_flow())
            .with_flag("extended_exam", true)
            .build();
        let mut session = Session::new(engine);

        session.advance("Dolor pélvico").unwrap();
        session.advance("No").unwrap();
        assert_eq!(session.current_node_id(), Some("peso"));

        session.advance(70).unwrap();
        session.advance("1,70").unwrap();
        session.advance(json!(["Ninguno"])).unwrap();

        // `dolor` is only shown after previous pregnancies, so the flow ends.
        assert!(session.is_finished());
        assert_eq!(session.answers().get("imc"), Some(&json!(24.22)));
        assert!(!session.answers().contains_key("formula_obstetrica"));
        assert!(!session.answers().contains_key("embarazos"));
    }

    #[test]
    fn test_extended_exam_shows_pain_scale() {
        let engine = Engine::builder(intake_flow())
            .with_flags(RuntimeFlags::new().with("extended_exam", true))
            .build();
        let mut session = Session::new(engine);

        answer_obstetric_history(&mut session);
        session.advance(60).unwrap();
        session.advance(1.6).unwrap();
        session.advance(json!(["Ninguno"])).unwrap();

        let step = session.presentation().unwrap();
        assert_eq!(step.node_id, "dolor");
        assert_eq!(step.node.max, Some(10.0));

        session.advance(4).unwrap();
        assert!(session.is_finished());
        assert_eq!(session.answers().get("dolor"), Some(&json!(4)));
    }

    #[test]
    fn test_snapshot_resume() {
        let engine = Engine::new(intake_flow());
        let mut session = Session::new(engine.clone());
        session.advance("Control anual").unwrap();
        session.advance(true).unwrap();
        session.advance(1).unwrap();
        session.advance(1).unwrap();
        session.advance(0).unwrap();
        session.advance(0).unwrap();
        assert_eq!(session.current_node_id(), Some("anio_embarazo"));

        let snapshot = serde_json::to_string(session.state()).expect("state should serialize");
        let restored: EngineState =
            serde_json::from_str(&snapshot).expect("snapshot should deserialize");
        assert_eq!(&restored, session.state());

        let mut resumed = Session::resume(engine, restored);
        assert_eq!(resumed.active_loop().map(|l| l.total_iterations), Some(1));
        resumed.advance(2020).unwrap();
        resumed.advance("Vaginal").unwrap();
        assert_eq!(resumed.current_node_id(), Some("peso"));
        assert_eq!(
            resumed.answers().get("embarazos"),
            Some(&json!([{ "anio": 2020, "tipo_parto": "Vaginal" }]))
        );

        // Rewinding across the snapshot boundary still works.
        resumed.rewind(0).unwrap();
        assert_eq!(resumed.current_node_id(), Some("motivo"));
    }

    #[test]
    fn test_submit() {
        let mut session = Session::new(Engine::new(yes_no_flow()));

        let early = tokio_test::block_on(session.submit(|_| async { Ok::<_, String>(()) }));
        assert_eq!(early, Err(SubmissionError::NotFinished));

        session.advance(false).unwrap();
        session.advance("ninguna").unwrap();

        let accepted = tokio_test::block_on(session.submit(|answers| async move {
            Ok::<_, String>(answers.len())
        }));
        assert_eq!(accepted, Ok(2));

        let rejected = tokio_test::block_on(
            session.submit(|_| async { Err::<(), _>("servicio no disponible") }),
        );
        assert_eq!(
            rejected,
            Err(SubmissionError::Rejected("servicio no disponible".to_string()))
        );
        // A failed submission leaves the session finished, ready to retry.
        assert!(session.is_finished());
    }

    #[test]
    fn test_flow_from_file() {
        let path = std::env::temp_dir().join("anamnesis_intake_flow_test.json");
        fs::write(&path, INTAKE_FLOW_JSON).expect("Failed to write flow file");

        let flow = FlowDefinition::from_file(path.to_str().unwrap()).expect("Failed to load flow");
        assert_eq!(flow, intake_flow());

        fs::remove_file(&path).ok();
    }

    struct Checklist {
        items: Vec<(&'static str, &'static str)>,
    }

    impl IntoFlow for Checklist {
        fn into_flow(self) -> std::result::Result<FlowDefinition, FlowConversionError> {
            let first = self
                .items
                .first()
                .map(|(id, _)| id.to_string())
                .ok_or_else(|| FlowConversionError::ValidationError("empty checklist".into()))?;
            let ids: Vec<&str> = self.items.iter().map(|(id, _)| *id).collect();
            let nodes = self.items.iter().enumerate().map(|(i, (id, prompt))| {
                let node = Node::new(*id, NodeKind::YesNo { on_yes: None, on_no: None })
                    .with_text(*prompt)
                    .with_save_to(*id);
                match ids.get(i + 1) {
                    Some(next) => node.with_next(*next),
                    None => node,
                }
            });
            Ok(FlowDefinition::new(first, nodes)?)
        }
    }

    #[test]
    fn test_custom_format_conversion() {
        let checklist = Checklist {
            items: vec![
                ("alergias", "¿Tiene alergias?"),
                ("cirugias", "¿Le han operado?"),
            ],
        };
        let mut session = Session::new(Engine::new(checklist.into_flow().unwrap()));

        session.advance("Sí").unwrap();
        session.advance("No").unwrap();
        assert!(session.is_finished());
        assert_eq!(session.answers().len(), 2);

        let empty = Checklist { items: vec![] }.into_flow();
        assert!(matches!(empty, Err(FlowConversionError::ValidationError(_))));
    }
}
