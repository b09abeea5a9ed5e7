use super::derived::{ObstetricCounts, body_mass_index};
use super::{Effect, Transition};
use crate::answer::{as_count, as_number, is_unanswered, matches_value, number_value};
use crate::config::RuntimeFlags;
use crate::engine::{EngineState, LoopState};
use crate::flow::{
    Action, AnswerBranch, BmiConfig, FeatureBranch, LoopConfig, Node, ObstetricConfig,
};
use serde_json::Value;
use tracing::{debug, warn};

/// Dispatches an action node to its built-in handler.
pub(super) fn execute(
    action: &Action,
    node: &Node,
    state: &EngineState,
    flags: &RuntimeFlags,
) -> Transition {
    match action {
        Action::PassThrough => Transition::to(node.next_node.clone()),
        Action::FeatureBranch(branch) => feature_branch(branch, node, flags),
        Action::AnswerBranch(branch) => answer_branch(branch, node, state),
        Action::ComputeBmi(config) => compute_bmi(config, node, state),
        Action::ObstetricFormula(config) => obstetric_formula(config, node, state),
        Action::PrepareLoop(config) => prepare_loop(config, node, state),
        Action::LoopStep => loop_step(node, state),
        Action::Finish => Transition::to(None).with_effect(Effect::Finish),
    }
}

fn feature_branch(branch: &FeatureBranch, node: &Node, flags: &RuntimeFlags) -> Transition {
    let enabled = flags.is_enabled(&branch.flag);
    let target = if enabled {
        &branch.if_enabled
    } else {
        &branch.if_disabled
    };
    debug!(node_id = %node.id, flag = %branch.flag, enabled, "feature branch");
    Transition::to(target.clone().or_else(|| node.next_node.clone()))
}

fn answer_branch(branch: &AnswerBranch, node: &Node, state: &EngineState) -> Transition {
    let matched = branch.rules.iter().find(|rule| {
        let Some(answer) = state.lookup(&rule.field) else {
            return false;
        };
        let hit = rule
            .contains_any
            .iter()
            .any(|wanted| matches_value(answer, wanted));
        let still_open = rule
            .unless_answered
            .as_deref()
            .is_none_or(|field| is_unanswered(state.lookup(field)));
        hit && still_open
    });

    match matched {
        Some(rule) => Transition::to(Some(rule.next_node.clone())),
        None => Transition::to(node.next_node.clone()),
    }
}

fn compute_bmi(config: &BmiConfig, node: &Node, state: &EngineState) -> Transition {
    let mass = state.lookup(&config.mass_field).and_then(as_number);
    let height = state.lookup(&config.height_field).and_then(as_number);
    let next = Transition::to(node.next_node.clone());

    match (mass, height) {
        (Some(mass), Some(height)) => match body_mass_index(mass, height) {
            Some(bmi) => next.with_effect(Effect::Store {
                field: config.target.clone(),
                value: number_value(bmi),
            }),
            None => {
                warn!(node_id = %node.id, mass, height, "cannot compute BMI from non-positive inputs");
                next
            }
        },
        _ => {
            warn!(
                node_id = %node.id,
                mass_field = %config.mass_field,
                height_field = %config.height_field,
                "BMI inputs missing or not numeric"
            );
            next
        }
    }
}

fn obstetric_formula(config: &ObstetricConfig, node: &Node, state: &EngineState) -> Transition {
    let source = config.source.as_deref().and_then(|field| state.lookup(field));
    let read = |field: &str| -> usize {
        match source {
            Some(record) => as_count(record.get(field)),
            None => as_count(state.lookup(field)),
        }
    };

    let counts = ObstetricCounts {
        gestations: read(&config.gestations),
        births: read(&config.births),
        cesareans: read(&config.cesareans),
        abortions: read(&config.abortions),
    };

    Transition::to(node.next_node.clone()).with_effect(Effect::Store {
        field: config.target.clone(),
        value: Value::String(counts.formula()),
    })
}

fn prepare_loop(config: &LoopConfig, node: &Node, state: &EngineState) -> Transition {
    let count = match &config.count_field {
        Some(field) => as_count(state.lookup(field)),
        None => as_count(config.count.as_ref()),
    };

    if count == 0 {
        debug!(node_id = %node.id, target = %config.target_field, "loop has no iterations, skipping body");
        return Transition::to(node.next_node.clone());
    }

    let mut loop_state = LoopState::new(&config.target_field, count, &config.body_start);
    loop_state.body_end_node_id = config.body_end.clone();
    loop_state.exit_node_id = node.next_node.clone();

    debug!(node_id = %node.id, target = %config.target_field, count, "entering loop");
    Transition::to(Some(config.body_start.clone())).with_effect(Effect::EnterLoop(loop_state))
}

fn loop_step(node: &Node, state: &EngineState) -> Transition {
    let Some(active) = state.active_loop() else {
        warn!(node_id = %node.id, "loop step reached without an active loop");
        return Transition::to(node.next_node.clone());
    };

    if active.is_last_iteration() {
        let exit = active
            .exit_node_id
            .clone()
            .or_else(|| node.next_node.clone());
        debug!(target = %active.target_field, iterations = active.total_iterations, "leaving loop");
        Transition::to(exit).with_effect(Effect::ExitLoop)
    } else {
        Transition::to(Some(active.body_start_node_id.clone())).with_effect(Effect::NextIteration)
    }
}
