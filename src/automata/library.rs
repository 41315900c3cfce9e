//! The fixed template family every compiled network instantiates.
//!
//! Reactions look up their delay whenever a round starts and keep their
//! local clock `c` across rounds. A reaction whose clock already exceeds the
//! new delay is clamped to it, so it fires at the next opportunity.

use crate::automata::template::{Location, Parameter, Template, TemplateKind, Transition};

/// Constant holding the "never fires" sentinel.
pub const INFINITE_TIME: &str = "INFINITE_TIME";
/// Constant holding the highest activity level.
pub const MAX_LEVELS: &str = "MAX_LEVELS";
/// Constant holding the number of substrates.
pub const N_SUBSTRATES: &str = "N_SUBSTRATES";
/// Constant holding the number of reactions.
pub const N_REACTIONS: &str = "N_REACTIONS";

/// Broadcast channel that commits a round. The channel names are local
/// parameter names of the reaction and coordinator templates.
pub const UPDATE: &str = "update";
/// Report channel for a reaction that fired.
pub const REACTING: &str = "reacting";
/// Report channel for a reaction that did not fire.
pub const NOT_REACTING: &str = "not_reacting";

/// Returns the four templates in emission order.
#[must_use]
pub fn standard_templates() -> Vec<Template> {
    vec![
        substrate_template(),
        unary_reaction_template(),
        binary_reaction_template(),
        coordinator_template(),
    ]
}

/// Commits the shadow level on every `update`, saturating at the bounds.
#[must_use]
pub fn substrate_template() -> Template {
    Template {
        kind: TemplateKind::Substrate,
        parameters: vec![
            Parameter::by_ref("int[0,MAX_LEVELS]", "official"),
            Parameter::by_ref("int", "shadow"),
            Parameter::by_ref("broadcast chan", UPDATE),
        ],
        declaration: None,
        locations: vec![Location::normal("stable")],
        initial: "stable",
        transitions: vec![
            Transition::new("stable", "stable")
                .guard("shadow > MAX_LEVELS")
                .receive(UPDATE)
                .assign("official := MAX_LEVELS")
                .assign("shadow := MAX_LEVELS"),
            Transition::new("stable", "stable")
                .guard("shadow < 0")
                .receive(UPDATE)
                .assign("official := 0")
                .assign("shadow := 0"),
            Transition::new("stable", "stable")
                .guard("shadow >= 0 && shadow <= MAX_LEVELS")
                .receive(UPDATE)
                .assign("official := shadow"),
        ],
    }
}

/// Degradation: delay indexed by the target's level.
#[must_use]
pub fn unary_reaction_template() -> Template {
    reaction_template(
        TemplateKind::UnaryReaction,
        vec![
            Parameter::by_ref("int[0,MAX_LEVELS]", "target"),
            Parameter::by_ref("int", "target_shadow"),
            Parameter::by_value("const int", "time", "[MAX_LEVELS+1]"),
        ],
        "time[target]",
    )
}

/// Catalyzed transition: delay indexed by `[catalyst][target]`.
#[must_use]
pub fn binary_reaction_template() -> Template {
    reaction_template(
        TemplateKind::BinaryReaction,
        vec![
            Parameter::by_ref("int[0,MAX_LEVELS]", "catalyst"),
            Parameter::by_ref("int[0,MAX_LEVELS]", "target"),
            Parameter::by_ref("int", "target_shadow"),
            Parameter::by_value("const int", "time", "[MAX_LEVELS+1][MAX_LEVELS+1]"),
        ],
        "time[catalyst][target]",
    )
}

fn reaction_template(kind: TemplateKind, mut parameters: Vec<Parameter>, delay: &str) -> Template {
    parameters.extend([
        Parameter::by_value("const int", "delta", ""),
        Parameter::by_ref("broadcast chan", UPDATE),
        Parameter::by_ref("chan", REACTING),
        Parameter::by_ref("chan", NOT_REACTING),
    ]);

    let never = format!("{delay} == {INFINITE_TIME}");
    let armed = format!("{delay} != {INFINITE_TIME}");

    Template {
        kind,
        parameters,
        declaration: Some("clock c;"),
        locations: vec![
            Location::committed("start"),
            Location::normal("idle"),
            Location::committed("lookup"),
            Location::normal("never"),
            Location::normal("racing").with_invariant(format!("c <= {delay}")),
        ],
        initial: "start",
        transitions: vec![
            Transition::new("start", "never").guard(never.clone()),
            Transition::new("start", "racing").guard(armed.clone()).assign("c := 0"),
            Transition::new("never", "idle").send(NOT_REACTING).assign("c := 0"),
            Transition::new("racing", "idle")
                .guard(format!("c < {delay}"))
                .send(NOT_REACTING),
            Transition::new("racing", "idle")
                .guard(format!("c >= {delay}"))
                .send(REACTING)
                .assign("target_shadow := target_shadow + delta")
                .assign("c := 0"),
            Transition::new("idle", "lookup").receive(UPDATE),
            Transition::new("lookup", "never").guard(never),
            Transition::new("lookup", "racing")
                .guard(format!("{armed} && c > {delay}"))
                .assign(format!("c := {delay}")),
            Transition::new("lookup", "racing").guard(format!("{armed} && c <= {delay}")),
        ],
    }
}

/// Barrier: counts one report per reaction, then broadcasts `update`.
///
/// Only a `reacting` report opens a round.
#[must_use]
pub fn coordinator_template() -> Template {
    Template {
        kind: TemplateKind::Coordinator,
        parameters: vec![
            Parameter::by_value("const int", "total", ""),
            Parameter::by_ref("chan", REACTING),
            Parameter::by_ref("chan", NOT_REACTING),
            Parameter::by_ref("broadcast chan", UPDATE),
        ],
        declaration: Some("int counter;"),
        locations: vec![
            Location::normal("waiting"),
            Location::committed("counting").with_invariant("counter <= total"),
            Location::committed("ready"),
        ],
        initial: "waiting",
        transitions: vec![
            Transition::new("waiting", "counting").receive(REACTING).assign("counter := 1"),
            Transition::new("counting", "counting")
                .guard("counter < total")
                .receive(REACTING)
                .assign("counter := counter + 1"),
            Transition::new("counting", "counting")
                .guard("counter < total")
                .receive(NOT_REACTING)
                .assign("counter := counter + 1"),
            Transition::new("counting", "ready").guard("counter == total"),
            Transition::new("ready", "waiting").send(UPDATE).assign("counter := 0"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::template::{Sync, Urgency};

    #[test]
    fn test_templates_have_no_dangling_locations() {
        for t in standard_templates() {
            assert!(t.dangling_locations().is_empty(), "{} is dangling", t.kind);
        }
    }

    #[test]
    fn test_location_names_avoid_keywords() {
        use crate::compiler::naming::is_keyword;

        for t in standard_templates() {
            for l in &t.locations {
                let id = format!("{}_{}", t.kind.name(), l.name);
                assert!(!is_keyword(l.name), "{}.{} is a keyword", t.kind, l.name);
                assert!(!is_keyword(&id), "{id} is a keyword");
            }
        }
        assert!(unary_reaction_template().location("start").is_some());
    }

    #[test]
    fn test_emission_order() {
        let kinds: Vec<TemplateKind> = standard_templates().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TemplateKind::Substrate,
                TemplateKind::UnaryReaction,
                TemplateKind::BinaryReaction,
                TemplateKind::Coordinator
            ]
        );
    }

    #[test]
    fn test_substrate_guards_cover_all_shadow_values() {
        let t = substrate_template();
        let guards: Vec<&str> = t.outgoing("stable").filter_map(|t| t.guard.as_deref()).collect();
        assert_eq!(guards.len(), 3);
        assert!(guards.contains(&"shadow > MAX_LEVELS"));
        assert!(guards.contains(&"shadow < 0"));
        assert!(t
            .outgoing("stable")
            .all(|t| t.sync == Some(Sync::Receive(UPDATE))));
    }

    #[test]
    fn test_reaction_fire_edge_applies_delta_and_resets_clock() {
        let t = binary_reaction_template();
        let fire = t
            .transitions
            .iter()
            .find(|t| t.sync == Some(Sync::Send(REACTING)))
            .unwrap();
        assert_eq!(fire.source, "racing");
        assert_eq!(fire.guard.as_deref(), Some("c >= time[catalyst][target]"));
        assert_eq!(
            fire.assignments,
            vec!["target_shadow := target_shadow + delta", "c := 0"]
        );
    }

    #[test]
    fn test_reaction_lookup_is_committed_and_clamps_clock() {
        let t = unary_reaction_template();
        assert_eq!(t.location("lookup").unwrap().urgency, Urgency::Committed);
        let clamp = t
            .outgoing("lookup")
            .find(|t| t.assignments == vec!["c := time[target]".to_string()])
            .unwrap();
        assert!(clamp.guard.as_deref().unwrap().contains("c > time[target]"));
    }

    #[test]
    fn test_coordinator_opens_round_only_on_reacting() {
        let t = coordinator_template();
        let opening: Vec<&Transition> = t.outgoing("waiting").collect();
        assert_eq!(opening.len(), 1);
        assert_eq!(opening[0].sync, Some(Sync::Receive(REACTING)));
        assert_eq!(t.location("counting").unwrap().urgency, Urgency::Committed);
        assert_eq!(
            t.signature(),
            "const int total, chan &reacting, chan &not_reacting, broadcast chan &update"
        );
    }
}
