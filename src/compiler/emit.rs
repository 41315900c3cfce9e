//! Text rendering of the global declarations, the system section and the
//! full `nta` document.

use std::fmt::Write as _;

use crate::automata::{escape, Template, INFINITE_TIME, MAX_LEVELS, N_REACTIONS, N_SUBSTRATES};
use crate::compiler::naming::shadow_name;
use crate::compiler::network::{ProcessInstance, TableConstant};
use crate::config::CompilerConfig;
use crate::model::Model;

const PROLOGUE: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
<!DOCTYPE nta PUBLIC '-//Uppaal Team//DTD Flat System 1.1//EN' 'http://www.it.uu.se/research/group/darts/uppaal/flat-1_1.dtd'>\n";

/// Constants, clock, channels, variable pairs and table constants.
pub(crate) fn declarations(
    model: &Model,
    levels: u32,
    tables: &[TableConstant],
    config: &CompilerConfig,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "const int {INFINITE_TIME} = {};", config.infinite_time);
    let _ = writeln!(out, "const int {MAX_LEVELS} = {levels};");
    let _ = writeln!(out, "const int {N_SUBSTRATES} = {};", model.substrates().len());
    let _ = writeln!(out, "const int {N_REACTIONS} = {};", model.reactions().len());
    out.push('\n');

    let _ = writeln!(out, "clock {};", config.clock);
    let _ = writeln!(out, "broadcast chan {};", config.update_channel);
    let _ = writeln!(
        out,
        "chan {}, {};",
        config.reacting_channel, config.not_reacting_channel
    );

    if !model.substrates().is_empty() {
        out.push('\n');
    }
    for s in model.substrates() {
        let _ = writeln!(out, "int[0,{MAX_LEVELS}] {} = {};", s.id, s.initial_level);
        let _ = writeln!(out, "int {} = {};", shadow_name(&s.id), s.initial_level);
    }

    if !tables.is_empty() {
        out.push('\n');
    }
    for t in tables {
        out.push_str(&t.declaration());
        out.push('\n');
    }
    out
}

/// Instance assignments followed by the `system` line.
pub(crate) fn system(instances: &[ProcessInstance]) -> String {
    let mut out = String::new();
    for inst in instances {
        let _ = writeln!(out, "{inst}");
    }
    let names: Vec<&str> = instances.iter().map(|i| i.name.as_str()).collect();
    let _ = writeln!(out, "system {};", names.join(", "));
    out
}

/// Assembles the complete document.
pub(crate) fn document(
    declarations: &str,
    templates: &[Template],
    system: &str,
    config: &CompilerConfig,
) -> String {
    let mut out = String::new();
    if config.xml_prologue {
        out.push_str(PROLOGUE);
    }
    out.push_str("<nta>\n");
    let _ = writeln!(out, "<declaration>{}</declaration>", escape(declarations));
    for t in templates {
        t.write_xml(&mut out);
    }
    let _ = writeln!(out, "<system>{}</system>", escape(system));
    out.push_str("</nta>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::TemplateKind;
    use crate::delay::{Delay, DelayTable};
    use crate::model::{Increment, ReactionId};

    fn model() -> Model {
        Model::builder()
            .levels(2)
            .substrate("A", 1)
            .degradation(
                "r0",
                "A",
                Increment::Down,
                DelayTable::vector([Delay::Finite(5), Delay::Finite(3), Delay::Finite(0)]),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_declarations_layout() {
        let tables = vec![TableConstant {
            reaction: ReactionId::new("r0"),
            name: "A_deg_t".to_string(),
            table: DelayTable::vector([Delay::Finite(5), Delay::Finite(3), Delay::Finite(0)]),
        }];
        let text = declarations(&model(), 2, &tables, &CompilerConfig::default());
        let expected = "const int INFINITE_TIME = -1;\n\
const int MAX_LEVELS = 2;\n\
const int N_SUBSTRATES = 1;\n\
const int N_REACTIONS = 1;\n\
\n\
clock globalTime;\n\
broadcast chan update;\n\
chan reacting, not_reacting;\n\
\n\
int[0,MAX_LEVELS] A = 1;\n\
int A_shadow = 1;\n\
\n\
const int A_deg_t[MAX_LEVELS+1] = {5, 3, 0};\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_system_section() {
        let instances = vec![
            ProcessInstance {
                name: "A_substrate".to_string(),
                template: TemplateKind::Substrate,
                arguments: vec!["A".to_string(), "A_shadow".to_string(), "update".to_string()],
            },
            ProcessInstance {
                name: "Coord".to_string(),
                template: TemplateKind::Coordinator,
                arguments: vec![
                    "N_REACTIONS".to_string(),
                    "reacting".to_string(),
                    "not_reacting".to_string(),
                    "update".to_string(),
                ],
            },
        ];
        let text = system(&instances);
        assert!(text.ends_with("system A_substrate, Coord;\n"));
        assert!(text.contains("Coord = Coordinator(N_REACTIONS, reacting, not_reacting, update);\n"));
    }

    #[test]
    fn test_document_without_prologue() {
        let config = CompilerConfig {
            xml_prologue: false,
            ..CompilerConfig::default()
        };
        let text = document("int x = 1 < 2;", &[], "system P;", &config);
        assert!(text.starts_with("<nta>\n"));
        assert!(text.contains("<declaration>int x = 1 &lt; 2;</declaration>"));
        assert!(text.ends_with("<system>system P;</system>\n</nta>\n"));
    }
}
