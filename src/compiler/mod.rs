//! Model to automata-network compiler.
//!
//! Compilation is a pure, single pass over an immutable [`Model`]:
//!
//! 1. validate the configuration and the model,
//! 2. claim every derived global name,
//! 3. build the table constants and process instances,
//! 4. render declarations, templates and the system section.
//!
//! Nothing is rendered until steps 1 and 2 succeed, so a failed compilation
//! never yields partial output.

mod emit;
pub(crate) mod naming;
mod network;

use tracing::{debug, info, instrument, warn};

use crate::automata::{standard_templates, TemplateKind, N_REACTIONS};
use crate::config::CompilerConfig;
use crate::error::StructuralError;
use crate::model::{Model, ReactionKind};

pub use naming::{reaction_name, shadow_name, substrate_instance_name, table_name, COORDINATOR_INSTANCE};
pub use network::{parse_delay_constant, AutomataNetworkDescription, ProcessInstance, TableConstant};

use naming::NameRegistry;

/// Largest delay the target's default `int` range holds.
const MAX_TARGET_INT: u32 = 32_767;

/// Compiles a model with the default configuration.
///
/// # Errors
///
/// Returns a `StructuralError` if the model is invalid or a derived name
/// collides.
///
/// # Examples
///
/// ```
/// use levelnet::{compile, Delay, DelayTable, Increment, Model};
///
/// let model = Model::builder()
///     .levels(2)
///     .substrate("A", 1)
///     .degradation(
///         "r0",
///         "A",
///         Increment::Down,
///         DelayTable::vector([Delay::Finite(5), Delay::Finite(3), Delay::Finite(0)]),
///     )
///     .build()
///     .unwrap();
///
/// let network = compile(&model).unwrap();
/// assert_eq!(network.system_line(), Some("system A_substrate, A_deg, Coord;"));
/// ```
pub fn compile(model: &Model) -> Result<AutomataNetworkDescription, StructuralError> {
    Compiler::default().compile(model)
}

/// A configured compiler.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    /// A compiler using `config`.
    #[must_use]
    pub const fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles `model` into an automata-network description.
    ///
    /// # Errors
    ///
    /// Returns a `StructuralError` if the configuration or the model is
    /// invalid, or if two generated names collide.
    #[instrument(skip_all)]
    pub fn compile(&self, model: &Model) -> Result<AutomataNetworkDescription, StructuralError> {
        self.config.validate()?;
        let levels = model.validate()?;
        debug!(
            levels,
            substrates = model.substrates().len(),
            reactions = model.reactions().len(),
            "model validated"
        );

        let (instances, tables) = self.plan(model)?;

        for t in &tables {
            if let Some(max) = t.table.entries().filter_map(|d| d.ticks()).max() {
                if max > MAX_TARGET_INT {
                    warn!(table = %t.name, max, "delay exceeds the default int range of the target");
                }
            }
        }

        let declarations = emit::declarations(model, levels, &tables, &self.config);
        let system = emit::system(&instances);
        let text = emit::document(&declarations, &standard_templates(), &system, &self.config);

        let network = AutomataNetworkDescription {
            text,
            declarations,
            system,
            instances,
            tables,
            infinite_time: self.config.infinite_time,
        };
        info!(
            processes = network.instances.len(),
            tables = network.tables.len(),
            fingerprint = %network.fingerprint(),
            "network compiled"
        );
        Ok(network)
    }

    /// Claims all names and builds the instances in system-line order.
    fn plan(&self, model: &Model) -> Result<(Vec<ProcessInstance>, Vec<TableConstant>), StructuralError> {
        let config = &self.config;
        let mut names = NameRegistry::with_reserved(config);

        for s in model.substrates() {
            names.claim(s.id.as_str(), format!("substrate '{}'", s.id))?;
        }

        let mut instances = Vec::with_capacity(model.substrates().len() + model.reactions().len() + 1);
        for s in model.substrates() {
            let shadow = shadow_name(&s.id);
            let name = substrate_instance_name(&s.id);
            names.claim(&shadow, format!("shadow of substrate '{}'", s.id))?;
            names.claim(&name, format!("process of substrate '{}'", s.id))?;
            instances.push(ProcessInstance {
                name,
                template: TemplateKind::Substrate,
                arguments: vec![s.id.to_string(), shadow, config.update_channel.clone()],
            });
        }

        let mut tables = Vec::with_capacity(model.reactions().len());
        for r in model.reactions() {
            let name = reaction_name(r);
            let table = table_name(&name);
            names.claim(&name, format!("reaction '{}'", r.id))?;
            names.claim(&table, format!("delay table of reaction '{}'", r.id))?;

            let (template, mut arguments) = match &r.kind {
                ReactionKind::Degradation { target, .. } => (
                    TemplateKind::UnaryReaction,
                    vec![target.to_string(), shadow_name(target)],
                ),
                ReactionKind::CatalyzedTransition { catalyst, target, .. } => (
                    TemplateKind::BinaryReaction,
                    vec![catalyst.to_string(), target.to_string(), shadow_name(target)],
                ),
            };
            arguments.extend([
                table.clone(),
                r.increment().delta().to_string(),
                config.update_channel.clone(),
                config.reacting_channel.clone(),
                config.not_reacting_channel.clone(),
            ]);
            debug!(reaction = %r.id, process = %name, "reaction bound");

            instances.push(ProcessInstance {
                name,
                template,
                arguments,
            });
            tables.push(TableConstant {
                reaction: r.id.clone(),
                name: table,
                table: r.table().clone(),
            });
        }

        instances.push(ProcessInstance {
            name: COORDINATOR_INSTANCE.to_string(),
            template: TemplateKind::Coordinator,
            arguments: vec![
                N_REACTIONS.to_string(),
                config.reacting_channel.clone(),
                config.not_reacting_channel.clone(),
                config.update_channel.clone(),
            ],
        });

        Ok((instances, tables))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::{Delay, DelayTable};
    use crate::model::Increment;

    fn vector(times: &[u32]) -> DelayTable {
        DelayTable::vector(times.iter().copied().map(Delay::Finite))
    }

    fn example() -> Model {
        Model::builder()
            .levels(2)
            .substrate("A", 1)
            .degradation("r0", "A", Increment::Down, vector(&[5, 3, 0]))
            .build()
            .unwrap()
    }

    fn square(side: usize) -> DelayTable {
        DelayTable::matrix((0..side).map(|_| (0..side).map(|_| Delay::Never)))
    }

    #[test]
    fn test_compile_example() {
        let network = compile(&example()).unwrap();
        let decls = network.declarations();
        assert!(decls.contains("int[0,MAX_LEVELS] A = 1;"));
        assert!(decls.contains("int A_shadow = 1;"));
        assert!(decls.contains("const int A_deg_t[MAX_LEVELS+1] = {5, 3, 0};"));
        assert_eq!(
            network.instance("A_deg").unwrap().to_string(),
            "A_deg = UnaryReaction(A, A_shadow, A_deg_t, -1, update, reacting, not_reacting);"
        );
        assert_eq!(network.system_line(), Some("system A_substrate, A_deg, Coord;"));

        let names: Vec<&str> = network.instances().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["A_substrate", "A_deg", "Coord"]);
    }

    #[test]
    fn test_document_sections_in_order() {
        let text = compile(&example()).unwrap().to_string();
        let decl = text.find("<declaration>const int").unwrap();
        let first_template = text.find("<template>").unwrap();
        let system = text.find("<system>").unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(decl < first_template && first_template < system);
        assert_eq!(text.matches("<template>").count(), 4);
    }

    #[test]
    fn test_catalyzed_instance_arguments() {
        let model = Model::builder()
            .levels(1)
            .substrate("K", 0)
            .substrate("S", 1)
            .catalyzed("r0", "K", "S", Increment::Up, square(2))
            .build()
            .unwrap();
        let network = compile(&model).unwrap();
        assert_eq!(
            network.instance("K_S_r_up").unwrap().to_string(),
            "K_S_r_up = BinaryReaction(K, S, S_shadow, K_S_r_up_t, 1, update, reacting, not_reacting);"
        );
        assert!(network
            .declarations()
            .contains("const int K_S_r_up_t[MAX_LEVELS+1][MAX_LEVELS+1] = {\n\t{INFINITE_TIME, INFINITE_TIME},"));
    }

    #[test]
    fn test_duplicate_derived_name_fails() {
        let model = Model::builder()
            .levels(1)
            .substrate("K", 0)
            .substrate("S", 0)
            .catalyzed("r0", "K", "S", Increment::Up, square(2))
            .catalyzed("r1", "K", "S", Increment::Up, square(2))
            .build()
            .unwrap();
        let err = compile(&model).unwrap_err();
        assert!(matches!(err, StructuralError::DuplicateName { ref name, .. } if name == "K_S_r_up"));
    }

    #[test]
    fn test_substrate_colliding_with_reaction_name_fails() {
        let model = Model::builder()
            .levels(1)
            .substrate("A", 0)
            .substrate("A_deg", 0)
            .degradation("r0", "A", Increment::Down, vector(&[1, 1]))
            .build()
            .unwrap();
        assert!(matches!(
            compile(&model).unwrap_err(),
            StructuralError::DuplicateName { .. }
        ));
    }

    #[test]
    fn test_substrate_named_like_a_channel_fails() {
        let model = Model::builder().levels(1).substrate("update", 0).build().unwrap();
        let err = compile(&model).unwrap_err();
        assert!(format!("{err}").contains("reserved"));
    }

    #[test]
    fn test_dimension_mismatch_fails() {
        let err = Model::builder()
            .levels(2)
            .substrate("A", 0)
            .degradation("r0", "A", Increment::Down, vector(&[1, 2]))
            .build()
            .unwrap_err();
        assert!(matches!(err, StructuralError::TableDimensionMismatch { .. }));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let a = compile(&example()).unwrap();
        let b = compile(&example()).unwrap();
        assert_eq!(a.as_str(), b.as_str());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_tables_parse_back() {
        let model = Model::builder()
            .levels(1)
            .substrate("K", 0)
            .substrate("S", 1)
            .catalyzed(
                "r0",
                "K",
                "S",
                Increment::Down,
                DelayTable::matrix([[Delay::Never, Delay::Finite(4)], [Delay::Finite(0), Delay::Never]]),
            )
            .degradation("r1", "S", Increment::Down, DelayTable::vector([Delay::Never, Delay::Finite(2)]))
            .build()
            .unwrap();
        let network = compile(&model).unwrap();
        let parsed = network.parse_delay_constants().unwrap();
        assert_eq!(parsed.len(), 2);
        for (r, (name, table)) in model.reactions().iter().zip(parsed) {
            assert_eq!(network.table_for(r.id.as_str()).unwrap().name, name);
            assert_eq!(&table, r.table());
        }
    }

    #[test]
    fn test_custom_sentinel_and_channels() {
        let compiler = Compiler::new(CompilerConfig {
            infinite_time: -7,
            update_channel: "commit_round".to_string(),
            xml_prologue: false,
            ..CompilerConfig::default()
        });
        let network = compiler.compile(&example()).unwrap();
        assert!(network.declarations().contains("const int INFINITE_TIME = -7;"));
        assert!(network.declarations().contains("broadcast chan commit_round;"));
        assert!(network.as_str().starts_with("<nta>"));
        assert_eq!(network.infinite_time(), -7);
    }

    #[test]
    fn test_invalid_config_fails_before_model() {
        let compiler = Compiler::new(CompilerConfig {
            infinite_time: 3,
            ..CompilerConfig::default()
        });
        let unvalidated: Model = serde_json::from_str("{}").unwrap();
        let err = compiler.compile(&unvalidated).unwrap_err();
        assert!(matches!(err, StructuralError::InvalidConfig { .. }));
    }

    #[test]
    fn test_unvalidated_model_is_rejected() {
        let unvalidated: Model = serde_json::from_str(r#"{"substrates": [{"id": "A", "initial_level": 0}]}"#).unwrap();
        assert_eq!(compile(&unvalidated).unwrap_err(), StructuralError::MissingLevels);
    }
}
