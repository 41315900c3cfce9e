//! Derived names for generated globals and process instances.
//!
//! Every name the compiler emits is claimed in a [`NameRegistry`] first,
//! so any collision is reported before output is produced.

use std::collections::HashMap;

use crate::automata::{TemplateKind, INFINITE_TIME, MAX_LEVELS, N_REACTIONS, N_SUBSTRATES};
use crate::config::CompilerConfig;
use crate::error::StructuralError;
use crate::model::{Reaction, ReactionKind, SubstrateId};

/// Instance name of the single coordinator process.
pub const COORDINATOR_INSTANCE: &str = "Coord";

/// Words the target language reserves.
pub(crate) const KEYWORDS: &[&str] = &[
    "and", "assign", "bool", "broadcast", "chan", "clock", "commit", "const", "deadline",
    "default", "do", "double", "else", "exists", "false", "for", "forall", "guard", "if", "imply",
    "init", "int", "meta", "not", "or", "priority", "process", "progress", "return", "scalar",
    "select", "state", "struct", "sum", "sync", "system", "trans", "true", "typedef", "urgent",
    "void", "while",
];

/// True if `name` is reserved by the target language.
pub(crate) fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Process name of a reaction: `<target>_deg` for degradations,
/// `<catalyst>_<target>_r_<up|down>` for catalyzed transitions.
#[must_use]
pub fn reaction_name(reaction: &Reaction) -> String {
    match &reaction.kind {
        ReactionKind::Degradation { target, .. } => format!("{target}_deg"),
        ReactionKind::CatalyzedTransition {
            catalyst,
            target,
            increment,
            ..
        } => format!("{catalyst}_{target}_r_{}", increment.suffix()),
    }
}

/// Global holding a substrate's pending level.
#[must_use]
pub fn shadow_name(id: &SubstrateId) -> String {
    format!("{id}_shadow")
}

/// Process name of a substrate.
#[must_use]
pub fn substrate_instance_name(id: &SubstrateId) -> String {
    format!("{id}_substrate")
}

/// Constant holding a reaction's delay table.
#[must_use]
pub fn table_name(reaction_name: &str) -> String {
    format!("{reaction_name}_t")
}

/// Tracks which entity owns each generated global name.
#[derive(Debug, Default)]
pub(crate) struct NameRegistry {
    owners: HashMap<String, String>,
}

impl NameRegistry {
    /// A registry pre-loaded with keywords, constants, channel and template
    /// names.
    pub(crate) fn with_reserved(config: &CompilerConfig) -> Self {
        let mut owners = HashMap::new();
        let fixed = [INFINITE_TIME, MAX_LEVELS, N_SUBSTRATES, N_REACTIONS, COORDINATOR_INSTANCE];
        let templates = [
            TemplateKind::Substrate,
            TemplateKind::UnaryReaction,
            TemplateKind::BinaryReaction,
            TemplateKind::Coordinator,
        ]
        .map(TemplateKind::name);

        for name in KEYWORDS
            .iter()
            .copied()
            .chain(fixed)
            .chain(templates)
            .chain(config.reserved_names())
        {
            owners.insert(name.to_string(), "a reserved name".to_string());
        }
        Self { owners }
    }

    /// Claims `name` for `owner`.
    pub(crate) fn claim(&mut self, name: &str, owner: impl Into<String>) -> Result<(), StructuralError> {
        if let Some(existing) = self.owners.get(name) {
            return Err(StructuralError::DuplicateName {
                name: name.to_string(),
                owner: owner.into(),
                existing: existing.clone(),
            });
        }
        self.owners.insert(name.to_string(), owner.into());
        Ok(())
    }
}
