//! Automaton template library.
//!
//! Templates are built as typed values ([`Template`]) and rendered to the
//! UPPAAL XML format by the compiler. Keeping them typed lets tests inspect
//! guards and synchronisations without parsing XML.

mod library;
mod template;

pub use library::{
    binary_reaction_template, coordinator_template, standard_templates, substrate_template,
    unary_reaction_template, INFINITE_TIME, MAX_LEVELS, NOT_REACTING, N_REACTIONS, N_SUBSTRATES,
    REACTING, UPDATE,
};
pub use template::{escape, Location, Parameter, Sync, Template, TemplateKind, Transition, Urgency};
