//! Typed timed-automaton templates and their UPPAAL XML rendering.

use std::fmt::{self, Write as _};

/// The four process templates of a compiled network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateKind {
    /// Official/shadow level pair.
    Substrate,
    /// Degradation reaction, one operand.
    UnaryReaction,
    /// Catalyzed transition, two operands.
    BinaryReaction,
    /// Round barrier.
    Coordinator,
}

impl TemplateKind {
    /// Template name as it appears in the generated network.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Substrate => "Substrate",
            Self::UnaryReaction => "UnaryReaction",
            Self::BinaryReaction => "BinaryReaction",
            Self::Coordinator => "Coordinator",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A formal template parameter, e.g. `broadcast chan &update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// UPPAAL type, e.g. `int[0,MAX_LEVELS]`.
    pub ty: &'static str,
    /// Parameter name.
    pub name: &'static str,
    /// Passed by reference (`&name`).
    pub by_ref: bool,
    /// Array suffix written after the name, e.g. `[MAX_LEVELS+1]`.
    pub dims: &'static str,
}

impl Parameter {
    pub(crate) const fn by_ref(ty: &'static str, name: &'static str) -> Self {
        Self {
            ty,
            name,
            by_ref: true,
            dims: "",
        }
    }

    pub(crate) const fn by_value(ty: &'static str, name: &'static str, dims: &'static str) -> Self {
        Self {
            ty,
            name,
            by_ref: false,
            dims,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amp = if self.by_ref { "&" } else { "" };
        write!(f, "{} {amp}{}{}", self.ty, self.name, self.dims)
    }
}

/// Whether time may pass in a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// Time may pass, subject to the invariant.
    Normal,
    /// No delay; the next transition must leave a committed location.
    Committed,
}

/// A template location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Location name, unique within its template.
    pub name: &'static str,
    /// Clock invariant, e.g. `c <= delay`.
    pub invariant: Option<String>,
    /// Whether time may pass here.
    pub urgency: Urgency,
}

impl Location {
    pub(crate) const fn normal(name: &'static str) -> Self {
        Self {
            name,
            invariant: None,
            urgency: Urgency::Normal,
        }
    }

    pub(crate) const fn committed(name: &'static str) -> Self {
        Self {
            name,
            invariant: None,
            urgency: Urgency::Committed,
        }
    }

    pub(crate) fn with_invariant(mut self, invariant: impl Into<String>) -> Self {
        self.invariant = Some(invariant.into());
        self
    }
}

/// Channel synchronisation on a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sync {
    /// `ch!`
    Send(&'static str),
    /// `ch?`
    Receive(&'static str),
}

impl fmt::Display for Sync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send(ch) => write!(f, "{ch}!"),
            Self::Receive(ch) => write!(f, "{ch}?"),
        }
    }
}

/// An edge between two locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Source location name.
    pub source: &'static str,
    /// Target location name.
    pub target: &'static str,
    /// Enabling condition.
    pub guard: Option<String>,
    /// Channel synchronisation, if any.
    pub sync: Option<Sync>,
    /// Updates, applied in order.
    pub assignments: Vec<String>,
}

impl Transition {
    pub(crate) const fn new(source: &'static str, target: &'static str) -> Self {
        Self {
            source,
            target,
            guard: None,
            sync: None,
            assignments: Vec::new(),
        }
    }

    pub(crate) fn guard(mut self, guard: impl Into<String>) -> Self {
        self.guard = Some(guard.into());
        self
    }

    pub(crate) fn send(mut self, channel: &'static str) -> Self {
        self.sync = Some(Sync::Send(channel));
        self
    }

    pub(crate) fn receive(mut self, channel: &'static str) -> Self {
        self.sync = Some(Sync::Receive(channel));
        self
    }

    pub(crate) fn assign(mut self, assignment: impl Into<String>) -> Self {
        self.assignments.push(assignment.into());
        self
    }
}

/// A parametrized process template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Which of the four templates this is.
    pub kind: TemplateKind,
    /// Formal parameters, in order.
    pub parameters: Vec<Parameter>,
    /// Local declarations (clocks).
    pub declaration: Option<&'static str>,
    /// Locations; `initial` names one of them.
    pub locations: Vec<Location>,
    /// Initial location name.
    pub initial: &'static str,
    /// Edges.
    pub transitions: Vec<Transition>,
}

impl Template {
    /// Looks up a location by name.
    #[must_use]
    pub fn location(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }

    /// Transitions leaving `location`, in declaration order.
    pub fn outgoing<'a>(&'a self, location: &'a str) -> impl Iterator<Item = &'a Transition> + 'a {
        self.transitions.iter().filter(move |t| t.source == location)
    }

    /// The formal parameter list, comma separated.
    #[must_use]
    pub fn signature(&self) -> String {
        self.parameters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Names of locations referenced by transitions or `initial` that are
    /// not declared.
    #[must_use]
    pub fn dangling_locations(&self) -> Vec<&'static str> {
        let mut missing: Vec<&'static str> = std::iter::once(self.initial)
            .chain(self.transitions.iter().flat_map(|t| [t.source, t.target]))
            .filter(|name| self.location(name).is_none())
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }

    fn location_id(&self, name: &str) -> String {
        format!("{}_{name}", self.kind.name())
    }

    /// Appends the `<template>` element to `out`.
    pub fn write_xml(&self, out: &mut String) {
        out.push_str("<template>\n");
        let _ = writeln!(out, "<name>{}</name>", self.kind.name());
        let _ = writeln!(out, "<parameter>{}</parameter>", escape(&self.signature()));
        if let Some(decl) = self.declaration {
            let _ = writeln!(out, "<declaration>{}</declaration>", escape(decl));
        }

        for (i, loc) in self.locations.iter().enumerate() {
            let _ = write!(
                out,
                "<location id=\"{}\" x=\"{}\" y=\"0\"><name>{}</name>",
                self.location_id(loc.name),
                i * 160,
                loc.name
            );
            if let Some(inv) = &loc.invariant {
                let _ = write!(out, "<label kind=\"invariant\">{}</label>", escape(inv));
            }
            if loc.urgency == Urgency::Committed {
                out.push_str("<committed/>");
            }
            out.push_str("</location>\n");
        }
        let _ = writeln!(out, "<init ref=\"{}\"/>", self.location_id(self.initial));

        for t in &self.transitions {
            let _ = write!(
                out,
                "<transition><source ref=\"{}\"/><target ref=\"{}\"/>",
                self.location_id(t.source),
                self.location_id(t.target)
            );
            if let Some(guard) = &t.guard {
                let _ = write!(out, "<label kind=\"guard\">{}</label>", escape(guard));
            }
            if let Some(sync) = &t.sync {
                let _ = write!(out, "<label kind=\"synchronisation\">{sync}</label>");
            }
            if !t.assignments.is_empty() {
                let _ = write!(
                    out,
                    "<label kind=\"assignment\">{}</label>",
                    escape(&t.assignments.join(", "))
                );
            }
            out.push_str("</transition>\n");
        }
        out.push_str("</template>\n");
    }
}

/// Escapes text for XML element content.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}
