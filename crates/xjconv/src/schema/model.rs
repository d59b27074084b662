//! Compiled schema model

/// A compiled schema: the global element declarations
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    pub elements: Vec<ElementDecl>,
}

impl Schema {
    /// Look up a global element declaration by name
    pub fn element(&self, name: &str) -> Option<&ElementDecl> {
        self.elements.iter().find(|decl| decl.name == name)
    }
}

/// Element declaration with its occurrence bounds
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementDecl {
    pub name: String,
    pub min_occurs: u32,
    pub max_occurs: MaxOccurs,
    pub content: ContentModel,
}

impl ElementDecl {
    /// Declaration occurring exactly once
    pub fn new(name: impl Into<String>, content: ContentModel) -> Self {
        Self {
            name: name.into(),
            min_occurs: 1,
            max_occurs: MaxOccurs::Bounded(1),
            content,
        }
    }

    /// Returns true if the declaration must appear at least once
    pub const fn is_required(&self) -> bool {
        self.min_occurs > 0
    }
}

/// Upper occurrence bound
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaxOccurs {
    Bounded(u32),
    Unbounded,
}

impl MaxOccurs {
    /// Returns true if `count` occurrences stay within the bound
    pub const fn allows(self, count: u32) -> bool {
        match self {
            Self::Bounded(max) => count <= max,
            Self::Unbounded => true,
        }
    }

    /// Returns true if more than one occurrence is allowed
    pub const fn is_repeated(self) -> bool {
        match self {
            Self::Bounded(max) => max > 1,
            Self::Unbounded => true,
        }
    }
}

/// Built-in simple types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimpleType {
    String,
}

/// What an element may contain
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentModel {
    Simple(SimpleType),
    Complex(Group),
}

/// Model group compositor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compositor {
    Sequence,
    All,
}

/// Model group of a complex type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub compositor: Compositor,
    pub particles: Vec<ElementDecl>,
}

impl Group {
    /// Sequence with no particles, used for complex types without a model group
    pub const fn empty() -> Self {
        Self {
            compositor: Compositor::Sequence,
            particles: Vec::new(),
        }
    }

    /// Look up a particle by element name
    pub fn particle(&self, name: &str) -> Option<&ElementDecl> {
        self.particles.iter().find(|decl| decl.name == name)
    }
}
