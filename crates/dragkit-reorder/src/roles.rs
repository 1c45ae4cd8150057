#![forbid(unsafe_code)]

//! Conventional list roles from the originating resume-builder domain.
//!
//! The engine itself is container-kind-agnostic; these are the three list
//! roles the host binds once the document is ready. Anything else can be
//! bound directly through [`ReorderEngine::bind`].

use dragkit_core::tree::{NodeId, NodeTree, Selector};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::ReorderEngine;

/// A known reorderable list role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ContainerKind {
    /// Work experience entries.
    Experience,
    /// Education entries.
    Education,
    /// Skill tags.
    SkillTag,
}

impl ContainerKind {
    /// All known roles.
    pub const ALL: [ContainerKind; 3] = [Self::Experience, Self::Education, Self::SkillTag];

    /// The class token items of this role carry.
    #[must_use]
    pub const fn item_class(&self) -> &'static str {
        match self {
            Self::Experience => "experience-entry",
            Self::Education => "education-entry",
            Self::SkillTag => "skill-tag",
        }
    }

    /// Selector matching this role's items.
    #[must_use]
    pub fn selector(&self) -> Selector {
        Selector::class(self.item_class())
    }
}

/// Bind each supplied `(role, root)` pair with the default configuration.
///
/// Roots that are missing from the tree or match nothing yield no-op
/// bindings, same as [`ReorderEngine::bind`].
pub fn bind_known_lists(
    engine: &mut ReorderEngine,
    tree: &NodeTree,
    roots: &[(ContainerKind, NodeId)],
) {
    for &(kind, root) in roots {
        engine.bind(tree, root, kind.selector());
    }
}
