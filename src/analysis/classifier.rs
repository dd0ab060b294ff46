//! Resolves a block's logical type, parent and grandparent.
//!
//! Every block is described by the node that logically owns it. Grammars
//! disagree on how `else` is represented, and some nest blocks inside
//! block-like wrappers, so the owner is not always the direct parent:
//!
//! - a non-canonical block kind (`constructor_body`, `switch_case`) is its
//!   own type;
//! - an else branch is typed as the else clause (or the synthetic `else`
//!   kind where the grammar only has a token);
//! - an `if` continuing an else chain is typed as `elif`;
//! - a canonical block directly inside a non-canonical block wrapper is
//!   reported as the wrapper, which folds it like any nested block.
//!
//! The parent of an else branch is the statement owning the else. Any other
//! block's parent is the description of its containing block, and the
//! grandparent applies the same rule one containing block higher.

use tree_sitter::Node;

use super::extractor::ErrorFlag;
use super::profile::{ElseShape, LanguageProfile, NodeCategory};
use super::walk::ancestors;
use crate::error::ExtractError;

/// Resolved lineage of one block. Kinds are categorized profile kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineage {
    pub block_type: &'static str,
    pub parent: &'static str,
    pub num_siblings: i64,
    /// `None` when the containing block is the root.
    pub grandparent: Option<&'static str>,
    pub num_cousins: i64,
}

/// Where a block sits: its type, its owner and its containing block.
struct Placement<'tree> {
    block_type: &'static str,
    owner: Node<'tree>,
    containing: Node<'tree>,
}

pub struct Classifier<'a> {
    profile: &'a LanguageProfile,
}

impl<'a> Classifier<'a> {
    pub fn new(profile: &'a LanguageProfile) -> Self {
        Self { profile }
    }

    /// The node a query match is reported as.
    ///
    /// A canonical block sitting directly in a `constructor_body` or
    /// `switch_case` belongs to that wrapper, which is scanned in its place.
    pub fn reported_block<'tree>(&self, block: Node<'tree>) -> Node<'tree> {
        let canonical = self.profile.canonical_block_kind();
        if block.kind() != canonical {
            return block;
        }
        match block.parent() {
            Some(owner) if owner.kind() != canonical && self.profile.is_block(owner.kind()) => {
                owner
            }
            _ => block,
        }
    }

    /// Resolve the lineage of `block`. Returns `Ok(None)` when the flag was
    /// raised on the way.
    pub fn classify(
        &self,
        block: Node<'_>,
        flag: &mut ErrorFlag,
    ) -> Result<Option<Lineage>, ExtractError> {
        let Some(placement) = self.place(block, flag)? else {
            return Ok(None);
        };
        let Some(parent) = self.parent_kind(&placement, flag)? else {
            return Ok(None);
        };
        let num_siblings = placement.containing.named_child_count() as i64;

        if placement.containing.kind() == self.profile.root_kind() {
            return Ok(Some(Lineage {
                block_type: placement.block_type,
                parent,
                num_siblings,
                grandparent: None,
                num_cousins: 0,
            }));
        }

        let Some(outer) = self.place(placement.containing, flag)? else {
            return Ok(None);
        };
        let Some(grandparent) = self.parent_kind(&outer, flag)? else {
            return Ok(None);
        };
        Ok(Some(Lineage {
            block_type: placement.block_type,
            parent,
            num_siblings,
            grandparent: Some(grandparent),
            num_cousins: outer.containing.named_child_count() as i64,
        }))
    }

    /// Type, owner and containing block of a block or container node.
    ///
    /// Braces inside a block wrapper are placed as the wrapper.
    fn place<'tree>(
        &self,
        block: Node<'tree>,
        flag: &mut ErrorFlag,
    ) -> Result<Option<Placement<'tree>>, ExtractError> {
        let profile = self.profile;
        let tables = profile.tables();
        let Some(owner) = block.parent() else {
            flag.raise(block, "block without owner");
            return Ok(None);
        };
        if !owner.is_named() || profile.is_error(owner.kind()) {
            flag.raise(owner, "malformed block owner");
            return Ok(None);
        }
        let owner_kind = owner.kind();
        let owner_category = profile.category(owner_kind);

        let mut search_from = Some(owner);
        let block_type = if block.kind() != profile.canonical_block_kind() {
            block.kind()
        } else if matches!(tables.else_shape, ElseShape::Clause(clause) if clause == owner_kind) {
            owner_kind
        } else if let Some(token) = self.else_token_before(block) {
            token
        } else if owner_category == Some(NodeCategory::Body)
            || owner_kind == profile.canonical_block_kind()
        {
            owner_kind
        } else if owner_category == Some(NodeCategory::Block) {
            search_from = owner.parent();
            owner_kind
        } else if owner_kind == tables.if_kind && self.continues_else_chain(owner) {
            tables.elif_kind
        } else {
            self.require(owner)?
        };

        let Some(containing) = search_from.and_then(|start| self.containing_block(start, flag))
        else {
            if !flag.is_raised() {
                flag.raise(block, "no containing block");
            }
            return Ok(None);
        };
        Ok(Some(Placement {
            block_type,
            owner,
            containing,
        }))
    }

    /// Kind of the node the placed block hangs off.
    fn parent_kind(
        &self,
        placement: &Placement<'_>,
        flag: &mut ErrorFlag,
    ) -> Result<Option<&'static str>, ExtractError> {
        let tables = self.profile.tables();
        if placement.block_type != tables.else_shape.kind() {
            return self.describe(placement.containing, flag);
        }
        let statement = match tables.else_shape {
            ElseShape::Clause(_) => placement.owner.parent(),
            ElseShape::Token(_) => Some(placement.owner),
        };
        match statement {
            Some(statement) => self.require(statement).map(Some),
            None => {
                flag.raise(placement.owner, "else without statement");
                Ok(None)
            }
        }
    }

    /// Describe a containing block by the kind that logically owns it.
    fn describe(
        &self,
        container: Node<'_>,
        flag: &mut ErrorFlag,
    ) -> Result<Option<&'static str>, ExtractError> {
        let profile = self.profile;
        if container.kind() == profile.root_kind() {
            return Ok(Some(profile.root_kind()));
        }
        if container.kind() == profile.canonical_block_kind() {
            return Ok(self.place(container, flag)?.map(|p| p.block_type));
        }
        match ancestors(container).find(|n| !profile.is_pass_through(n.kind())) {
            Some(owner) if profile.is_error(owner.kind()) => {
                flag.raise(owner, "error node owns container");
                Ok(None)
            }
            Some(owner) => self.require(owner).map(Some),
            None => Ok(Some(profile.root_kind())),
        }
    }

    /// Nearest ancestor-or-self that delimits a containing block.
    fn containing_block<'tree>(
        &self,
        start: Node<'tree>,
        flag: &mut ErrorFlag,
    ) -> Option<Node<'tree>> {
        for node in std::iter::once(start).chain(ancestors(start)) {
            if self.profile.is_error(node.kind()) {
                flag.raise(node, "error node above block");
                return None;
            }
            if self.profile.is_containing_block(node.kind()) {
                return Some(node);
            }
        }
        None
    }

    /// The synthetic else kind when `block` follows an `else` token.
    fn else_token_before(&self, block: Node<'_>) -> Option<&'static str> {
        match self.profile.tables().else_shape {
            ElseShape::Token(token) => block
                .prev_sibling()
                .filter(|prev| prev.kind() == token)
                .map(|_| token),
            ElseShape::Clause(_) => None,
        }
    }

    /// Whether an `if` statement is the else branch of another `if`.
    fn continues_else_chain(&self, if_statement: Node<'_>) -> bool {
        match self.profile.tables().else_shape {
            ElseShape::Clause(clause) => if_statement.parent().is_some_and(|p| p.kind() == clause),
            ElseShape::Token(token) => if_statement
                .prev_sibling()
                .is_some_and(|prev| prev.kind() == token),
        }
    }

    /// The node's kind, which must be categorized.
    fn require(&self, node: Node<'_>) -> Result<&'static str, ExtractError> {
        let kind = node.kind();
        if self.profile.category(kind).is_some() {
            return Ok(kind);
        }
        tracing::warn!(
            language = self.profile.language(),
            kind,
            line = node.start_position().row + 1,
            "node kind has no category"
        );
        Err(ExtractError::UnknownNodeKind {
            language: self.profile.language(),
            kind: kind.to_string(),
            line: node.start_position().row + 1,
        })
    }
}
