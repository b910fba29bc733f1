//! Per-branch validation state: instance path, dynamic scope, dialect.

use std::rc::Rc;

use serde_json::Value;
use url::Url;

use crate::path::ValidationPath;
use crate::resolver::join_id;
use crate::types::Dialect;
use crate::vocabulary::VocabularySet;

/// Keywords whose values are instance data, never subschemas.
pub(crate) const DATA_KEYWORDS: &[&str] = &["const", "enum", "default", "examples"];

/// One schema resource on the dynamic scope stack.
#[derive(Debug)]
pub struct ScopeFrame<'a> {
    id: Option<&'a str>,
    anchors: Vec<(&'a str, &'a Value)>,
}

impl<'a> ScopeFrame<'a> {
    /// Build the frame for a resource, collecting the `$dynamicAnchor`s it
    /// declares. Nested resources (subschemas with their own `$id`) are
    /// skipped; they get their own frame when entered.
    pub fn for_resource(resource: &'a Value) -> Self {
        let mut anchors = Vec::new();
        collect_dynamic_anchors(resource, true, &mut anchors);
        Self {
            id: resource.get("$id").and_then(Value::as_str),
            anchors,
        }
    }

    /// The resource's `$id`, if it has one.
    pub fn id(&self) -> Option<&'a str> {
        self.id
    }

    /// The subschema bound to `$dynamicAnchor: name` in this resource.
    pub fn anchor(&self, name: &str) -> Option<&'a Value> {
        self.anchors
            .iter()
            .find(|(anchor, _)| *anchor == name)
            .map(|(_, schema)| *schema)
    }
}

fn collect_dynamic_anchors<'a>(
    node: &'a Value,
    is_resource_root: bool,
    anchors: &mut Vec<(&'a str, &'a Value)>,
) {
    match node {
        Value::Object(map) => {
            if !is_resource_root && map.get("$id").map(Value::is_string).unwrap_or(false) {
                return;
            }
            if let Some(name) = map.get("$dynamicAnchor").and_then(Value::as_str) {
                anchors.push((name, node));
            }
            for (key, child) in map {
                if !DATA_KEYWORDS.contains(&key.as_str()) {
                    collect_dynamic_anchors(child, false, anchors);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_dynamic_anchors(item, false, anchors);
            }
        }
        _ => {}
    }
}

#[derive(Debug)]
struct ScopeLink<'a> {
    frame: ScopeFrame<'a>,
    outer: Option<Rc<ScopeLink<'a>>>,
}

/// State threaded through one branch of a validation walk.
///
/// Contexts are never mutated: each descent derives a child. Scope frames
/// are shared with the parent, so leaving a subtree (dropping its context)
/// pops exactly the frames that subtree pushed.
#[derive(Debug, Clone)]
pub struct ValidationContext<'a> {
    path: ValidationPath,
    scope: Option<Rc<ScopeLink<'a>>>,
    /// URI of the innermost enclosing resource; relative references join it.
    base: Option<Rc<Url>>,
    dialect: Dialect,
    vocabulary: Option<VocabularySet<'a>>,
    depth: usize,
}

impl<'a> ValidationContext<'a> {
    /// Context at the instance root, with nothing on the scope stack.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            path: ValidationPath::root(),
            scope: None,
            base: None,
            dialect,
            vocabulary: None,
            depth: 0,
        }
    }

    pub fn path(&self) -> &ValidationPath {
        &self.path
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn base(&self) -> Option<&Url> {
        self.base.as_deref()
    }

    pub fn vocabulary(&self) -> Option<VocabularySet<'a>> {
        self.vocabulary
    }

    /// Frames on the dynamic scope stack, outermost first.
    pub fn dynamic_scope(&self) -> Vec<&ScopeFrame<'a>> {
        let mut frames = Vec::new();
        let mut link = self.scope.as_deref();
        while let Some(l) = link {
            frames.push(&l.frame);
            link = l.outer.as_deref();
        }
        frames.reverse();
        frames
    }

    /// Child context for a property of the current instance.
    pub fn property(&self, name: &str) -> Self {
        self.descend(self.path.property(name))
    }

    /// Child context for an array element of the current instance.
    pub fn index(&self, index: usize) -> Self {
        self.descend(self.path.index(index))
    }

    /// Child context for a subschema applied to the same instance
    /// (`allOf`, `$ref`, `if`, ...).
    pub fn in_place(&self) -> Self {
        self.descend(self.path.clone())
    }

    /// Child context for the target of a `$ref`/`$dynamicRef`, living in the
    /// resource at `base` when given. Only these hops count toward the depth
    /// limit, since only they can cycle.
    pub fn follow_reference(&self, base: Option<Url>) -> Self {
        let mut ctx = self.in_place();
        ctx.depth += 1;
        if let Some(base) = base {
            ctx.base = Some(Rc::new(base));
        }
        ctx
    }

    fn descend(&self, path: ValidationPath) -> Self {
        Self {
            path,
            scope: self.scope.clone(),
            base: self.base.clone(),
            dialect: self.dialect,
            vocabulary: self.vocabulary,
            depth: self.depth,
        }
    }

    /// Context for evaluating the keywords of `schema` itself.
    ///
    /// Applies the node's `$schema` dialect and `$vocabulary` declaration, and
    /// pushes a scope frame when the node is a resource boundary.
    pub fn enter(&self, schema: &'a Value) -> Self {
        let mut ctx = self.clone();
        if let Some(dialect) = Dialect::of(schema) {
            ctx.dialect = dialect;
        }
        if let Some(vocabulary) = VocabularySet::declared_by(schema) {
            ctx.vocabulary = Some(vocabulary);
        }
        if let Some(url) = schema
            .get("$id")
            .and_then(Value::as_str)
            .and_then(|id| join_id(self.base(), id))
        {
            ctx.base = Some(Rc::new(url));
        }
        if is_resource_boundary(schema) {
            ctx.scope = Some(Rc::new(ScopeLink {
                frame: ScopeFrame::for_resource(schema),
                outer: self.scope.clone(),
            }));
        }
        ctx
    }
}

fn is_resource_boundary(schema: &Value) -> bool {
    schema.get("$id").map(Value::is_string).unwrap_or(false)
        || schema
            .get("$dynamicAnchor")
            .map(Value::is_string)
            .unwrap_or(false)
}
