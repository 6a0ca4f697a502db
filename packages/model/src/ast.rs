use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Form document: one root element plus non-structural metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub status: FormStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub root: Element,
}

/// Publication status of a form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// One node of the form tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,

    /// Display label shown in the editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Visibility rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<ConditionalLogic>,

    /// Validation rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<ConditionalLogic>,

    /// Value-derivation rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derive_value: Option<ConditionalLogic>,

    #[serde(flatten)]
    pub kind: ElementKind,
}

/// Kind-specific attributes, discriminated by the `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ElementKind {
    Root {
        #[serde(default)]
        children: Vec<Arc<Element>>,
    },

    /// One page of a multi-step form
    Step {
        #[serde(default)]
        children: Vec<Arc<Element>>,
    },

    /// Layout grouping
    Container {
        #[serde(default)]
        children: Vec<Arc<Element>>,
    },

    /// Horizontal layout grouping
    Row {
        #[serde(default)]
        children: Vec<Arc<Element>>,
    },

    /// Container whose children are repeated once per answer entry
    ReplicatingContainer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_items: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_items: Option<u32>,
        #[serde(default)]
        children: Vec<Arc<Element>>,
    },

    TextField {
        #[serde(default)]
        multiline: bool,
    },

    NumberField {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },

    DateField {},

    Select {
        #[serde(default)]
        options: Vec<SelectOption>,
    },

    Checkbox {},

    Table {
        #[serde(default)]
        columns: Vec<String>,
    },

    /// Static text block
    Paragraph {
        #[serde(default)]
        text: String,
    },

    Attachment {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_files: Option<u32>,
    },
}

/// Fieldless discriminant of [`ElementKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementType {
    Root,
    Step,
    Container,
    Row,
    ReplicatingContainer,
    TextField,
    NumberField,
    DateField,
    Select,
    Checkbox,
    Table,
    Paragraph,
    Attachment,
}

/// Option of a select field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// Conditional-logic expression attached to an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalLogic {
    pub kind: LogicKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_set: Option<ConditionSet>,
    /// Opaque body of a custom implementation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogicKind {
    /// Declarative expression built in the editor
    NoCode,
    Custom,
}

/// Boolean composition of conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub operator: LogicalOperator,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub condition_sets: Vec<ConditionSet>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

/// Leaf condition; `reference` and `target` hold element identifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Comparison performed at run time (e.g. "equals", "isEmpty")
    #[serde(rename = "type")]
    pub comparison: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl Form {
    pub fn new(id: impl Into<String>, title: impl Into<String>, root: Element) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: FormStatus::Draft,
            owner: None,
            root,
        }
    }
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Root => "root",
            ElementType::Step => "step",
            ElementType::Container => "container",
            ElementType::Row => "row",
            ElementType::ReplicatingContainer => "replicatingContainer",
            ElementType::TextField => "textField",
            ElementType::NumberField => "numberField",
            ElementType::DateField => "dateField",
            ElementType::Select => "select",
            ElementType::Checkbox => "checkbox",
            ElementType::Table => "table",
            ElementType::Paragraph => "paragraph",
            ElementType::Attachment => "attachment",
        }
    }

    /// Whether elements of this type own a child sequence
    pub fn has_children(&self) -> bool {
        matches!(
            self,
            ElementType::Root
                | ElementType::Step
                | ElementType::Container
                | ElementType::Row
                | ElementType::ReplicatingContainer
        )
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ElementKind {
    /// Default attributes for a freshly added element of the given type
    pub fn default_for(element_type: ElementType) -> Self {
        match element_type {
            ElementType::Root => ElementKind::Root { children: vec![] },
            ElementType::Step => ElementKind::Step { children: vec![] },
            ElementType::Container => ElementKind::Container { children: vec![] },
            ElementType::Row => ElementKind::Row { children: vec![] },
            ElementType::ReplicatingContainer => ElementKind::ReplicatingContainer {
                min_items: None,
                max_items: None,
                children: vec![],
            },
            ElementType::TextField => ElementKind::TextField { multiline: false },
            ElementType::NumberField => ElementKind::NumberField { min: None, max: None },
            ElementType::DateField => ElementKind::DateField {},
            ElementType::Select => ElementKind::Select { options: vec![] },
            ElementType::Checkbox => ElementKind::Checkbox {},
            ElementType::Table => ElementKind::Table { columns: vec![] },
            ElementType::Paragraph => ElementKind::Paragraph { text: String::new() },
            ElementType::Attachment => ElementKind::Attachment { max_files: None },
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::Root { .. } => ElementType::Root,
            ElementKind::Step { .. } => ElementType::Step,
            ElementKind::Container { .. } => ElementType::Container,
            ElementKind::Row { .. } => ElementType::Row,
            ElementKind::ReplicatingContainer { .. } => ElementType::ReplicatingContainer,
            ElementKind::TextField { .. } => ElementType::TextField,
            ElementKind::NumberField { .. } => ElementType::NumberField,
            ElementKind::DateField { .. } => ElementType::DateField,
            ElementKind::Select { .. } => ElementType::Select,
            ElementKind::Checkbox { .. } => ElementType::Checkbox,
            ElementKind::Table { .. } => ElementType::Table,
            ElementKind::Paragraph { .. } => ElementType::Paragraph,
            ElementKind::Attachment { .. } => ElementType::Attachment,
        }
    }

    pub fn children(&self) -> Option<&Vec<Arc<Element>>> {
        match self {
            ElementKind::Root { children }
            | ElementKind::Step { children }
            | ElementKind::Container { children }
            | ElementKind::Row { children }
            | ElementKind::ReplicatingContainer { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Arc<Element>>> {
        match self {
            ElementKind::Root { children }
            | ElementKind::Step { children }
            | ElementKind::Container { children }
            | ElementKind::Row { children }
            | ElementKind::ReplicatingContainer { children, .. } => Some(children),
            _ => None,
        }
    }
}

impl Element {
    pub fn new(id: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            name: None,
            is_visible: None,
            validate: None,
            derive_value: None,
            kind,
        }
    }

    /// Default-initialized element of the given type
    pub fn of_type(id: impl Into<String>, element_type: ElementType) -> Self {
        Self::new(id, ElementKind::default_for(element_type))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_visibility(mut self, logic: ConditionalLogic) -> Self {
        self.is_visible = Some(logic);
        self
    }

    pub fn with_validation(mut self, logic: ConditionalLogic) -> Self {
        self.validate = Some(logic);
        self
    }

    pub fn with_derived_value(mut self, logic: ConditionalLogic) -> Self {
        self.derive_value = Some(logic);
        self
    }

    /// Replace the child sequence; no-op for kinds without children
    pub fn with_children(mut self, new_children: Vec<Element>) -> Self {
        if let Some(children) = self.kind.children_mut() {
            *children = new_children.into_iter().map(Arc::new).collect();
        }
        self
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    pub fn children(&self) -> Option<&Vec<Arc<Element>>> {
        self.kind.children()
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Arc<Element>>> {
        self.kind.children_mut()
    }

    pub fn has_children(&self) -> bool {
        self.kind.children().is_some()
    }

    /// Name if set, otherwise the identifier
    pub fn display_title(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Attached conditional-logic slots that are set
    pub fn logic(&self) -> impl Iterator<Item = &ConditionalLogic> {
        [&self.is_visible, &self.validate, &self.derive_value]
            .into_iter()
            .flatten()
    }

    pub fn logic_mut(&mut self) -> impl Iterator<Item = &mut ConditionalLogic> {
        [
            &mut self.is_visible,
            &mut self.validate,
            &mut self.derive_value,
        ]
        .into_iter()
        .flatten()
    }

    /// Pre-order traversal starting at (and including) this element
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        self.pre_order().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Child-index path from this element to the element with `id`
    ///
    /// Empty path means `id` is this element.
    pub fn path_to(&self, id: &str) -> Option<Vec<usize>> {
        if self.id == id {
            return Some(Vec::new());
        }

        for (index, child) in self.children()?.iter().enumerate() {
            if let Some(mut path) = child.path_to(id) {
                path.insert(0, index);
                return Some(path);
            }
        }

        None
    }

    /// Parent of the element with `id` and the element's index in it
    pub fn parent_of(&self, id: &str) -> Option<(&Element, usize)> {
        let children = self.children()?;

        if let Some(index) = children.iter().position(|c| c.id == id) {
            return Some((self, index));
        }

        children.iter().find_map(|child| child.parent_of(id))
    }
}

/// Iterator returned by [`Element::pre_order`]
pub struct PreOrder<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;

        if let Some(children) = next.children() {
            self.stack.extend(children.iter().rev().map(|c| c.as_ref()));
        }

        Some(next)
    }
}

impl ConditionalLogic {
    pub fn no_code(condition_set: ConditionSet) -> Self {
        Self {
            kind: LogicKind::NoCode,
            condition_set: Some(condition_set),
            implementation: None,
            description: None,
        }
    }

    pub fn custom(implementation: impl Into<String>) -> Self {
        Self {
            kind: LogicKind::Custom,
            condition_set: None,
            implementation: Some(implementation.into()),
            description: None,
        }
    }
}

impl ConditionSet {
    pub fn new(operator: LogicalOperator) -> Self {
        Self {
            id: None,
            operator,
            conditions: Vec::new(),
            condition_sets: Vec::new(),
        }
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            ..Self::new(LogicalOperator::And)
        }
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            conditions,
            ..Self::new(LogicalOperator::Or)
        }
    }

    pub fn with_set(mut self, set: ConditionSet) -> Self {
        self.condition_sets.push(set);
        self
    }
}

impl Condition {
    pub fn new(comparison: impl Into<String>) -> Self {
        Self {
            id: None,
            comparison: comparison.into(),
            reference: None,
            target: None,
            value: None,
        }
    }

    /// `equals` comparison of the element `reference` against a literal value
    pub fn equals(reference: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            reference: Some(reference.into()),
            value: Some(value),
            ..Self::new("equals")
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}
