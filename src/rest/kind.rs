//! Static resource-kind table.
//!
//! Each [`ResourceKind`] knows its URL segment, whether it carries custom
//! fields, whether the remote can merge two of its records, and which
//! nested collections ([`Relation`]s) hang off one of its records.

use std::fmt;

/// A relation declared on a resource kind.
///
/// The relation's name is the target's URL segment, so a person's deals live
/// under `persons/{id}/deals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relation {
    /// The accessor name, also the nested URL segment.
    pub name: &'static str,
    /// The kind of the records in the nested collection.
    pub target: ResourceKind,
}

impl Relation {
    const fn to(target: ResourceKind) -> Self {
        Self {
            name: target.segment(),
            target,
        }
    }
}

/// The kinds of records the object model knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Person,
    Organization,
    Deal,
    Product,
    Stage,
    Pipeline,
    User,
    Activity,
    EmailMessage,
    EmailThread,
    File,
    Filter,
    Note,
    Goal,
}

const PERSON_RELATIONS: &[Relation] = &[
    Relation::to(ResourceKind::Deal),
    Relation::to(ResourceKind::Activity),
    Relation::to(ResourceKind::File),
    Relation::to(ResourceKind::Product),
];
const ORGANIZATION_RELATIONS: &[Relation] = &[
    Relation::to(ResourceKind::File),
    Relation::to(ResourceKind::Activity),
    Relation::to(ResourceKind::Deal),
];
const DEAL_RELATIONS: &[Relation] = &[
    Relation::to(ResourceKind::Product),
    Relation::to(ResourceKind::File),
];
const PRODUCT_RELATIONS: &[Relation] = &[Relation::to(ResourceKind::File)];
const DEALS_ONLY: &[Relation] = &[Relation::to(ResourceKind::Deal)];

impl ResourceKind {
    /// Every known kind.
    pub const ALL: &'static [Self] = &[
        Self::Person,
        Self::Organization,
        Self::Deal,
        Self::Product,
        Self::Stage,
        Self::Pipeline,
        Self::User,
        Self::Activity,
        Self::EmailMessage,
        Self::EmailThread,
        Self::File,
        Self::Filter,
        Self::Note,
        Self::Goal,
    ];

    /// The singular resource name (e.g., "person").
    #[must_use]
    pub const fn resource(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Organization => "organization",
            Self::Deal => "deal",
            Self::Product => "product",
            Self::Stage => "stage",
            Self::Pipeline => "pipeline",
            Self::User => "user",
            Self::Activity => "activity",
            Self::EmailMessage => "emailMessage",
            Self::EmailThread => "emailThread",
            Self::File => "file",
            Self::Filter => "filter",
            Self::Note => "note",
            Self::Goal => "goal",
        }
    }

    /// The collection URL segment (e.g., "persons").
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Person => "persons",
            Self::Organization => "organizations",
            Self::Deal => "deals",
            Self::Product => "products",
            Self::Stage => "stages",
            Self::Pipeline => "pipelines",
            Self::User => "users",
            Self::Activity => "activities",
            Self::EmailMessage => "emailMessages",
            Self::EmailThread => "emailThreads",
            Self::File => "files",
            Self::Filter => "filters",
            Self::Note => "notes",
            Self::Goal => "goals",
        }
    }

    /// The field-definition URL segment (e.g., "personFields").
    #[must_use]
    pub fn field_segment(self) -> String {
        format!("{}Fields", self.resource())
    }

    /// Whether records of this kind carry custom fields.
    #[must_use]
    pub const fn has_custom_fields(self) -> bool {
        matches!(
            self,
            Self::Person | Self::Organization | Self::Deal | Self::Product
        )
    }

    /// Whether the remote can merge two records of this kind.
    #[must_use]
    pub const fn supports_merge(self) -> bool {
        matches!(self, Self::Person | Self::Organization | Self::Deal)
    }

    /// The relations declared on this kind.
    #[must_use]
    pub const fn relations(self) -> &'static [Relation] {
        match self {
            Self::Person => PERSON_RELATIONS,
            Self::Organization => ORGANIZATION_RELATIONS,
            Self::Deal => DEAL_RELATIONS,
            Self::Product => PRODUCT_RELATIONS,
            Self::Stage | Self::Pipeline => DEALS_ONLY,
            _ => &[],
        }
    }

    /// Looks up a relation by name.
    #[must_use]
    pub fn relation(self, name: &str) -> Option<Relation> {
        self.relations().iter().copied().find(|r| r.name == name)
    }

    /// Maps a field type tag to the kind it references, if any.
    ///
    /// Fields of these types hold a foreign key into another collection.
    #[must_use]
    pub fn from_field_type(field_type: &str) -> Option<Self> {
        match field_type {
            "people" => Some(Self::Person),
            "org" => Some(Self::Organization),
            "stage" => Some(Self::Stage),
            "product" => Some(Self::Product),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource())
    }
}
