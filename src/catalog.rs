//! Static description of every table exposed over HTTP.
//! Handlers and the SQL builder are generic over these descriptors; identifiers only ever come from here.

/// Value kind of a column, used for payload coercion and placeholder casts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Int,
    /// 0/1 stored in a smallint.
    Flag,
    /// Time of day, exchanged as `HH:MM`.
    Time,
}

impl ColumnKind {
    pub fn pg_type(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Int => "int4",
            ColumnKind::Flag => "int2",
            ColumnKind::Time => "time",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    pub has_default: bool,
    /// Must be supplied on create.
    pub required: bool,
}

const fn col(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind, nullable: false, has_default: false, required: true }
}

const fn optional(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind, nullable: true, has_default: false, required: false }
}

const fn defaulted(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind, nullable: false, has_default: true, required: false }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    List,
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

const READ_ONLY: &[Operation] = &[Operation::List, Operation::Read];
const FULL_CRUD: &[Operation] = &[
    Operation::List,
    Operation::Read,
    Operation::Create,
    Operation::Update,
    Operation::Delete,
];

/// Many-to-many link stored in a join table and exposed as an id array field.
#[derive(Clone, Copy, Debug)]
pub struct Association {
    pub table: &'static str,
    pub owner_column: &'static str,
    pub member_column: &'static str,
    /// Payload/response field holding the member ids.
    pub field: &'static str,
}

#[derive(Clone, Copy, Debug)]
pub struct Resource {
    pub path: &'static str,
    pub table: &'static str,
    pub pk: &'static str,
    /// Mutable columns; the primary key is not listed.
    pub columns: &'static [Column],
    pub operations: &'static [Operation],
    /// (start, end) columns that must be strictly ordered when both are set.
    /// Checked on writes only, so read-only resources leave it unset.
    pub time_window: Option<(&'static str, &'static str)>,
    pub association: Option<Association>,
}

impl Resource {
    pub fn allows(&self, op: Operation) -> bool {
        self.operations.contains(&op)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

pub const EVENTS: Resource = Resource {
    path: "events",
    table: "EVENT",
    pk: "Id",
    columns: &[
        col("Subject", ColumnKind::Text),
        col("SubjectAbbr", ColumnKind::Text),
        optional("StartTime", ColumnKind::Time),
        optional("EndTime", ColumnKind::Time),
        optional("WeekDay", ColumnKind::Int),
        optional("RoomId", ColumnKind::Int),
        optional("LecturerId", ColumnKind::Int),
        defaulted("Hide", ColumnKind::Flag),
    ],
    operations: FULL_CRUD,
    time_window: Some(("StartTime", "EndTime")),
    association: None,
};

pub const LECTURERS: Resource = Resource {
    path: "lecturers",
    table: "LECTURER",
    pk: "Id",
    columns: &[
        col("Name", ColumnKind::Text),
        col("NameAbbr", ColumnKind::Text),
        defaulted("Office", ColumnKind::Text),
        defaulted("Hide", ColumnKind::Flag),
    ],
    operations: FULL_CRUD,
    time_window: None,
    association: None,
};

pub const ROOMS: Resource = Resource {
    path: "rooms",
    table: "ROOM",
    pk: "Id",
    columns: &[
        col("Name", ColumnKind::Text),
        col("NameAbbr", ColumnKind::Text),
        defaulted("Number", ColumnKind::Text),
        defaulted("Capacity", ColumnKind::Int),
        defaulted("Hide", ColumnKind::Flag),
    ],
    operations: FULL_CRUD,
    time_window: None,
    association: None,
};

pub const BLOCK_EVENTS: Association = Association {
    table: "BLOCK_TO_EVENT",
    owner_column: "BlockId",
    member_column: "EventId",
    field: "AssociatedEventIds",
};

pub const BLOCKS: Resource = Resource {
    path: "blocks",
    table: "BLOCK",
    pk: "Id",
    columns: &[
        col("Name", ColumnKind::Text),
        col("NameAbbr", ColumnKind::Text),
        defaulted("Hide", ColumnKind::Flag),
    ],
    operations: FULL_CRUD,
    time_window: None,
    association: Some(BLOCK_EVENTS),
};

pub const RESTRICTIONS: Resource = Resource {
    path: "restrictions",
    table: "RESTRICTION",
    pk: "Id",
    columns: &[
        col("LecturerId", ColumnKind::Int),
        col("Type", ColumnKind::Text),
        col("Weekday", ColumnKind::Int),
        optional("StartTime", ColumnKind::Time),
        optional("EndTime", ColumnKind::Time),
    ],
    operations: READ_ONLY,
    time_window: None,
    association: None,
};

pub const OCCUPATIONS: Resource = Resource {
    path: "occupations",
    table: "OCUPATION",
    pk: "Id",
    columns: &[
        col("RoomId", ColumnKind::Int),
        col("WeekDay", ColumnKind::Int),
        optional("StartTime", ColumnKind::Time),
        optional("EndTime", ColumnKind::Time),
    ],
    operations: READ_ONLY,
    time_window: None,
    association: None,
};

pub const RESOURCES: &[Resource] = &[EVENTS, LECTURERS, ROOMS, BLOCKS, RESTRICTIONS, OCCUPATIONS];

pub fn by_path(path: &str) -> Option<&'static Resource> {
    RESOURCES.iter().find(|r| r.path == path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_path() {
        assert_eq!(by_path("blocks").map(|r| r.table), Some("BLOCK"));
        assert!(by_path("users").is_none());
        assert!(by_path("EVENT").is_none());
    }

    #[test]
    fn read_only_resources() {
        for path in ["restrictions", "occupations"] {
            let r = by_path(path).unwrap();
            assert!(r.allows(Operation::List));
            assert!(!r.allows(Operation::Create));
            assert!(!r.allows(Operation::Delete));
        }
    }

    #[test]
    fn only_blocks_have_associations() {
        let with_assoc: Vec<_> = RESOURCES.iter().filter(|r| r.association.is_some()).map(|r| r.path).collect();
        assert_eq!(with_assoc, vec!["blocks"]);
    }

    #[test]
    fn non_nullable_columns_are_required_or_defaulted() {
        for r in RESOURCES {
            for c in r.columns {
                assert!(c.nullable || c.required || c.has_default, "{}.{}", r.table, c.name);
            }
        }
    }

    #[test]
    fn time_windows_only_on_writable_resources() {
        for r in RESOURCES.iter().filter(|r| r.time_window.is_some()) {
            assert!(r.allows(Operation::Create) || r.allows(Operation::Update), "{}", r.path);
        }
        assert!(EVENTS.time_window.is_some());
    }
}
