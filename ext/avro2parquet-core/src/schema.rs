use std::sync::Arc;

/// Parquet-side schema of a conversion, translated from the Avro record schema
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub root: SchemaNode,
}

/// Represents a node in the Parquet schema tree
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A struct with named fields
    Struct {
        name: String,
        nullable: bool,
        fields: Vec<SchemaNode>,
    },
    /// A list containing items of a single type
    List {
        name: String,
        nullable: bool,
        item: Box<SchemaNode>,
    },
    /// A map with string keys
    Map {
        name: String,
        nullable: bool,
        key: Box<SchemaNode>,
        value: Box<SchemaNode>,
    },
    /// A primitive/leaf type
    Primitive {
        name: String,
        primitive_type: PrimitiveType,
        nullable: bool,
    },
}

/// Primitive column types an Avro schema can map onto
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Int32,
    Int64,
    Float32,
    Float64,

    // Decimal types (precision, scale)
    Decimal128(u8, i8),
    Decimal256(u8, i8),

    Boolean,
    String,
    Binary,

    Date32,
    TimestampMillis(Option<Arc<str>>),
    TimestampMicros(Option<Arc<str>>),
    TimestampNanos(Option<Arc<str>>),
    TimeMillis,
    TimeMicros,

    // Avro fixed and duration
    FixedLenByteArray(i32),
}

impl Schema {
    /// Top-level fields in column order
    pub fn fields(&self) -> &[SchemaNode] {
        match &self.root {
            SchemaNode::Struct { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields().iter().map(SchemaNode::name).collect()
    }
}

impl SchemaNode {
    /// Get the name of this schema node
    pub fn name(&self) -> &str {
        match self {
            SchemaNode::Struct { name, .. } => name,
            SchemaNode::List { name, .. } => name,
            SchemaNode::Map { name, .. } => name,
            SchemaNode::Primitive { name, .. } => name,
        }
    }

    /// Check if this node is nullable
    pub fn is_nullable(&self) -> bool {
        match self {
            SchemaNode::Struct { nullable, .. } => *nullable,
            SchemaNode::List { nullable, .. } => *nullable,
            SchemaNode::Map { nullable, .. } => *nullable,
            SchemaNode::Primitive { nullable, .. } => *nullable,
        }
    }

    /// Same node with a different nullability
    pub(crate) fn with_nullable(self, is_nullable: bool) -> Self {
        match self {
            SchemaNode::Struct { name, fields, .. } => SchemaNode::Struct {
                name,
                nullable: is_nullable,
                fields,
            },
            SchemaNode::List { name, item, .. } => SchemaNode::List {
                name,
                nullable: is_nullable,
                item,
            },
            SchemaNode::Map {
                name, key, value, ..
            } => SchemaNode::Map {
                name,
                nullable: is_nullable,
                key,
                value,
            },
            SchemaNode::Primitive {
                name,
                primitive_type,
                ..
            } => SchemaNode::Primitive {
                name,
                primitive_type,
                nullable: is_nullable,
            },
        }
    }
}
