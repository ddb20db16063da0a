//! Intermediate representation of protocol-schema entities.
//!
//! The IR is built once by a front-end and handed to the compiler, which only
//! ever borrows it. Every node has small builder helpers so front-ends and tests
//! can assemble trees without spelling out each struct literal.
//!
//! ```
//! use irproto_core::ir::{Class, ClassProperty, Enum, Namespace, Program, ScalarType};
//!
//! let program = Program::new().namespace(
//!     Namespace::new("Bnet.Protocol")
//!         .enumeration(Enum::new("Status").value("OK", 0).value("FAILED", 1))
//!         .class(Class::new("Ping").property(ClassProperty::scalar("Seq", ScalarType::Uint32, 1))),
//! );
//! assert_eq!(program.namespaces[0].short_name, "Protocol");
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reserved name of the nested enum that marks a class's oneof members
pub const ONEOF_MARKER: &str = "MessageOneofCase";

/// Root of the IR: an ordered collection of namespaces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Program {
    /// Namespaces in program order
    #[cfg_attr(feature = "serde", serde(default))]
    pub namespaces: Vec<Namespace>,
}

impl Program {
    /// Creates an empty program
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a namespace
    pub fn namespace(mut self, namespace: Namespace) -> Self {
        self.namespaces.push(namespace);
        self
    }

    /// Looks up a namespace by its full name
    pub fn find_namespace(&self, full_name: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|ns| ns.full_name == full_name)
    }
}

/// A logical grouping that becomes one package and one output file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Namespace {
    /// Last segment of the dotted name, used in dump delimiters
    pub short_name: String,
    /// Dotted name; the identity type references point at
    pub full_name: String,
    /// Top-level messages
    #[cfg_attr(feature = "serde", serde(default))]
    pub classes: Vec<Class>,
    /// Top-level enums
    #[cfg_attr(feature = "serde", serde(default))]
    pub enums: Vec<Enum>,
}

impl Namespace {
    /// Creates a namespace from its dotted full name
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let short_name = full_name
            .rsplit('.')
            .next()
            .unwrap_or(full_name.as_str())
            .to_string();
        Self {
            short_name,
            full_name,
            classes: Vec::new(),
            enums: Vec::new(),
        }
    }

    /// Appends a top-level class
    pub fn class(mut self, class: Class) -> Self {
        self.classes.push(class);
        self
    }

    /// Appends a top-level enum
    pub fn enumeration(mut self, enumeration: Enum) -> Self {
        self.enums.push(enumeration);
        self
    }
}

/// Either kind of type declaration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TypeNode {
    /// A message
    Class(Class),
    /// An enum
    Enum(Enum),
}

impl TypeNode {
    /// Short name of the declared type
    pub fn short_name(&self) -> &str {
        match self {
            TypeNode::Class(c) => &c.short_name,
            TypeNode::Enum(e) => &e.short_name,
        }
    }

    /// Whether the type is hidden from top-level emission
    pub fn is_private(&self) -> bool {
        match self {
            TypeNode::Class(c) => c.is_private,
            TypeNode::Enum(e) => e.is_private,
        }
    }
}

/// A message declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Class {
    /// Name emitted in the schema
    pub short_name: String,
    /// Name in the source the IR was recovered from
    #[cfg_attr(feature = "serde", serde(default))]
    pub original_name: String,
    /// Fields in declaration order
    #[cfg_attr(feature = "serde", serde(default))]
    pub properties: Vec<ClassProperty>,
    /// Nested types owned by this class
    #[cfg_attr(feature = "serde", serde(default))]
    pub private_types: Vec<TypeNode>,
    /// Private types are only emitted nested inside their owner
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_private: bool,
}

impl Class {
    /// Creates a public class with no members
    pub fn new(short_name: impl Into<String>) -> Self {
        let short_name = short_name.into();
        Self {
            original_name: short_name.clone(),
            short_name,
            ..Self::default()
        }
    }

    /// Sets the source-side name
    pub fn original_name(mut self, name: impl Into<String>) -> Self {
        self.original_name = name.into();
        self
    }

    /// Appends a field
    pub fn property(mut self, property: ClassProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Nests a class, marking it private
    pub fn nested_class(mut self, mut class: Class) -> Self {
        class.is_private = true;
        self.private_types.push(TypeNode::Class(class));
        self
    }

    /// Nests an enum, marking it private
    pub fn nested_enum(mut self, mut enumeration: Enum) -> Self {
        enumeration.is_private = true;
        self.private_types.push(TypeNode::Enum(enumeration));
        self
    }

    /// Sets the private flag
    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }
}

/// A message field
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassProperty {
    /// Field name as recovered, usually PascalCase
    pub name: String,
    /// Declared type, carrying the referenced type when it is not a scalar
    pub field_type: FieldType,
    /// Label, tag and packing
    pub options: PropertyOptions,
}

impl ClassProperty {
    /// Creates a singular scalar field
    pub fn scalar(name: impl Into<String>, scalar: ScalarType, order: u32) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Scalar(scalar),
            options: PropertyOptions::new(order),
        }
    }

    /// Creates a singular field referencing another message or enum
    pub fn reference(name: impl Into<String>, target: TypeRef, order: u32) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Reference(target),
            options: PropertyOptions::new(order),
        }
    }

    /// Marks the field repeated
    pub fn repeated(mut self) -> Self {
        self.options.label = FieldLabel::Repeated;
        self
    }

    /// Sets the packed flag
    pub fn packed(mut self, is_packed: bool) -> Self {
        self.options.is_packed = is_packed;
        self
    }

    /// Returns the referenced type, if any
    pub fn referenced_type(&self) -> Option<&TypeRef> {
        match &self.field_type {
            FieldType::Reference(target) => Some(target),
            FieldType::Scalar(_) => None,
        }
    }
}

/// Declared type of a field
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FieldType {
    /// A proto3 scalar
    Scalar(ScalarType),
    /// A message or enum declared elsewhere in the program
    Reference(TypeRef),
}

/// proto3 scalar value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[allow(missing_docs)]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    /// Returns the proto3 keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Double => "double",
            ScalarType::Float => "float",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Uint32 => "uint32",
            ScalarType::Uint64 => "uint64",
            ScalarType::Sint32 => "sint32",
            ScalarType::Sint64 => "sint64",
            ScalarType::Fixed32 => "fixed32",
            ScalarType::Fixed64 => "fixed64",
            ScalarType::Sfixed32 => "sfixed32",
            ScalarType::Sfixed64 => "sfixed64",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
        }
    }
}

/// Link to a type declared in some namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TypeRef {
    /// Full name of the owning namespace
    pub namespace: String,
    /// Type names from the top-level type down to the target
    pub path: Vec<String>,
}

impl TypeRef {
    /// Creates a reference from a namespace and a dotted type path (`Outer.Inner`)
    pub fn new(namespace: impl Into<String>, path: &str) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.split('.').map(str::to_string).collect(),
        }
    }
}

/// Field cardinality
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FieldLabel {
    /// Zero or one value
    #[default]
    Singular,
    /// Zero or more values
    Repeated,
}

/// Per-field options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropertyOptions {
    /// Cardinality
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: FieldLabel,
    /// Field tag, unique within the class
    pub property_order: u32,
    /// Repeated scalars are packed unless this is cleared
    #[cfg_attr(feature = "serde", serde(default = "default_packed"))]
    pub is_packed: bool,
}

impl PropertyOptions {
    /// Singular, packed options for the given tag
    pub fn new(property_order: u32) -> Self {
        Self {
            label: FieldLabel::Singular,
            property_order,
            is_packed: true,
        }
    }
}

#[cfg(feature = "serde")]
fn default_packed() -> bool {
    true
}

/// An enum declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Enum {
    /// Name emitted in the schema, also the value-name prefix
    pub short_name: String,
    /// Name in the source the IR was recovered from
    #[cfg_attr(feature = "serde", serde(default))]
    pub original_name: String,
    /// Values in declaration order; equal values are aliases
    #[cfg_attr(feature = "serde", serde(default))]
    pub properties: Vec<EnumProperty>,
    /// Private enums are only emitted nested inside their owner
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_private: bool,
}

impl Enum {
    /// Creates a public enum with no values
    pub fn new(short_name: impl Into<String>) -> Self {
        let short_name = short_name.into();
        Self {
            original_name: short_name.clone(),
            short_name,
            ..Self::default()
        }
    }

    /// Appends a value
    pub fn value(mut self, name: impl Into<String>, value: i32) -> Self {
        self.properties.push(EnumProperty {
            name: name.into(),
            value,
        });
        self
    }

    /// Sets the private flag
    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }
}

/// A named enum value
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnumProperty {
    /// Value name without the enum prefix
    pub name: String,
    /// Numeric value
    pub value: i32,
}
