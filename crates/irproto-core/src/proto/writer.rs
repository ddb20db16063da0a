//! proto3 text emission for enums, messages and fields.

use super::enums::EnumLayout;
use super::oneof::OneofSplit;
use super::{CompileStats, Declaration, LayoutStrategy};
use crate::ir::{Class, ClassProperty, Enum, FieldLabel, FieldType, Namespace, TypeRef};
use crate::resolver::NamespaceResolver;
use std::fmt::{Result, Write};
use tracing::trace;

const BEGIN_SPACER: &str = "//----- Begin";
const END_SPACER: &str = "//----- End";
const SPACER: &str = "//------------------------------";

/// Writes proto3 text for one output unit
pub(crate) struct SchemaWriter<'a, W: Write> {
    writer: &'a mut W,
    indent_str: &'a str,
    indent_level: usize,
    resolver: &'a dyn NamespaceResolver,
    stats: &'a mut CompileStats,
    /// Full name of the namespace being written
    namespace: &'a str,
    /// Enclosing messages, outermost first
    scope: Vec<&'a Class>,
}

impl<'a, W: Write> SchemaWriter<'a, W> {
    pub(crate) fn new(
        writer: &'a mut W,
        indent_str: &'a str,
        resolver: &'a dyn NamespaceResolver,
        stats: &'a mut CompileStats,
    ) -> Self {
        Self {
            writer,
            indent_str,
            indent_level: 0,
            resolver,
            stats,
            namespace: "",
            scope: Vec::new(),
        }
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn write_indent(&mut self) -> Result {
        for _ in 0..self.indent_level {
            write!(self.writer, "{}", self.indent_str)?;
        }
        Ok(())
    }

    fn writeln(&mut self, s: &str) -> Result {
        self.write_indent()?;
        writeln!(self.writer, "{}", s)
    }

    /// Syntax line, optional package, and the banner comment
    pub(crate) fn write_header(&mut self, package: Option<&str>, banner: &str) -> Result {
        writeln!(self.writer, "syntax = \"proto3\";")?;
        if let Some(package) = package {
            writeln!(self.writer, "package {};", package)?;
        }
        writeln!(self.writer)?;
        writeln!(self.writer, "// {}", banner)?;
        writeln!(self.writer)
    }

    /// Import lines followed by a blank line; `imports` must already be ordered
    pub(crate) fn write_imports(&mut self, imports: &[String]) -> Result {
        for import in imports {
            writeln!(self.writer, "import \"{}\";", import)?;
        }
        writeln!(self.writer)
    }

    /// Every public top-level type of `ns`, arranged by `strategy`
    pub(crate) fn write_namespace_body(
        &mut self,
        ns: &'a Namespace,
        strategy: LayoutStrategy,
    ) -> Result {
        self.namespace = ns.full_name.as_str();
        for declaration in strategy.arrange(Declaration::top_level(ns)) {
            self.write_declaration(declaration)?;
        }
        Ok(())
    }

    /// A namespace body framed by begin/end delimiter comments
    pub(crate) fn write_dump_section(&mut self, ns: &'a Namespace) -> Result {
        writeln!(self.writer, "{} {} -----", BEGIN_SPACER, ns.short_name)?;
        writeln!(self.writer)?;
        self.write_namespace_body(ns, LayoutStrategy::EnumsThenClasses)?;
        writeln!(self.writer)?;
        writeln!(self.writer, "{} {} -----", END_SPACER, ns.short_name)?;
        writeln!(self.writer, "{}", SPACER)
    }

    fn write_declaration(&mut self, declaration: Declaration<'a>) -> Result {
        match declaration {
            Declaration::Enum(e) => self.write_enum(e),
            Declaration::Class(c) => self.write_message(c),
        }
    }

    pub(crate) fn write_enum(&mut self, e: &'a Enum) -> Result {
        trace!("Writing enum {}", e.short_name);
        let layout = EnumLayout::of(e);
        self.stats.enums += 1;
        if layout.is_synthesized() {
            self.stats.synthesized_zero_values += 1;
        }

        self.writeln(&format!("enum {} {{", e.short_name))?;
        self.indent();

        if layout.allow_alias {
            self.writeln("option allow_alias = true;")?;
        }
        for value in layout.values() {
            self.write_indent()?;
            writeln!(
                self.writer,
                "{}_{} = {};",
                e.short_name, value.name, value.value
            )?;
        }

        self.dedent();
        self.writeln("}")?;
        writeln!(self.writer)
    }

    pub(crate) fn write_message(&mut self, class: &'a Class) -> Result {
        trace!("Writing message {}", class.short_name);
        self.stats.messages += 1;

        self.writeln(&format!("message {} {{", class.short_name))?;
        self.indent();
        self.scope.push(class);

        let split = OneofSplit::of(class);

        // Nested types come before any field
        let nested = split.nested_types(class).map(Declaration::from).collect();
        for declaration in LayoutStrategy::EnumsThenClasses.arrange(nested) {
            self.write_declaration(declaration)?;
        }

        let mut fields = split.flat_fields.clone();
        fields.sort_by_key(|f| f.options.property_order);
        let cut = match split.threshold() {
            Some(threshold) => fields.partition_point(|f| f.options.property_order < threshold),
            None => fields.len(),
        };
        let (before, after) = fields.split_at(cut);

        for field in before {
            self.write_field(field, false)?;
        }
        if !split.oneof_group.is_empty() {
            self.write_oneof(&split.oneof_group)?;
        }
        for field in after {
            self.write_field(field, false)?;
        }

        self.scope.pop();
        self.dedent();
        self.writeln("}")?;
        writeln!(self.writer)
    }

    fn write_oneof(&mut self, group: &[&ClassProperty]) -> Result {
        self.stats.oneofs += 1;
        self.writeln("oneof message {")?;
        self.indent();

        let mut members = group.to_vec();
        members.sort_by_key(|f| f.options.property_order);
        for field in members {
            self.write_field(field, true)?;
        }

        self.dedent();
        self.writeln("}")
    }

    fn write_field(&mut self, field: &ClassProperty, in_oneof: bool) -> Result {
        self.stats.fields += 1;
        let opts = &field.options;

        let label = match opts.label {
            FieldLabel::Singular => "",
            FieldLabel::Repeated => "repeated ",
        };
        // Only oneof members get an explicit packed option
        let packed = if in_oneof && opts.label == FieldLabel::Repeated && !opts.is_packed {
            " [packed=false]"
        } else {
            ""
        };
        let type_name = self.type_name(&field.field_type);

        self.write_indent()?;
        writeln!(
            self.writer,
            "{}{} {} = {}{};",
            label,
            type_name,
            field_name(&field.name),
            opts.property_order,
            packed
        )
    }

    fn type_name(&self, field_type: &FieldType) -> String {
        match field_type {
            FieldType::Scalar(scalar) => scalar.as_str().to_string(),
            FieldType::Reference(target) => {
                qualify(target, self.namespace, &self.scope, self.resolver)
            }
        }
    }
}

/// Field identifier: the property name with its first character lower-cased
pub fn field_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Renders a type reference as seen from `scope` inside `namespace`.
///
/// Other namespaces get a package-qualified name. Within the same namespace
/// the scope prefix shared with the reference is dropped, so types nested in
/// the current message or one of its ancestors render bare. When a message
/// deeper than that prefix nests another type under the leading name, the
/// bare name would resolve there, so the reference is fully qualified with a
/// leading `.` instead.
pub fn qualify(
    target: &TypeRef,
    namespace: &str,
    scope: &[&Class],
    resolver: &dyn NamespaceResolver,
) -> String {
    if target.namespace != namespace {
        return format!(
            "{}.{}",
            resolver.resolve_package_name(&target.namespace),
            target.path.join(".")
        );
    }

    let parent = &target.path[..target.path.len().saturating_sub(1)];
    let shared = parent
        .iter()
        .zip(scope)
        .take_while(|(a, b)| **a == b.short_name)
        .count();
    let relative = &target.path[shared..];

    // A deeper enclosing message nesting the leading name would capture it
    let shadowed = relative.first().is_some_and(|leading| {
        scope[shared..].iter().any(|class| {
            class
                .private_types
                .iter()
                .any(|node| node.short_name() == leading.as_str())
        })
    });
    if shadowed {
        return format!(
            ".{}.{}",
            resolver.resolve_package_name(&target.namespace),
            target.path.join(".")
        );
    }
    relative.join(".")
}
