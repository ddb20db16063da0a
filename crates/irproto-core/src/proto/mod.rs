//! proto3 compilation of an IR [`Program`].
//!
//! ## Architecture
//!
//! [`Proto3Compiler`] drives a single synchronous pass in one of two modes:
//!
//! 1. [`CompileMode::PerNamespace`]: namespace paths are resolved once, then
//!    each namespace is rendered (header, imports, body) and written to its own
//!    file before the next one starts.
//! 2. [`CompileMode::DumpAll`]: every namespace is rendered into one inspection
//!    file, framed by begin/end delimiter comments.
//!
//! Top-level ordering uses an explicit [`LayoutStrategy`]; the two modes differ
//! only in which strategy they pick. All ordering goes through
//! [`byte_cmp`](crate::compare::byte_cmp).
//!
//! Rendering never mutates the IR, so [`Proto3Compiler::render_units`] and
//! [`Proto3Compiler::compile`] produce byte-identical text for the same input.

mod enums;
mod oneof;
mod writer;

use crate::compare::sort_by_name;
use crate::error::{Error, Result};
use crate::ir::{Class, Enum, Namespace, Program, TypeNode};
use crate::resolver::{check_relative_path, DefaultResolver, NamespacePaths, NamespaceResolver};
use std::fs;
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use writer::SchemaWriter;

pub use enums::{has_alias, EnumLayout, AUTO_INVALID_SUFFIX};
pub use oneof::OneofSplit;
pub use writer::{field_name, qualify};

/// Default name of the single file written in dump mode
pub const DEFAULT_DUMP_FILE: &str = "dump.proto";

/// Default banner comment written below the header
pub const DEFAULT_BANNER: &str = "irproto compiled unit";

/// Configuration for proto compilation
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Root directory all output paths are relative to
    pub output_dir: PathBuf,
    /// Nest files in one directory per package segment
    pub package_structured: bool,
    /// Write everything into a single dump file
    pub dump_mode: bool,
    /// File name used in dump mode
    pub dump_file_name: String,
    /// Indentation string (default: one tab)
    pub indent_str: String,
    /// Text of the banner comment
    pub banner: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            package_structured: false,
            dump_mode: false,
            dump_file_name: DEFAULT_DUMP_FILE.to_string(),
            indent_str: "\t".to_string(),
            banner: DEFAULT_BANNER.to_string(),
        }
    }
}

impl CompilerConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output root
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets whether packages map to nested directories
    pub fn package_structured(mut self, structured: bool) -> Self {
        self.package_structured = structured;
        self
    }

    /// Sets whether to write a single dump file
    pub fn dump_mode(mut self, dump: bool) -> Self {
        self.dump_mode = dump;
        self
    }

    /// Sets the dump file name
    pub fn dump_file_name(mut self, name: impl Into<String>) -> Self {
        self.dump_file_name = name.into();
        self
    }

    /// Sets the indentation string
    pub fn indent_str(mut self, s: impl Into<String>) -> Self {
        self.indent_str = s.into();
        self
    }

    /// Sets the banner comment text
    pub fn banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// The mode these settings select
    pub fn mode(&self) -> CompileMode {
        if self.dump_mode {
            CompileMode::DumpAll
        } else {
            CompileMode::PerNamespace
        }
    }
}

/// What a compilation run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    /// One file containing every namespace
    DumpAll,
    /// One file per namespace
    PerNamespace,
}

/// Order of top-level declarations within a namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStrategy {
    /// All enums by name, then all classes by name
    EnumsThenClasses,
    /// Enums and classes merged into one sequence by name
    InterleavedByName,
}

impl LayoutStrategy {
    /// Orders `declarations` according to the strategy
    pub fn arrange<'a>(self, declarations: Vec<Declaration<'a>>) -> Vec<Declaration<'a>> {
        match self {
            LayoutStrategy::EnumsThenClasses => {
                let (mut enums, mut classes): (Vec<_>, Vec<_>) = declarations
                    .into_iter()
                    .partition(|d| matches!(d, Declaration::Enum(_)));
                sort_by_name(&mut enums, |d| d.name());
                sort_by_name(&mut classes, |d| d.name());
                enums.extend(classes);
                enums
            }
            LayoutStrategy::InterleavedByName => {
                let mut all = declarations;
                sort_by_name(&mut all, |d| d.name());
                all
            }
        }
    }
}

/// A borrowed enum or class declaration
#[derive(Debug, Clone, Copy)]
pub enum Declaration<'a> {
    /// An enum
    Enum(&'a Enum),
    /// A message
    Class(&'a Class),
}

impl<'a> Declaration<'a> {
    /// Public top-level declarations of a namespace, enums before classes
    pub fn top_level(ns: &'a Namespace) -> Vec<Declaration<'a>> {
        let enums = ns
            .enums
            .iter()
            .filter(|e| !e.is_private)
            .map(Declaration::Enum);
        let classes = ns
            .classes
            .iter()
            .filter(|c| !c.is_private)
            .map(Declaration::Class);
        enums.chain(classes).collect()
    }

    /// Short name of the declared type
    pub fn name(&self) -> &'a str {
        match self {
            Declaration::Enum(e) => &e.short_name,
            Declaration::Class(c) => &c.short_name,
        }
    }
}

impl<'a> From<&'a TypeNode> for Declaration<'a> {
    fn from(node: &'a TypeNode) -> Self {
        match node {
            TypeNode::Enum(e) => Declaration::Enum(e),
            TypeNode::Class(c) => Declaration::Class(c),
        }
    }
}

/// Counters collected while rendering
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompileStats {
    /// Output units (files) rendered
    pub units: usize,
    /// Messages written, nested ones included
    pub messages: usize,
    /// Enums written, nested ones included
    pub enums: usize,
    /// Field lines written
    pub fields: usize,
    /// Oneof blocks written
    pub oneofs: usize,
    /// Enums that received an `_AUTO_INVALID` zero value
    pub synthesized_zero_values: usize,
}

/// One rendered output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedUnit {
    /// Path relative to the output root, forward-slash separated
    pub path: String,
    /// Full proto3 text
    pub content: String,
}

/// Outcome of [`Proto3Compiler::compile`]
#[derive(Debug, Clone)]
pub struct CompileReport {
    /// Mode the run executed in
    pub mode: CompileMode,
    /// Relative paths written, in write order
    pub written: Vec<String>,
    /// Rendering counters
    pub stats: CompileStats,
}

/// Compiles an IR program into proto3 files
pub struct Proto3Compiler<'p> {
    program: &'p Program,
    config: CompilerConfig,
    resolver: Box<dyn NamespaceResolver>,
}

impl<'p> Proto3Compiler<'p> {
    /// Creates a compiler using the [`DefaultResolver`]
    pub fn new(program: &'p Program, config: CompilerConfig) -> Self {
        Self {
            program,
            config,
            resolver: Box::new(DefaultResolver),
        }
    }

    /// Replaces the namespace resolver
    pub fn with_resolver(mut self, resolver: impl NamespaceResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Returns the configuration
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Renders and writes every unit below the output root.
    ///
    /// Stops at the first filesystem error; files already written stay on disk.
    pub fn compile(&self) -> Result<CompileReport> {
        let mode = self.config.mode();
        info!(
            "Writing proto files to '{}' ({:?})",
            self.config.output_dir.display(),
            mode
        );

        let mut written = Vec::new();
        let stats = self.for_each_unit(|unit| {
            let target = write_unit(&self.config.output_dir, &unit)?;
            debug!("Wrote {}", target.display());
            written.push(unit.path);
            Ok(())
        })?;

        info!(
            "Compiled {} unit(s): {} messages, {} enums, {} fields",
            stats.units, stats.messages, stats.enums, stats.fields
        );
        Ok(CompileReport {
            mode,
            written,
            stats,
        })
    }

    /// Renders every unit in memory without touching the filesystem
    pub fn render_units(&self) -> Result<Vec<RenderedUnit>> {
        let mut units = Vec::new();
        self.for_each_unit(|unit| {
            units.push(unit);
            Ok(())
        })?;
        Ok(units)
    }

    fn for_each_unit<F>(&self, mut sink: F) -> Result<CompileStats>
    where
        F: FnMut(RenderedUnit) -> Result<()>,
    {
        let mut stats = CompileStats::default();
        match self.config.mode() {
            CompileMode::DumpAll => {
                check_relative_path(&self.config.dump_file_name)?;
                let content = self.render_dump(&mut stats);
                stats.units += 1;
                sink(RenderedUnit {
                    path: self.config.dump_file_name.clone(),
                    content,
                })?;
            }
            CompileMode::PerNamespace => {
                let paths = self
                    .resolver
                    .resolve_file_paths(&self.program.namespaces, self.config.package_structured)?;
                for (name, path) in paths.iter() {
                    let Some(ns) = self.program.find_namespace(name) else {
                        continue;
                    };
                    let content = self.render_namespace(ns, &paths, &mut stats);
                    stats.units += 1;
                    sink(RenderedUnit {
                        path: path.clone(),
                        content,
                    })?;
                }
            }
        }
        Ok(stats)
    }

    fn render_namespace(
        &self,
        ns: &Namespace,
        paths: &NamespacePaths,
        stats: &mut CompileStats,
    ) -> String {
        let mut output = String::new();
        self.write_namespace(&mut output, ns, paths, stats)
            .expect("String write cannot fail");
        output
    }

    fn write_namespace(
        &self,
        output: &mut String,
        ns: &Namespace,
        paths: &NamespacePaths,
        stats: &mut CompileStats,
    ) -> std::fmt::Result {
        let package = self.resolver.resolve_package_name(&ns.full_name);
        let imports = self.import_paths(ns, paths);

        let mut writer = SchemaWriter::new(
            output,
            &self.config.indent_str,
            self.resolver.as_ref(),
            stats,
        );
        writer.write_header(Some(package.as_str()), &self.config.banner)?;
        writer.write_imports(&imports)?;
        writer.write_namespace_body(ns, LayoutStrategy::InterleavedByName)
    }

    fn render_dump(&self, stats: &mut CompileStats) -> String {
        let mut output = String::new();
        self.write_dump(&mut output, stats)
            .expect("String write cannot fail");
        output
    }

    fn write_dump(&self, output: &mut String, stats: &mut CompileStats) -> std::fmt::Result {
        let mut writer = SchemaWriter::new(
            output,
            &self.config.indent_str,
            self.resolver.as_ref(),
            stats,
        );
        writer.write_header(None, &self.config.banner)?;
        for ns in &self.program.namespaces {
            writer.write_dump_section(ns)?;
        }
        Ok(())
    }

    /// Import paths of `ns`, forward-slash separated, in byte order
    fn import_paths(&self, ns: &Namespace, paths: &NamespacePaths) -> Vec<String> {
        let mut imports = Vec::new();
        for referenced in self.resolver.resolve_imports(ns) {
            match paths.get(&referenced) {
                Some(path) => imports.push(path.replace('\\', "/")),
                None => warn!(
                    "Namespace {} references unknown namespace {}, import skipped",
                    ns.full_name, referenced
                ),
            }
        }
        sort_by_name(&mut imports, String::as_str);
        imports.dedup();
        imports
    }
}

/// Creates the directory chain and writes one unit, returning the absolute target
fn write_unit(root: &Path, unit: &RenderedUnit) -> Result<PathBuf> {
    let target = unit
        .path
        .split('/')
        .fold(root.to_path_buf(), |acc, segment| acc.join(segment));

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::directory_create(parent, e))?;
    }

    let mut file = fs::File::create(&target).map_err(|e| Error::file_write(&target, e))?;
    file.write_all(unit.content.as_bytes())
        .map_err(|e| Error::file_write(&target, e))?;

    Ok(target)
}
