//! Import extraction from JavaScript/TypeScript sources.
//!
//! Produces the "module parsed" event payload: every static import with its
//! imported names, every `import('...')` with a string literal source, and
//! re-export sources (edges only, they carry no bindings of their own).

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    ExportAllDeclaration, ExportNamedDeclaration, Expression, ImportDeclaration,
    ImportDeclarationSpecifier, ImportExpression, ModuleExportName,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser, ParserReturn};
use oxc_span::SourceType;
use regex::Regex;
use std::sync::LazyLock;

/// How a module reached one of its dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    Static,
    Dynamic,
    ReExport,
}

/// One dependency edge of a parsed module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    /// Specifier exactly as written in source.
    pub source: String,
    pub kind: ImportKind,
    /// Imported export names. `default` for default imports; namespace
    /// imports contribute nothing.
    pub names: Vec<String>,
}

impl ImportRecord {
    pub fn is_dynamic(&self) -> bool {
        self.kind == ImportKind::Dynamic
    }
}

/// Error raised when a module cannot be parsed at all.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to parse {path}: {message}")]
pub struct ImportParseError {
    pub path: String,
    pub message: String,
}

/// Extract import records from `code`.
///
/// Recoverable syntax errors are tolerated; only a parser panic (no usable
/// program) is reported as an error. Type-only imports are skipped.
pub fn extract_imports(code: &str, path: &Path) -> Result<Vec<ImportRecord>, ImportParseError> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or(SourceType::tsx());

    let ParserReturn {
        program,
        errors,
        panicked,
        ..
    } = Parser::new(&allocator, code, source_type).parse();

    if panicked {
        let message = errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "parser aborted".to_string());
        return Err(ImportParseError {
            path: path.display().to_string(),
            message,
        });
    }

    let mut collector = ImportCollector::default();
    collector.visit_program(&program);
    Ok(collector.records)
}

#[derive(Default)]
struct ImportCollector {
    records: Vec<ImportRecord>,
}

impl<'a> Visit<'a> for ImportCollector {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        if decl.import_kind.is_type() {
            return;
        }

        let mut names = Vec::new();
        if let Some(specifiers) = &decl.specifiers {
            for spec in specifiers {
                match spec {
                    ImportDeclarationSpecifier::ImportSpecifier(named) => {
                        if named.import_kind.is_type() {
                            continue;
                        }
                        names.push(export_name(&named.imported));
                    }
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(_) => {
                        names.push("default".to_string());
                    }
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(_) => {}
                }
            }
        }

        self.records.push(ImportRecord {
            source: decl.source.value.to_string(),
            kind: ImportKind::Static,
            names,
        });
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &decl.source {
            if !decl.export_kind.is_type() {
                self.records.push(ImportRecord {
                    source: source.value.to_string(),
                    kind: ImportKind::ReExport,
                    names: Vec::new(),
                });
            }
        }
        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'a>) {
        if !decl.export_kind.is_type() {
            self.records.push(ImportRecord {
                source: decl.source.value.to_string(),
                kind: ImportKind::ReExport,
                names: Vec::new(),
            });
        }
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Expression::StringLiteral(lit) = &expr.source {
            self.records.push(ImportRecord {
                source: lit.value.to_string(),
                kind: ImportKind::Dynamic,
                names: Vec::new(),
            });
        }
        walk::walk_import_expression(self, expr);
    }
}

fn export_name(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(ident) => ident.name.to_string(),
        ModuleExportName::IdentifierReference(ident) => ident.name.to_string(),
        ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}

static LOADABLE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"loadable\s*\(\s*\(\)\s*=>\s*import\s*\(\s*(?:'([^']*)'|"([^"]*)"|`([^`]*)`)\s*\),?\s*\)"#).ok()
});

/// Rewrite `loadable(() => import('x'))` calls to the string literal `"x"`.
///
/// Route modules written for lazy loading become plain data this way, so
/// their components can be used as usage-map keys.
pub fn rewrite_loadable_components(source: &str) -> String {
    let Some(re) = LOADABLE_RE.as_ref() else {
        return source.to_string();
    };
    re.replace_all(source, |caps: &regex::Captures<'_>| {
        let target = caps
            .get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map_or("", |m| m.as_str());
        format!("\"{target}\"")
    })
    .into_owned()
}
