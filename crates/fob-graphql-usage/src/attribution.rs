//! Entry attribution: from an importing module up to its route entry.
//!
//! The build tool owns the module graph; this side only needs "who first
//! imported module X" and "by which request string". [`AncestryLookup`] is
//! that read-only view. [`IssuerGraph`] is the implementation fed by the
//! plugin's transform hook and by the CLI walker.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::options::CompiledMatcher;

/// Read-only ancestry view over a module graph.
///
/// Modules are identified by their resolved path (or any stable id the host
/// uses). The request is the specifier by which the module was first
/// imported, e.g. `@/pages/user/index`.
pub trait AncestryLookup {
    /// The module that first imported `module`, if any.
    fn issuer(&self, module: &str) -> Option<&str>;

    /// The request string `module` was reached by.
    fn request(&self, module: &str) -> Option<&str>;
}

#[derive(Debug, Clone, Default)]
struct IssuerEntry {
    request: String,
    issuer: Option<String>,
}

/// First-importer graph.
#[derive(Debug, Clone, Default)]
pub struct IssuerGraph {
    modules: FxHashMap<String, IssuerEntry>,
}

impl IssuerGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a compilation root. Its request is its own id.
    pub fn add_root(&mut self, module: impl Into<String>) {
        let module = module.into();
        self.modules.entry(module.clone()).or_insert(IssuerEntry {
            request: module,
            issuer: None,
        });
    }

    /// Record that `importer` imports `module` via `request`.
    ///
    /// Returns false if `module` already had an issuer (first importer wins).
    pub fn record_import(
        &mut self,
        importer: &str,
        module: impl Into<String>,
        request: impl Into<String>,
    ) -> bool {
        let module = module.into();
        if module == importer || self.modules.contains_key(&module) {
            return false;
        }
        self.modules.insert(
            module,
            IssuerEntry {
                request: request.into(),
                issuer: Some(importer.to_string()),
            },
        );
        true
    }

    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl AncestryLookup for IssuerGraph {
    fn issuer(&self, module: &str) -> Option<&str> {
        self.modules.get(module)?.issuer.as_deref()
    }

    fn request(&self, module: &str) -> Option<&str> {
        self.modules.get(module).map(|entry| entry.request.as_str())
    }
}

/// Request strings from the root-most ancestor down to `module` itself.
///
/// Modules without a request are skipped. The walk ends at a module without
/// an issuer or on the first revisited module.
pub fn ancestry_paths<L: AncestryLookup + ?Sized>(lookup: &L, module: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut visited = FxHashSet::default();
    let mut current = Some(module);

    while let Some(id) = current {
        if !visited.insert(id) {
            break;
        }
        if let Some(request) = lookup.request(id).filter(|r| !r.is_empty()) {
            paths.push(request.to_string());
        }
        current = lookup.issuer(id);
    }

    paths.reverse();
    paths
}

/// Finds the route entry that owns a module.
#[derive(Debug, Clone)]
pub struct EntryResolver {
    entry: CompiledMatcher,
}

impl EntryResolver {
    pub fn new(entry: CompiledMatcher) -> Self {
        Self { entry }
    }

    /// First ancestry request, root-most first, matching the entry predicate.
    pub fn resolve<L: AncestryLookup + ?Sized>(&self, lookup: &L, module: &str) -> Option<String> {
        ancestry_paths(lookup, module)
            .into_iter()
            .find(|path| self.entry.is_match(path))
    }
}
