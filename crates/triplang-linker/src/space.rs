//! The global symbol space of a link.
//!
//! Exports are global and unique: a symbol exported by two modules is an
//! ambiguity. Local definitions stay reachable under their qualified
//! `Module.symbol` name, but only intra-module references (or declared
//! imports) can reach them. Import declarations are re-validated against the
//! exporting module before anything resolves.

use indexmap::{IndexMap, IndexSet};
use triplang_core::Def;
use triplang_core::free_vars::external_refs;
use triplang_object::ObjectModule;

use crate::LinkError;

/// `Module.symbol`, the node vocabulary of the link.
pub fn qualify(module: &str, symbol: &str) -> String {
    format!("{module}.{symbol}")
}

/// A definition together with its owning module.
#[derive(Debug, Clone)]
pub struct QualifiedDef {
    pub module: String,
    pub def: Def,
}

#[derive(Debug, Default)]
pub struct GlobalSpace {
    /// Loaded modules in link order.
    pub modules: IndexMap<String, ObjectModule>,
    /// Exported symbol → exporting module.
    pub exports: IndexMap<String, String>,
    /// Qualified name → term definition.
    pub terms: IndexMap<String, QualifiedDef>,
    /// Qualified name → type definition.
    pub types: IndexMap<String, QualifiedDef>,
    /// Qualified names of recursive type aliases.
    pub recursive_types: IndexSet<String>,
}

impl GlobalSpace {
    pub fn build(objects: &[ObjectModule]) -> Result<Self, LinkError> {
        let mut space = Self::default();

        for object in objects {
            if space.modules.contains_key(&object.module) {
                return Err(LinkError::DuplicateModule {
                    module: object.module.clone(),
                });
            }
            for export in &object.exports {
                if let Some(first) = space.exports.get(export) {
                    return Err(LinkError::AmbiguousExport {
                        name: export.clone(),
                        first: first.clone(),
                        second: object.module.clone(),
                    });
                }
                space.exports.insert(export.clone(), object.module.clone());
            }
            space.modules.insert(object.module.clone(), object.clone());
        }

        // The definitions map is keyed by symbol name, so a name is a term
        // or a type within its module, never both.
        for object in space.modules.values() {
            for (name, def) in &object.definitions {
                let qualified = qualify(&object.module, name);
                let entry = QualifiedDef {
                    module: object.module.clone(),
                    def: def.clone(),
                };
                match def {
                    Def::Type { ty, .. } => {
                        if external_refs(ty).types.contains(name.as_str()) {
                            space.recursive_types.insert(qualified.clone());
                        }
                        space.types.insert(qualified, entry);
                    }
                    _ if def.is_term_def() => {
                        space.terms.insert(qualified, entry);
                    }
                    _ => {}
                }
            }
        }

        space.validate_imports()?;
        Ok(space)
    }

    fn validate_imports(&self) -> Result<(), LinkError> {
        for object in self.modules.values() {
            for import in &object.imports {
                let Some(source) = self.modules.get(&import.from) else {
                    return Err(LinkError::MissingModule {
                        module: object.module.clone(),
                        symbol: import.name.clone(),
                        from: import.from.clone(),
                    });
                };
                let exported = source.exports.iter().any(|e| e == &import.name);
                let defined = source.definitions.contains_key(&import.name);
                if !exported || !defined {
                    return Err(LinkError::NotExported {
                        module: object.module.clone(),
                        symbol: import.name.clone(),
                        from: import.from.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Where an import of `name` in `module` points, if declared.
    fn import_source(&self, module: &str, name: &str) -> Option<&str> {
        let object = self.modules.get(module)?;
        object
            .imports
            .iter()
            .find(|i| i.name == name)
            .map(|i| i.from.as_str())
    }

    /// Map a free term reference inside `module` to its qualified target:
    /// a local definition first, then a declared import.
    pub fn resolve_term_ref(&self, module: &str, name: &str) -> Option<String> {
        let local = qualify(module, name);
        if self.terms.contains_key(&local) {
            return Some(local);
        }
        let from = self.import_source(module, name)?;
        let imported = qualify(from, name);
        self.terms.contains_key(&imported).then_some(imported)
    }

    /// Map a free type reference inside `module` to its qualified target.
    pub fn resolve_type_ref(&self, module: &str, name: &str) -> Option<String> {
        let local = qualify(module, name);
        if self.types.contains_key(&local) {
            return Some(local);
        }
        let from = self.import_source(module, name)?;
        let imported = qualify(from, name);
        self.types.contains_key(&imported).then_some(imported)
    }

    /// Locate a term definition by bare name for numeral expansion: the
    /// exporting module wins, then the first module defining it.
    pub fn find_term(&self, name: &str) -> Option<&QualifiedDef> {
        if let Some(module) = self.exports.get(name)
            && let Some(found) = self.terms.get(&qualify(module, name))
        {
            return Some(found);
        }
        self.modules
            .keys()
            .find_map(|module| self.terms.get(&qualify(module, name)))
    }

    /// Whether a type named `name` is in scope anywhere in the link.
    pub fn has_type(&self, name: &str) -> bool {
        if let Some(module) = self.exports.get(name) {
            if self.types.contains_key(&qualify(module, name)) {
                return true;
            }
        }
        self.modules
            .keys()
            .any(|module| self.types.contains_key(&qualify(module, name)))
    }
}
