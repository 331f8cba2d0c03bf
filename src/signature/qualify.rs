use tracing::debug;

use crate::package::default_package_name;
use crate::syntax::{is_exported, ImportSpec, InterfaceElem, PackageRef, TypeExpr};

/// Qualifies type expressions as seen from one source file.
///
/// Exported identifiers without a selector belong to the declaring package
/// and get its name and import path. Selector qualifiers are bound to the
/// import of the file they match: an explicit alias first, then the default
/// name derived from the import path, then any name registered later through
/// [`Qualifier::bind`].
#[derive(Debug, Clone)]
pub struct Qualifier {
    package: PackageRef,
    bindings: Vec<(String, String)>,
    unaliased: Vec<String>,
}

impl Qualifier {
    pub fn new(package_name: &str, import_path: &str, imports: &[ImportSpec]) -> Self {
        let mut bindings = Vec::new();
        let mut unaliased = Vec::new();
        for import in imports {
            match import.name.as_deref() {
                Some("_") | Some(".") => {}
                Some(alias) => bindings.push((alias.to_string(), import.path.clone())),
                None => {
                    bindings.push((default_package_name(&import.path), import.path.clone()));
                    unaliased.push(import.path.clone());
                }
            }
        }
        Self {
            package: PackageRef::bound(package_name, import_path),
            bindings,
            unaliased,
        }
    }

    /// The declaring package, bound to its import path.
    pub fn package(&self) -> &PackageRef {
        &self.package
    }

    /// Import path bound to the qualifier `name`.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, path)| path.as_str())
    }

    /// Record the declared package name of an import whose default name did
    /// not match how the file refers to it.
    pub fn bind(&mut self, name: impl Into<String>, import_path: impl Into<String>) {
        self.bindings.push((name.into(), import_path.into()));
    }

    /// Imports without an explicit alias: candidates for [`Qualifier::bind`].
    pub fn unaliased_imports(&self) -> &[String] {
        &self.unaliased
    }

    /// Selector qualifiers in `ty` that no import accounts for yet.
    pub fn unresolved(&self, ty: &TypeExpr) -> Vec<String> {
        let mut names = Vec::new();
        ty.for_each_package(&mut |package: &PackageRef| {
            if package.path.is_none()
                && self.lookup(&package.name).is_none()
                && !names.contains(&package.name)
            {
                names.push(package.name.clone());
            }
        });
        names
    }

    /// Qualify every exported identifier and bind every qualifier.
    ///
    /// Qualifying an already qualified expression returns it unchanged.
    pub fn qualify(&self, ty: &TypeExpr) -> TypeExpr {
        let mut qualified = ty.clone();
        self.qualify_in_place(&mut qualified);
        qualified
    }

    fn qualify_in_place(&self, ty: &mut TypeExpr) {
        match ty {
            TypeExpr::Named {
                package,
                name,
                args,
            } => {
                match package {
                    None if is_exported(name) => *package = Some(self.package.clone()),
                    None => {}
                    Some(package) if package.path.is_none() => match self.lookup(&package.name) {
                        Some(path) => package.path = Some(path.to_string()),
                        None => debug!(qualifier = %package.name, "qualifier matches no import"),
                    },
                    Some(_) => {}
                }
                for arg in args {
                    self.qualify_in_place(arg);
                }
            }
            TypeExpr::Array { len, elem } => {
                if is_exported(len) && len.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    *len = format!("{}.{}", self.package.name, len);
                }
                self.qualify_in_place(elem);
            }
            TypeExpr::Pointer(inner)
            | TypeExpr::Slice(inner)
            | TypeExpr::Variadic(inner)
            | TypeExpr::Paren(inner) => self.qualify_in_place(inner),
            TypeExpr::Chan { elem, .. } => self.qualify_in_place(elem),
            TypeExpr::Map { key, value } => {
                self.qualify_in_place(key);
                self.qualify_in_place(value);
            }
            TypeExpr::Func(signature) => {
                for field in signature.params.iter_mut().chain(signature.results.iter_mut()) {
                    self.qualify_in_place(&mut field.ty);
                }
            }
            TypeExpr::Interface(elems) => {
                for elem in elems {
                    match elem {
                        InterfaceElem::Method { signature, .. } => {
                            for field in
                                signature.params.iter_mut().chain(signature.results.iter_mut())
                            {
                                self.qualify_in_place(&mut field.ty);
                            }
                        }
                        InterfaceElem::Embedded(ty) => self.qualify_in_place(ty),
                        InterfaceElem::Union(terms) => {
                            for term in terms {
                                self.qualify_in_place(&mut term.ty);
                            }
                        }
                    }
                }
            }
            TypeExpr::Struct(fields) => {
                for field in fields {
                    self.qualify_in_place(&mut field.ty);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_type_expr;

    fn qualifier() -> Qualifier {
        let imports = vec![
            ImportSpec {
                name: None,
                path: "example.com/svc/model".into(),
            },
            ImportSpec {
                name: Some("kithttp".into()),
                path: "github.com/go-kit/kit/transport/http".into(),
            },
            ImportSpec {
                name: None,
                path: "github.com/mattn/go-sqlite3".into(),
            },
            ImportSpec {
                name: Some("_".into()),
                path: "embed".into(),
            },
        ];
        Qualifier::new("api", "example.com/svc/api", &imports)
    }

    fn qualify(src: &str) -> TypeExpr {
        qualifier().qualify(&parse_type_expr(src).unwrap())
    }

    #[test]
    fn test_qualifies_exported_identifiers() {
        assert_eq!(qualify("*Request").to_string(), "*api.Request");
        assert_eq!(qualify("map[Key][]Value").to_string(), "map[api.Key][]api.Value");
        assert_eq!(qualify("[]int").to_string(), "[]int");
        assert_eq!(qualify("error").to_string(), "error");
        assert_eq!(qualify("[MaxItems]byte").to_string(), "[api.MaxItems]byte");
        assert_eq!(qualify("List[Item]").to_string(), "api.List[api.Item]");
        assert_eq!(qualify("func(Item) error").to_string(), "func(api.Item) error");
        assert_eq!(qualify("chan<- Event").to_string(), "chan<- api.Event");
        assert_eq!(
            qualify("struct{ A Item; b int }").to_string(),
            "struct{ A api.Item; b int }"
        );
    }

    #[test]
    fn test_binds_selector_qualifiers_to_imports() {
        let ty = qualify("[]*model.QueryResult");
        let mut bound = Vec::new();
        ty.for_each_package(&mut |p: &PackageRef| bound.push(p.clone()));
        assert_eq!(
            bound,
            vec![PackageRef::bound("model", "example.com/svc/model")]
        );

        let mut bound = Vec::new();
        qualify("kithttp.ServerOption").for_each_package(&mut |p: &PackageRef| bound.push(p.clone()));
        assert_eq!(bound[0].path.as_deref(), Some("github.com/go-kit/kit/transport/http"));

        let mut own = Vec::new();
        qualify("Item").for_each_package(&mut |p: &PackageRef| own.push(p.clone()));
        assert_eq!(own, vec![PackageRef::bound("api", "example.com/svc/api")]);
    }

    #[test]
    fn test_qualify_is_idempotent() {
        let q = qualifier();
        let once = q.qualify(&parse_type_expr("otherpkg.Foo").unwrap());
        assert_eq!(once.to_string(), "otherpkg.Foo");
        assert_eq!(q.qualify(&once), once);

        let once = q.qualify(&parse_type_expr("map[Key]*model.Row").unwrap());
        assert_eq!(q.qualify(&once), once);
    }

    #[test]
    fn test_unresolved_and_late_binding() {
        let mut q = qualifier();
        let ty = parse_type_expr("map[sqlite3.Conn]otherpkg.Foo").unwrap();
        assert_eq!(q.unresolved(&ty), vec!["otherpkg".to_string()]);
        assert_eq!(q.unaliased_imports().len(), 2);

        q.bind("otherpkg", "example.com/other-pkg");
        assert!(q.unresolved(&ty).is_empty());
        let mut paths = Vec::new();
        q.qualify(&ty)
            .for_each_package(&mut |p: &PackageRef| paths.push(p.path.clone()));
        assert_eq!(
            paths,
            vec![
                Some("github.com/mattn/go-sqlite3".to_string()),
                Some("example.com/other-pkg".to_string())
            ]
        );
    }
}
