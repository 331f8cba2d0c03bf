//! Declaration-level syntax tree for Go source files.
//!
//! Only what code generation needs is kept: the package clause, the imports,
//! and every top-level `type` declaration. Type expressions are kept fully
//! structured so they can be qualified and re-rendered against a different
//! import set.

/// A parsed Go source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub package: String,
    pub imports: Vec<ImportSpec>,
    pub types: Vec<TypeSpec>,
}

impl File {
    pub fn find_type(&self, name: &str) -> Option<&TypeSpec> {
        self.types.iter().find(|spec| spec.name == name)
    }
}

/// `import alias "path"`; `name` is `None` without an explicit alias and may
/// be `.` or `_`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub name: Option<String>,
    pub path: String,
}

/// `type Name[TypeParams] Type` or `type Name = Type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    pub type_params: Vec<String>,
    pub alias: bool,
    pub ty: TypeExpr,
    pub line: usize,
}

/// Package qualifier of a named type.
///
/// `name` is the identifier used in the source (`http` in `http.Handler`);
/// `path` is filled in once the qualifier has been bound to an import.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRef {
    pub name: String,
    pub path: Option<String>,
}

impl PackageRef {
    pub fn unbound(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
        }
    }

    pub fn bound(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: Some(path.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named {
        package: Option<PackageRef>,
        name: String,
        args: Vec<TypeExpr>,
    },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array {
        len: String,
        elem: Box<TypeExpr>,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan {
        dir: ChanDir,
        elem: Box<TypeExpr>,
    },
    Func(Signature),
    Interface(Vec<InterfaceElem>),
    Struct(Vec<StructField>),
    /// `...T`, only meaningful as the last parameter.
    Variadic(Box<TypeExpr>),
    Paren(Box<TypeExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

/// Parameter or result group; `names` is empty for an anonymous entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub names: Vec<String>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceElem {
    Method { name: String, signature: Signature },
    Embedded(TypeExpr),
    /// Type-set element such as `~int | ~string`.
    Union(Vec<TypeTerm>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTerm {
    pub tilde: bool,
    pub ty: TypeExpr,
}

/// Struct field group; `names` is empty for an embedded field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub names: Vec<String>,
    pub ty: TypeExpr,
    pub tag: Option<String>,
}

/// Whether `name` is visible outside its package.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

impl TypeExpr {
    /// Unqualified named type without type arguments.
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            package: None,
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn qualified(package: PackageRef, name: impl Into<String>) -> Self {
        TypeExpr::Named {
            package: Some(package),
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// The identifier of a bare, unqualified named type (`int`, `Foo`).
    pub fn as_plain_ident(&self) -> Option<&str> {
        match self {
            TypeExpr::Named {
                package: None,
                name,
                args,
            } if args.is_empty() => Some(name),
            _ => None,
        }
    }

    /// Visit every package qualifier in the expression.
    pub fn for_each_package(&self, f: &mut dyn FnMut(&PackageRef)) {
        match self {
            TypeExpr::Named { package, args, .. } => {
                if let Some(package) = package {
                    f(package);
                }
                for arg in args {
                    arg.for_each_package(f);
                }
            }
            TypeExpr::Pointer(inner)
            | TypeExpr::Slice(inner)
            | TypeExpr::Variadic(inner)
            | TypeExpr::Paren(inner) => inner.for_each_package(f),
            TypeExpr::Array { elem, .. } | TypeExpr::Chan { elem, .. } => {
                elem.for_each_package(f)
            }
            TypeExpr::Map { key, value } => {
                key.for_each_package(f);
                value.for_each_package(f);
            }
            TypeExpr::Func(signature) => signature.for_each_package(f),
            TypeExpr::Interface(elems) => {
                for elem in elems {
                    match elem {
                        InterfaceElem::Method { signature, .. } => signature.for_each_package(f),
                        InterfaceElem::Embedded(ty) => ty.for_each_package(f),
                        InterfaceElem::Union(terms) => {
                            for term in terms {
                                term.ty.for_each_package(f);
                            }
                        }
                    }
                }
            }
            TypeExpr::Struct(fields) => {
                for field in fields {
                    field.ty.for_each_package(f);
                }
            }
        }
    }

    /// Mutable counterpart of [`TypeExpr::for_each_package`].
    pub fn for_each_package_mut(&mut self, f: &mut dyn FnMut(&mut PackageRef)) {
        match self {
            TypeExpr::Named { package, args, .. } => {
                if let Some(package) = package {
                    f(package);
                }
                for arg in args {
                    arg.for_each_package_mut(f);
                }
            }
            TypeExpr::Pointer(inner)
            | TypeExpr::Slice(inner)
            | TypeExpr::Variadic(inner)
            | TypeExpr::Paren(inner) => inner.for_each_package_mut(f),
            TypeExpr::Array { elem, .. } | TypeExpr::Chan { elem, .. } => {
                elem.for_each_package_mut(f)
            }
            TypeExpr::Map { key, value } => {
                key.for_each_package_mut(f);
                value.for_each_package_mut(f);
            }
            TypeExpr::Func(signature) => {
                for field in signature.params.iter_mut().chain(signature.results.iter_mut()) {
                    field.ty.for_each_package_mut(f);
                }
            }
            TypeExpr::Interface(elems) => {
                for elem in elems {
                    match elem {
                        InterfaceElem::Method { signature, .. } => {
                            for field in
                                signature.params.iter_mut().chain(signature.results.iter_mut())
                            {
                                field.ty.for_each_package_mut(f);
                            }
                        }
                        InterfaceElem::Embedded(ty) => ty.for_each_package_mut(f),
                        InterfaceElem::Union(terms) => {
                            for term in terms {
                                term.ty.for_each_package_mut(f);
                            }
                        }
                    }
                }
            }
            TypeExpr::Struct(fields) => {
                for field in fields {
                    field.ty.for_each_package_mut(f);
                }
            }
        }
    }
}

impl Signature {
    fn for_each_package(&self, f: &mut dyn FnMut(&PackageRef)) {
        for field in self.params.iter().chain(self.results.iter()) {
            field.ty.for_each_package(f);
        }
    }
}
