use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, warn};

use super::options::{options_struct_name, struct_setters};
use super::{MethodSignature, OptionSetterExpansion, ParamKind, Parameter, Qualifier};
use crate::error::GenerateError;
use crate::package::{Package, PackageCache, SourceFile};
use crate::reference::InterfaceReference;
use crate::syntax::{Field, InterfaceElem, PackageRef, Signature, TypeExpr};

const PREDECLARED_INTERFACES: &[&str] = &["error", "any", "comparable"];

/// Flattens an interface into its method signatures.
///
/// Embedded interfaces are spliced in at their position, depth first. An
/// interface revisited while it is still being extracted is an
/// [`GenerateError::EmbedCycle`]. A method reached twice with the same
/// signature (diamond embedding) is kept once; with a different signature it
/// is a [`GenerateError::DuplicateMethod`].
pub struct Extractor<'c, 'l> {
    cache: &'c mut PackageCache<'l>,
    search_dir: PathBuf,
    options_suffix: String,
    stack: Vec<String>,
}

impl<'c, 'l> Extractor<'c, 'l> {
    pub fn new(
        cache: &'c mut PackageCache<'l>,
        search_dir: impl Into<PathBuf>,
        options_suffix: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            search_dir: search_dir.into(),
            options_suffix: options_suffix.into(),
            stack: Vec::new(),
        }
    }

    pub fn extract(&mut self, reference: &InterfaceReference) -> Result<Vec<MethodSignature>, GenerateError> {
        let mut methods = Vec::new();
        let search_dir = self.search_dir.clone();
        self.extract_named(&reference.import_path, &reference.name, &search_dir, &mut methods)?;
        if methods.is_empty() {
            // Only type-set elements: nothing to serve.
            let package = self.cache.load(&reference.import_path, &search_dir)?;
            return Err(GenerateError::EmptyInterface {
                import_path: package.import_path.clone(),
                name: reference.name.clone(),
            });
        }
        Ok(methods)
    }

    fn extract_named(
        &mut self,
        import_path: &str,
        name: &str,
        search_dir: &Path,
        out: &mut Vec<MethodSignature>,
    ) -> Result<(), GenerateError> {
        let package = self.cache.load(import_path, search_dir)?;
        let key = format!("{}.{}", package.import_path, name);
        if self.stack.contains(&key) {
            let mut chain = self.stack.clone();
            chain.push(key);
            return Err(GenerateError::EmbedCycle { chain });
        }

        let Some((file, spec)) = package.find_type(name) else {
            return Err(GenerateError::TypeNotFound {
                import_path: package.import_path.clone(),
                name: name.to_string(),
            });
        };
        let TypeExpr::Interface(elems) = &spec.ty else {
            return Err(GenerateError::NotAnInterface {
                import_path: package.import_path.clone(),
                name: name.to_string(),
            });
        };
        if !spec.type_params.is_empty() {
            return Err(GenerateError::GenericInterface {
                import_path: package.import_path.clone(),
                name: name.to_string(),
            });
        }
        if elems.is_empty() {
            return Err(GenerateError::EmptyInterface {
                import_path: package.import_path.clone(),
                name: name.to_string(),
            });
        }

        debug!(interface = %key, elements = elems.len(), "extracting interface");
        let mut qualifier = Qualifier::new(&package.name, &package.import_path, &file.ast.imports);
        self.stack.push(key);
        let result = self.extract_elems(&package, file, &mut qualifier, elems, out);
        self.stack.pop();
        result
    }

    fn extract_elems(
        &mut self,
        package: &Rc<Package>,
        file: &SourceFile,
        qualifier: &mut Qualifier,
        elems: &[InterfaceElem],
        out: &mut Vec<MethodSignature>,
    ) -> Result<(), GenerateError> {
        for elem in elems {
            match elem {
                InterfaceElem::Method { name, signature } => {
                    let method = self.method(package, qualifier, name, signature)?;
                    self.push_method(out, method)?;
                }
                InterfaceElem::Embedded(embedded) => {
                    self.extract_embedded(package, file, qualifier, embedded, out)?;
                }
                InterfaceElem::Union(_) => {
                    debug!(file = %file.path.display(), "ignoring type-set element");
                }
            }
        }
        Ok(())
    }

    fn extract_embedded(
        &mut self,
        package: &Rc<Package>,
        file: &SourceFile,
        qualifier: &mut Qualifier,
        embedded: &TypeExpr,
        out: &mut Vec<MethodSignature>,
    ) -> Result<(), GenerateError> {
        match embedded {
            TypeExpr::Paren(inner) => self.extract_embedded(package, file, qualifier, inner, out),
            TypeExpr::Interface(elems) => self.extract_elems(package, file, qualifier, elems, out),
            TypeExpr::Named {
                package: None,
                name,
                args,
            } if args.is_empty() && !PREDECLARED_INTERFACES.contains(&name.as_str()) => {
                self.extract_named(&package.import_path, name, &package.dir, out)
            }
            TypeExpr::Named {
                package: Some(selector),
                name,
                args,
            } if args.is_empty() => {
                let Some(import_path) = self.resolve_selector(package, qualifier, selector) else {
                    return Err(GenerateError::PackageNotFound {
                        import_path: selector.name.clone(),
                        reason: format!("no import of {} declares this package name", file.path.display()),
                    });
                };
                self.extract_named(&import_path, name, &package.dir, out)
            }
            _ => Err(GenerateError::UnsupportedEmbed {
                interface: self.stack.last().cloned().unwrap_or_default(),
                embed: embedded.to_string(),
            }),
        }
    }

    /// Import path of a selector qualifier, reading declared package names
    /// of unaliased imports when the default name does not match.
    fn resolve_selector(
        &mut self,
        package: &Package,
        qualifier: &mut Qualifier,
        selector: &PackageRef,
    ) -> Option<String> {
        if let Some(path) = &selector.path {
            return Some(path.clone());
        }
        if let Some(path) = qualifier.lookup(&selector.name) {
            return Some(path.to_string());
        }
        let candidates = qualifier.unaliased_imports().to_vec();
        for import_path in candidates {
            if let Some(declared) = self.cache.declared_name(&import_path, &package.dir) {
                qualifier.bind(declared.clone(), import_path.clone());
                if declared == selector.name {
                    return Some(import_path);
                }
            }
        }
        warn!(qualifier = %selector.name, package = %package.import_path, "cannot resolve package qualifier");
        None
    }

    fn bind_qualifiers(&mut self, package: &Package, qualifier: &mut Qualifier, fields: &[Field]) {
        for field in fields {
            for name in qualifier.unresolved(&field.ty) {
                self.resolve_selector(package, qualifier, &PackageRef::unbound(name));
            }
        }
    }

    fn method(
        &mut self,
        package: &Rc<Package>,
        qualifier: &mut Qualifier,
        name: &str,
        signature: &Signature,
    ) -> Result<MethodSignature, GenerateError> {
        self.bind_qualifiers(package, qualifier, &signature.params);
        self.bind_qualifiers(package, qualifier, &signature.results);

        let params = self.parameters(qualifier, &signature.params);
        let results = self.parameters(qualifier, &signature.results);
        let mut options = Vec::new();
        for param in params.iter().filter(|p| p.kind == ParamKind::Options) {
            options.push(self.expand_options(package, param)?);
        }

        debug!(method = name, params = params.len(), results = results.len(), "extracted method");
        Ok(MethodSignature {
            name: name.to_string(),
            params,
            results,
            options,
        })
    }

    fn parameters(&self, qualifier: &Qualifier, fields: &[Field]) -> Vec<Parameter> {
        let mut params = Vec::new();
        for field in fields {
            let ty = qualifier.qualify(&field.ty);
            let kind = ParamKind::classify(&ty, &self.options_suffix);
            if field.names.is_empty() {
                params.push(Parameter {
                    name: String::new(),
                    ty,
                    kind,
                });
                continue;
            }
            params.extend(field.names.iter().map(|name| Parameter {
                name: name.clone(),
                ty: ty.clone(),
                kind,
            }));
        }
        params
    }

    fn expand_options(
        &mut self,
        package: &Rc<Package>,
        param: &Parameter,
    ) -> Result<OptionSetterExpansion, GenerateError> {
        let TypeExpr::Variadic(setter) = &param.ty else {
            return Err(GenerateError::OptionsNotStruct {
                options_type: param.ty.to_string(),
            });
        };
        let Some((Some(setter_package), struct_name)) =
            options_struct_name(setter, &self.options_suffix)
        else {
            return Err(GenerateError::OptionsNotStruct {
                options_type: setter.to_string(),
            });
        };
        let Some(import_path) = setter_package.path.clone() else {
            return Err(GenerateError::PackageNotFound {
                import_path: setter_package.name.clone(),
                reason: format!("cannot resolve the package of {setter}"),
            });
        };

        let options_package = self.cache.load(&import_path, &package.dir)?;
        let options_type = TypeExpr::qualified(setter_package.clone(), struct_name);
        let Some((file, spec)) = options_package.find_type(struct_name) else {
            return Err(GenerateError::TypeNotFound {
                import_path,
                name: struct_name.to_string(),
            });
        };
        let TypeExpr::Struct(fields) = &spec.ty else {
            return Err(GenerateError::OptionsNotStruct {
                options_type: options_type.to_string(),
            });
        };

        let mut qualifier = Qualifier::new(
            &options_package.name,
            &options_package.import_path,
            &file.ast.imports,
        );
        for field in fields {
            for name in qualifier.unresolved(&field.ty) {
                self.resolve_selector(&options_package, &mut qualifier, &PackageRef::unbound(name));
            }
        }
        let setters = struct_setters(&options_type.to_string(), fields, &qualifier)?;
        debug!(options = %options_type, setters = setters.len(), "expanded options parameter");
        Ok(OptionSetterExpansion {
            param: param.name.clone(),
            options_type,
            setters,
        })
    }

    fn push_method(&self, out: &mut Vec<MethodSignature>, method: MethodSignature) -> Result<(), GenerateError> {
        let Some(existing) = out.iter().find(|m| m.name == method.name) else {
            out.push(method);
            return Ok(());
        };
        if types_of(&existing.params) == types_of(&method.params)
            && types_of(&existing.results) == types_of(&method.results)
        {
            debug!(method = %method.name, "skipping method reached through more than one embed");
            return Ok(());
        }
        Err(GenerateError::DuplicateMethod {
            interface: self.stack.last().cloned().unwrap_or_default(),
            method: method.name,
        })
    }
}

fn types_of(params: &[Parameter]) -> Vec<&TypeExpr> {
    params.iter().map(|p| &p.ty).collect()
}
