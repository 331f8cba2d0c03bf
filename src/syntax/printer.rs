use std::fmt::{self, Write};

use super::ast::{ChanDir, Field, InterfaceElem, PackageRef, Signature, StructField, TypeExpr};

/// Prints type expressions the way gofmt lays them out on a single line.
///
/// `local_name` decides how a package qualifier is spelled; plain `Display`
/// keeps the name written in the source.
pub struct TypePrinter<'a> {
    local_name: &'a dyn Fn(&PackageRef) -> String,
}

impl<'a> TypePrinter<'a> {
    pub fn new(local_name: &'a dyn Fn(&PackageRef) -> String) -> Self {
        Self { local_name }
    }

    pub fn print(&self, ty: &TypeExpr) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_type(&mut out, ty);
        out
    }

    pub fn write_type(&self, out: &mut dyn Write, ty: &TypeExpr) -> fmt::Result {
        match ty {
            TypeExpr::Named {
                package,
                name,
                args,
            } => {
                if let Some(package) = package {
                    write!(out, "{}.", (self.local_name)(package))?;
                }
                out.write_str(name)?;
                if !args.is_empty() {
                    out.write_char('[')?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.write_str(", ")?;
                        }
                        self.write_type(out, arg)?;
                    }
                    out.write_char(']')?;
                }
                Ok(())
            }
            TypeExpr::Pointer(inner) => {
                out.write_char('*')?;
                self.write_type(out, inner)
            }
            TypeExpr::Slice(inner) => {
                out.write_str("[]")?;
                self.write_type(out, inner)
            }
            TypeExpr::Array { len, elem } => {
                write!(out, "[{len}]")?;
                self.write_type(out, elem)
            }
            TypeExpr::Map { key, value } => {
                out.write_str("map[")?;
                self.write_type(out, key)?;
                out.write_char(']')?;
                self.write_type(out, value)
            }
            TypeExpr::Chan { dir, elem } => {
                out.write_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                })?;
                self.write_type(out, elem)
            }
            TypeExpr::Func(signature) => {
                out.write_str("func")?;
                self.write_signature(out, signature)
            }
            TypeExpr::Interface(elems) => {
                if elems.is_empty() {
                    return out.write_str("interface{}");
                }
                out.write_str("interface{ ")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        out.write_str("; ")?;
                    }
                    self.write_interface_elem(out, elem)?;
                }
                out.write_str(" }")
            }
            TypeExpr::Struct(fields) => {
                if fields.is_empty() {
                    return out.write_str("struct{}");
                }
                out.write_str("struct{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        out.write_str("; ")?;
                    }
                    self.write_struct_field(out, field)?;
                }
                out.write_str(" }")
            }
            TypeExpr::Variadic(inner) => {
                out.write_str("...")?;
                self.write_type(out, inner)
            }
            TypeExpr::Paren(inner) => {
                out.write_char('(')?;
                self.write_type(out, inner)?;
                out.write_char(')')
            }
        }
    }

    fn write_signature(&self, out: &mut dyn Write, signature: &Signature) -> fmt::Result {
        out.write_char('(')?;
        self.write_fields(out, &signature.params)?;
        out.write_char(')')?;
        match signature.results.as_slice() {
            [] => Ok(()),
            [single] if single.names.is_empty() => {
                out.write_char(' ')?;
                self.write_type(out, &single.ty)
            }
            results => {
                out.write_str(" (")?;
                self.write_fields(out, results)?;
                out.write_char(')')
            }
        }
    }

    fn write_fields(&self, out: &mut dyn Write, fields: &[Field]) -> fmt::Result {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            if !field.names.is_empty() {
                write!(out, "{} ", field.names.join(", "))?;
            }
            self.write_type(out, &field.ty)?;
        }
        Ok(())
    }

    fn write_interface_elem(&self, out: &mut dyn Write, elem: &InterfaceElem) -> fmt::Result {
        match elem {
            InterfaceElem::Method { name, signature } => {
                out.write_str(name)?;
                self.write_signature(out, signature)
            }
            InterfaceElem::Embedded(ty) => self.write_type(out, ty),
            InterfaceElem::Union(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        out.write_str(" | ")?;
                    }
                    if term.tilde {
                        out.write_char('~')?;
                    }
                    self.write_type(out, &term.ty)?;
                }
                Ok(())
            }
        }
    }

    fn write_struct_field(&self, out: &mut dyn Write, field: &StructField) -> fmt::Result {
        if !field.names.is_empty() {
            write!(out, "{} ", field.names.join(", "))?;
        }
        self.write_type(out, &field.ty)?;
        if let Some(tag) = &field.tag {
            write!(out, " {tag}")?;
        }
        Ok(())
    }
}

fn source_name(package: &PackageRef) -> String {
    package.name.clone()
}

impl TypeExpr {
    /// Render with package qualifiers renamed through `local_name`.
    pub fn render_with(&self, local_name: &dyn Fn(&PackageRef) -> String) -> String {
        TypePrinter::new(local_name).print(self)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        TypePrinter::new(&source_name).write_type(f, self)
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_type_expr;
    use super::*;

    fn round_trip(src: &str) -> String {
        parse_type_expr(src).unwrap().to_string()
    }

    #[test]
    fn test_prints_composite_types() {
        assert_eq!(round_trip("[]*model.QueryResult"), "[]*model.QueryResult");
        assert_eq!(round_trip("map[string][]int"), "map[string][]int");
        assert_eq!(round_trip("[4]byte"), "[4]byte");
        assert_eq!(round_trip("<-chan  error"), "<-chan error");
        assert_eq!(round_trip("chan<- int"), "chan<- int");
        assert_eq!(round_trip("...FooSetter"), "...FooSetter");
        assert_eq!(round_trip("List[int, string]"), "List[int, string]");
    }

    #[test]
    fn test_prints_func_types() {
        assert_eq!(round_trip("func()"), "func()");
        assert_eq!(round_trip("func(int) error"), "func(int) error");
        assert_eq!(
            round_trip("func(a, b int) (n int, err error)"),
            "func(a, b int) (n int, err error)"
        );
    }

    #[test]
    fn test_prints_inline_struct_and_interface() {
        assert_eq!(round_trip("struct{}"), "struct{}");
        assert_eq!(
            round_trip("struct { A int; B string `json:\"b\"` }"),
            "struct{ A int; B string `json:\"b\"` }"
        );
        assert_eq!(round_trip("interface{}"), "interface{}");
        assert_eq!(
            round_trip("interface { Close() error }"),
            "interface{ Close() error }"
        );
    }

    #[test]
    fn test_render_with_renames_qualifiers() {
        let ty = parse_type_expr("map[http.Header]*http.Request").unwrap();
        let rendered = ty.render_with(&|package: &PackageRef| format!("{}2", package.name));
        assert_eq!(rendered, "map[http2.Header]*http2.Request");
    }
}
