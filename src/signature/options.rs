//! Functional-options convention: a trailing `opts ...FooOptionsSetter`
//! parameter stands for the fields of the `FooOptions` struct declared next
//! to the setter type.

use crate::error::GenerateError;
use crate::syntax::{PackageRef, StructField, TypeExpr};

use super::{OptionSetter, Qualifier};

/// Qualifier and options-struct name of a setter type `XSetter`.
///
/// The suffix must be a proper suffix; an empty suffix disables the
/// convention.
pub fn options_struct_name<'a>(
    ty: &'a TypeExpr,
    suffix: &str,
) -> Option<(Option<&'a PackageRef>, &'a str)> {
    if suffix.is_empty() {
        return None;
    }
    match ty {
        TypeExpr::Named {
            package,
            name,
            args,
        } if args.is_empty() => name
            .strip_suffix(suffix)
            .filter(|stem| !stem.is_empty())
            .map(|stem| (package.as_ref(), stem)),
        _ => None,
    }
}

/// One setter per field name, qualified relative to the options package.
pub(super) fn struct_setters(
    options_type: &str,
    fields: &[StructField],
    qualifier: &Qualifier,
) -> Result<Vec<OptionSetter>, GenerateError> {
    let mut setters = Vec::new();
    for field in fields {
        if field.names.is_empty() {
            return Err(GenerateError::UnsupportedOptionsField {
                options_type: options_type.to_string(),
                field: field.ty.to_string(),
            });
        }
        let ty = qualifier.qualify(&field.ty);
        setters.extend(field.names.iter().map(|name| OptionSetter {
            field: name.clone(),
            ty: ty.clone(),
        }));
    }
    Ok(setters)
}

/// Go expression producing one option setter from the request field.
///
/// `func(v T) func(*Opts) { return func(opts *Opts) { opts.F = v } }(req.param.F)`
pub fn setter_expression(field_type: &str, options_type: &str, field: &str, request_field: &str) -> String {
    format!(
        "func(v {field_type}) func(*{options_type}) {{ return func(opts *{options_type}) {{ opts.{field} = v }} }}(req.{request_field}.{field})"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_type_expr;

    #[test]
    fn test_options_struct_name() {
        let ty = parse_type_expr("SearchOptionsSetter").unwrap();
        let (package, name) = options_struct_name(&ty, "Setter").unwrap();
        assert!(package.is_none());
        assert_eq!(name, "SearchOptions");

        let ty = parse_type_expr("opts.ListSetter").unwrap();
        let (package, name) = options_struct_name(&ty, "Setter").unwrap();
        assert_eq!(package.unwrap().name, "opts");
        assert_eq!(name, "List");

        assert!(options_struct_name(&parse_type_expr("Setter").unwrap(), "Setter").is_none());
        assert!(options_struct_name(&parse_type_expr("*FooSetter").unwrap(), "Setter").is_none());
        assert!(options_struct_name(&parse_type_expr("FooSetter").unwrap(), "").is_none());
        assert!(options_struct_name(&parse_type_expr("FooOption").unwrap(), "Setter").is_none());
    }

    #[test]
    fn test_struct_setters_expand_field_groups() {
        let ty = parse_type_expr("struct{ A, B int; C Filter }").unwrap();
        let TypeExpr::Struct(fields) = ty else {
            panic!("expected struct");
        };
        let qualifier = Qualifier::new("api", "example.com/svc/api", &[]);
        let setters = struct_setters("api.SearchOptions", &fields, &qualifier).unwrap();
        let rendered: Vec<(String, String)> = setters
            .iter()
            .map(|s| (s.field.clone(), s.ty.to_string()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("A".to_string(), "int".to_string()),
                ("B".to_string(), "int".to_string()),
                ("C".to_string(), "api.Filter".to_string()),
            ]
        );
    }

    #[test]
    fn test_struct_setters_reject_embedded_fields() {
        let TypeExpr::Struct(fields) = parse_type_expr("struct{ A int; Base }").unwrap() else {
            panic!("expected struct");
        };
        let qualifier = Qualifier::new("api", "example.com/svc/api", &[]);
        let err = struct_setters("api.Opts", &fields, &qualifier).unwrap_err();
        assert_eq!(
            err,
            GenerateError::UnsupportedOptionsField {
                options_type: "api.Opts".into(),
                field: "Base".into()
            }
        );
    }

    #[test]
    fn test_setter_expression() {
        assert_eq!(
            setter_expression("int", "api.SearchOptions", "A", "opts"),
            "func(v int) func(*api.SearchOptions) { return func(opts *api.SearchOptions) { opts.A = v } }(req.opts.A)"
        );
    }
}
