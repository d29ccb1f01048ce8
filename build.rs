//! Generates the EC2 value objects from `res/ec2.json` through `res/model.rs.hbs`.
//!
//! Names, Rust types and accessor shapes are resolved here so the template only
//! has to loop and print.

use handlebars::{no_escape, Handlebars};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::path::PathBuf;
use std::{env, fs};

const SCHEMA: &str = "res/ec2.json";
const TEMPLATE: &str = "res/model.rs.hbs";

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

#[derive(Deserialize)]
struct Schema {
    version: String,
    enums: Vec<EnumDef>,
    shapes: Vec<ShapeDef>,
}

#[derive(Deserialize)]
struct EnumDef {
    name: String,
    #[serde(default)]
    doc: String,
    values: Vec<String>,
}

#[derive(Deserialize)]
struct ShapeDef {
    name: String,
    #[serde(default)]
    doc: String,
    action: Option<String>,
    output: Option<String>,
    #[serde(default)]
    fields: Vec<FieldDef>,
}

#[derive(Deserialize)]
struct FieldDef {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    list: bool,
    #[serde(default)]
    doc: String,
    query: Option<String>,
    xml: Option<String>,
}

#[derive(Serialize)]
struct Model {
    version: String,
    enums: Vec<EnumModel>,
    shapes: Vec<ShapeModel>,
    requests: Vec<RequestModel>,
}

#[derive(Serialize)]
struct EnumModel {
    name: String,
    doc: String,
    variants: Vec<VariantModel>,
}

#[derive(Serialize)]
struct VariantModel {
    ident: String,
    token: String,
    literal: String,
}

#[derive(Serialize)]
struct ShapeModel {
    name: String,
    doc: String,
    doc_literal: String,
    role: &'static str,
    is_request: bool,
    action: String,
    output: String,
    fields: Vec<FieldModel>,
}

#[derive(Serialize)]
struct FieldModel {
    name: String,
    ident: String,
    doc: String,
    doc_literal: String,
    elem_type: String,
    storage_type: String,
    getter_type: String,
    getter_suffix: &'static str,
    kind: String,
    query: String,
    xml: String,
    is_list: bool,
}

#[derive(Serialize)]
struct RequestModel {
    name: String,
    action: String,
}

enum Getter {
    Str,
    Copy,
    Ref,
}

fn primitive(ty: &str) -> Option<(&'static str, &'static str, Getter)> {
    match ty {
        "string" => Some(("String", "FieldKind::String", Getter::Str)),
        "integer" => Some(("i32", "FieldKind::Integer", Getter::Copy)),
        "long" => Some(("i64", "FieldKind::Long", Getter::Copy)),
        "double" => Some(("f64", "FieldKind::Double", Getter::Copy)),
        "boolean" => Some(("bool", "FieldKind::Boolean", Getter::Copy)),
        "timestamp" => Some(("DateTime<Utc>", "FieldKind::Timestamp", Getter::Copy)),
        _ => None,
    }
}

fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = if i == 0 { None } else { Some(chars[i - 1]) };
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => matches!(next, Some(n) if n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn variant_ident(token: &str) -> String {
    let ident: String = token
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| {
            let mut chars = s.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("V{ident}")
    } else {
        ident
    }
}

fn build_model(schema: Schema) -> Result<Model, Box<dyn Error>> {
    let enum_names: HashSet<&str> = schema.enums.iter().map(|e| e.name.as_str()).collect();
    let shape_names: HashSet<&str> = schema.shapes.iter().map(|s| s.name.as_str()).collect();
    let outputs: HashSet<&str> = schema.shapes.iter().filter_map(|s| s.output.as_deref()).collect();

    let mut enums = Vec::new();
    for e in &schema.enums {
        let mut seen = HashSet::new();
        let mut variants = Vec::new();
        for token in &e.values {
            let ident = variant_ident(token);
            if ident.is_empty() || ident == "Unknown" || !seen.insert(ident.clone()) {
                return Err(format!("{}: token {token:?} maps to unusable variant {ident:?}", e.name).into());
            }
            variants.push(VariantModel { ident, token: token.clone(), literal: format!("{token:?}") });
        }
        enums.push(EnumModel { name: e.name.clone(), doc: e.doc.clone(), variants });
    }

    let mut shapes = Vec::new();
    let mut requests = Vec::new();
    for s in &schema.shapes {
        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        for f in &s.fields {
            let ident = snake_case(&f.name);
            if KEYWORDS.contains(&ident.as_str()) || !seen.insert(ident.clone()) {
                return Err(format!("{}.{}: unusable field name {ident:?}", s.name, f.name).into());
            }
            let (elem_type, kind, getter) = match primitive(&f.ty) {
                Some((ty, kind, getter)) => (ty.to_string(), kind.to_string(), getter),
                None if enum_names.contains(f.ty.as_str()) => (
                    f.ty.clone(),
                    format!("FieldKind::Enum {{ name: {:?}, values: {}::VALUES }}", f.ty, f.ty),
                    Getter::Ref,
                ),
                None if shape_names.contains(f.ty.as_str()) => {
                    (f.ty.clone(), format!("FieldKind::Structure({:?})", f.ty), Getter::Ref)
                }
                None => return Err(format!("{}.{}: unknown type {:?}", s.name, f.name, f.ty).into()),
            };
            let (storage_type, getter_type, getter_suffix) = if f.list {
                (format!("Option<Vec<{elem_type}>>"), format!("Option<&[{elem_type}]>"), ".as_deref()")
            } else {
                match getter {
                    Getter::Str => (format!("Option<{elem_type}>"), "Option<&str>".to_string(), ".as_deref()"),
                    Getter::Copy => (format!("Option<{elem_type}>"), format!("Option<{elem_type}>"), ""),
                    Getter::Ref => (format!("Option<{elem_type}>"), format!("Option<&{elem_type}>"), ".as_ref()"),
                }
            };
            fields.push(FieldModel {
                name: f.name.clone(),
                ident,
                doc: f.doc.clone(),
                doc_literal: format!("{:?}", f.doc),
                elem_type,
                storage_type,
                getter_type,
                getter_suffix,
                kind,
                query: f.query.clone().unwrap_or_else(|| f.name.clone()),
                xml: f.xml.clone().unwrap_or_else(|| lower_camel(&f.name)),
                is_list: f.list,
            });
        }

        let (role, is_request) = match (&s.action, &s.output) {
            (Some(action), Some(output)) => {
                if !shape_names.contains(output.as_str()) {
                    return Err(format!("{}: unknown output shape {output:?}", s.name).into());
                }
                requests.push(RequestModel { name: s.name.clone(), action: action.clone() });
                ("Request", true)
            }
            (None, None) if outputs.contains(s.name.as_str()) => ("Output", false),
            (None, None) => ("Structure", false),
            _ => return Err(format!("{}: action and output go together", s.name).into()),
        };
        shapes.push(ShapeModel {
            name: s.name.clone(),
            doc: s.doc.clone(),
            doc_literal: format!("{:?}", s.doc),
            role,
            is_request,
            action: s.action.clone().unwrap_or_default(),
            output: s.output.clone().unwrap_or_default(),
            fields,
        });
    }

    Ok(Model { version: schema.version, enums, shapes, requests })
}

fn main() -> Result<(), Box<dyn Error>> {
    let root = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let schema: Schema = serde_json::from_str(&fs::read_to_string(root.join(SCHEMA))?)?;
    let template = fs::read_to_string(root.join(TEMPLATE))?;

    let mut hb = Handlebars::new();
    hb.register_escape_fn(no_escape);
    let model = build_model(schema)?;
    let out = hb.render_template(&template, &model)?;
    fs::write(PathBuf::from(env::var("OUT_DIR")?).join("model.rs"), out)?;

    println!("cargo:rerun-if-changed={SCHEMA}");
    println!("cargo:rerun-if-changed={TEMPLATE}");
    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
