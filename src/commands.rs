use crate::config::{Config, OutputFormat};
use crate::prelude::*;
use crate::select::resolve;
use clap::{Args, Subcommand, ValueEnum};
use ec2_model::protocol::query::QueryRequest;
use ec2_model::protocol::xml::parse_response;
use ec2_model::registry::{self, visit_action, ActionVisitor, ShapeInfo, ACTIONS, SHAPES};
use ec2_model::request::ServiceRequest;
use ec2_model::value_object::{FieldDescriptor, FieldKind, ValueObject};
use itertools::Itertools;
use std::io::Read;
use std::path::PathBuf;

pub trait Executable {
    fn exec(&self) -> Result<()>;
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the shapes, or describe one
    Shapes(ShapesArgs),
    /// Read a request as JSON and print its Query encoding
    #[command(arg_required_else_help = true)]
    Encode(EncodeArgs),
    /// Parse an XML response into its result shape
    #[command(arg_required_else_help = true)]
    Decode(DecodeArgs),
    /// Print shell completions
    #[command(arg_required_else_help = true)]
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
pub struct ShapesArgs {
    /// Shape name, partial names are matched fuzzily
    pub name: Option<String>,
}

#[derive(Args)]
pub struct EncodeArgs {
    /// Action name (e.g. DescribeInstances, create-tags)
    pub action: String,
    /// JSON request file, stdin when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// Output format, defaults to the configured one
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Args)]
pub struct DecodeArgs {
    /// Action name the response belongs to
    pub action: String,
    /// XML response file
    pub file: PathBuf,
    /// Output format, defaults to the configured one (http falls back to text)
    #[arg(short, long, value_enum)]
    pub format: Option<DecodeFormat>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeFormat {
    /// Result rendering and request id
    Text,
    /// JSON members
    Json,
}

impl From<OutputFormat> for DecodeFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => DecodeFormat::Json,
            OutputFormat::Text | OutputFormat::Http => DecodeFormat::Text,
        }
    }
}

pub struct Shapes {
    shape: Option<&'static ShapeInfo>,
}

impl Shapes {
    pub fn new(ShapesArgs { name }: &ShapesArgs) -> Result<Self> {
        let shape = match name {
            Some(name) => {
                let names = SHAPES.iter().map(|s| s.name).collect_vec();
                let name = resolve("shape", name, &names)?;
                registry::shape(name)
            }
            None => None,
        };
        Ok(Self { shape })
    }
}

impl Executable for Shapes {
    fn exec(&self) -> Result<()> {
        match self.shape {
            Some(shape) => p!("{}", describe_shape(shape)),
            None => p!("{}", list_shapes()),
        }
        Ok(())
    }
}

fn list_shapes() -> String {
    let width = SHAPES.iter().map(|s| s.name.len()).max().unwrap_or(20);
    SHAPES
        .iter()
        .map(|s| f!("{:width$}  {:9}  {}", s.name, s.role.as_ref(), s.action.unwrap_or_default()).trim_end().to_string())
        .join("\n")
}

fn describe_field(field: &FieldDescriptor) -> String {
    let mut line = f!("{}: {}", field.name, field.type_label());
    if let FieldKind::Enum { values, .. } = field.kind {
        line += &f!(" ({})", values.join("|"));
    }
    line
}

fn describe_shape(shape: &ShapeInfo) -> String {
    let mut out = f!("{} ({})", shape.name, shape.role.as_ref());
    if let Some(action) = shape.action {
        out += &f!(", action {action}");
    }
    if !shape.doc.is_empty() {
        out += &f!("\n{}", shape.doc);
    }
    for field in shape.fields {
        out += &f!("\n  {}", describe_field(field));
        if !field.doc.is_empty() {
            out += &f!("\n      {}", field.doc);
        }
    }
    out
}

pub struct Encode {
    action: &'static str,
    input: String,
    format: OutputFormat,
    endpoint: String,
    api_version: String,
}

impl Encode {
    pub fn new(EncodeArgs { action, input, format }: &EncodeArgs, config: &Config) -> Result<Self> {
        let action = resolve("action", action, ACTIONS)?;
        let input = match input {
            Some(path) => std::fs::read_to_string(path).wrap_err(f!("can't read {path:?}"))?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf).wrap_err("can't read stdin")?;
                buf
            }
        };
        Ok(Self {
            action,
            input,
            format: format.unwrap_or(config.output),
            endpoint: config.endpoint_url(),
            api_version: config.api_version().to_string(),
        })
    }
}

impl Executable for Encode {
    fn exec(&self) -> Result<()> {
        let visitor = EncodeVisitor {
            input: &self.input,
            format: self.format,
            endpoint: &self.endpoint,
            api_version: &self.api_version,
        };
        p!("{}", visit_action(self.action, visitor)??);
        Ok(())
    }
}

pub struct Decode {
    action: &'static str,
    body: String,
    format: DecodeFormat,
}

impl Decode {
    pub fn new(DecodeArgs { action, file, format }: &DecodeArgs, config: &Config) -> Result<Self> {
        let action = resolve("action", action, ACTIONS)?;
        let format = format.unwrap_or_else(|| config.output.into());
        let body = std::fs::read_to_string(file).wrap_err(f!("can't read {file:?}"))?;
        Ok(Self { action, body, format })
    }
}

impl Executable for Decode {
    fn exec(&self) -> Result<()> {
        let visitor = DecodeVisitor { body: &self.body, format: self.format };
        p!("{}", visit_action(self.action, visitor)??);
        Ok(())
    }
}

pub struct EncodeVisitor<'a> {
    pub input: &'a str,
    pub format: OutputFormat,
    pub endpoint: &'a str,
    pub api_version: &'a str,
}

impl ActionVisitor for EncodeVisitor<'_> {
    type Output = Result<String>;

    fn visit<R: ServiceRequest>(self) -> Self::Output {
        let request: R = serde_json::from_str(self.input).wrap_err(f!("can't read {} from JSON", R::SHAPE))?;
        let query = QueryRequest::marshal(&request, self.api_version);
        let out = match self.format {
            OutputFormat::Text => {
                let params = query.params.iter().map(|(k, v)| f!("{k}={v}")).join("\n");
                f!("{request}\n{params}")
            }
            OutputFormat::Json => serde_json::to_string_pretty(&request)?,
            OutputFormat::Http => render_http(&query.to_http(self.endpoint)?),
        };
        Ok(out)
    }
}

fn render_http(request: &http::Request<String>) -> String {
    let headers = request
        .headers()
        .iter()
        .map(|(name, value)| f!("{name}: {}", value.to_str().unwrap_or("<binary>")))
        .join("\n");
    f!("{} {}\n{headers}\n\n{}", request.method(), request.uri(), request.body())
}

pub struct DecodeVisitor<'a> {
    pub body: &'a str,
    pub format: DecodeFormat,
}

impl ActionVisitor for DecodeVisitor<'_> {
    type Output = Result<String>;

    fn visit<R: ServiceRequest>(self) -> Self::Output {
        let response = parse_response::<R::Output>(self.body)
            .wrap_err(f!("can't read {} from XML", <R::Output as ValueObject>::SHAPE))?;
        let out = match self.format {
            DecodeFormat::Json => serde_json::to_string_pretty(&response.result)?,
            DecodeFormat::Text => match response.request_id {
                Some(id) => f!("{}\nrequestId: {id}", response.result),
                None => response.result.to_string(),
            },
        };
        Ok(out)
    }
}
