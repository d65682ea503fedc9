//! Code generation for a typed configuration module.
//!
//! A single walk over the [`ConfigForest`] produces every section of the
//! output together, so each leaf gets exactly one constant, one struct
//! field, one registration and, unless it is a bool, one validation.

use envgen::{Error, Kind, Value};
use proc_macro2::{Ident, Literal, TokenStream};
use quote::{ToTokens, format_ident, quote};
use tracing::debug;

use crate::format::format_source;
use crate::naming::ident;
use crate::tree::{ConfigForest, ConfigNode, LeafInfo, NodeKind};

/// Names the generated module imports from the runtime crate.
const IMPORTED_NAMES: &[&str] = &["EnvError", "EnvSource", "ProcessEnv", "Registry"];

/// Header written above every generated module.
pub const GENERATED_HEADER: &str = "// @generated by envgen. Do not edit.\n";

/// Options for the generated module.
#[derive(Debug, Clone)]
pub struct SynthOptions {
    /// Path of the runtime crate as seen from the generated code.
    pub runtime_crate: String,
    /// Name of the top-level struct.
    pub root_struct: String,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            runtime_crate: "envgen_runtime".to_string(),
            root_struct: "Config".to_string(),
        }
    }
}

/// A generated module before formatting.
#[derive(Debug, Clone)]
pub struct GeneratedUnit {
    pub tokens: TokenStream,
    pub constants: usize,
    pub fields: usize,
    pub structs: usize,
    pub registrations: usize,
    pub validations: usize,
}

impl GeneratedUnit {
    /// Pretty-print the module with the generated-code header.
    pub fn render(&self) -> Result<String, Error> {
        let source = format_source(&self.tokens.to_string())?;
        Ok(format!("{GENERATED_HEADER}\n{source}"))
    }
}

/// Generate the configuration module for `forest`.
pub fn synthesize(forest: &ConfigForest, options: &SynthOptions) -> Result<GeneratedUnit, Error> {
    let rt: syn::Path = syn::parse_str(&options.runtime_crate)
        .map_err(|err| Error::invalid_name(&options.runtime_crate, format!("not a crate path: {err}")))?;
    let root: Ident = syn::parse_str(&options.root_struct)
        .map_err(|err| Error::invalid_name(&options.root_struct, format!("not a struct name: {err}")))?;
    if IMPORTED_NAMES.contains(&options.root_struct.as_str()) {
        return Err(Error::conflict(&options.root_struct, "root struct shadows a runtime import"));
    }
    if let Some((path, type_name)) = find_type(&forest.roots, &|name: &str| {
        name == options.root_struct || IMPORTED_NAMES.contains(&name)
    }) {
        return Err(Error::conflict(
            path,
            format!("section struct {type_name} clashes with the root struct or a runtime import"),
        ));
    }

    let mut emitter = Emitter {
        rt: quote!(#rt),
        consts: Vec::new(),
        structs: Vec::new(),
        registrations: Vec::new(),
        validations: Vec::new(),
        fields: 0,
    };
    let assembly = emitter.section(&root, &forest.roots);

    let Emitter {
        rt,
        consts,
        structs,
        registrations,
        validations,
        fields,
    } = emitter;
    debug!(
        constants = consts.len(),
        structs = structs.len(),
        validations = validations.len(),
        "synthesized configuration module"
    );

    let tokens = quote! {
        use #rt::{EnvError, EnvSource, ProcessEnv, Registry};

        #(#consts)*

        #(#structs)*

        /// Parse the configuration from the process environment into the global registry.
        pub fn parse() -> ::core::result::Result<#root, EnvError> {
            parse_from(&mut Registry::global(), &ProcessEnv)
        }

        /// Register every variable in `registry`, apply overrides from `env` and
        /// check that no non-bool field is left empty.
        pub fn parse_from(registry: &mut Registry, env: &dyn EnvSource) -> ::core::result::Result<#root, EnvError> {
            #(#registrations)*
            registry.parse_with(env)?;
            let cfg = #assembly;
            #(#validations)*
            ::core::result::Result::Ok(cfg)
        }
    };

    Ok(GeneratedUnit {
        tokens,
        constants: consts.len(),
        fields,
        structs: structs.len(),
        registrations: registrations.len(),
        validations: validations.len(),
    })
}

/// First section whose struct name is rejected by `taken`, as `(field, type name)`.
fn find_type<'a>(nodes: &'a [ConfigNode], taken: &dyn Fn(&str) -> bool) -> Option<(&'a str, &'a str)> {
    nodes.iter().find_map(|node| match &node.kind {
        NodeKind::Section { type_name, .. } if taken(type_name) => Some((node.field.as_str(), type_name.as_str())),
        NodeKind::Section { children, .. } => find_type(children, taken),
        NodeKind::Leaf(_) => None,
    })
}

struct Emitter {
    rt: TokenStream,
    consts: Vec<TokenStream>,
    structs: Vec<TokenStream>,
    registrations: Vec<TokenStream>,
    validations: Vec<TokenStream>,
    fields: usize,
}

impl Emitter {
    /// Emit the struct for one section and return the expression that builds it.
    fn section(&mut self, type_name: &Ident, nodes: &[ConfigNode]) -> TokenStream {
        // Parents are written before their sections.
        let slot = self.structs.len();
        self.structs.push(TokenStream::new());

        let mut fields = Vec::with_capacity(nodes.len());
        let mut inits = Vec::with_capacity(nodes.len());
        for node in nodes {
            let field = ident(&node.field);
            match &node.kind {
                NodeKind::Leaf(leaf) => {
                    let ty = self.field_type(leaf.kind());
                    fields.push(quote! { pub #field: #ty });
                    let handle = self.leaf(leaf);
                    inits.push(quote! { #field: registry.get(&#handle)? });
                }
                NodeKind::Section { type_name, children } => {
                    let ty = format_ident!("{}", type_name);
                    fields.push(quote! { pub #field: #ty });
                    let expr = self.section(&ty, children);
                    inits.push(quote! { #field: #expr });
                }
            }
        }

        self.structs[slot] = quote! {
            #[derive(Debug, Clone, PartialEq)]
            pub struct #type_name {
                #(#fields,)*
            }
        };
        quote! { #type_name { #(#inits,)* } }
    }

    /// Emit the constant, registration and validation for a leaf and return
    /// the handle binding.
    fn leaf(&mut self, leaf: &LeafInfo) -> Ident {
        let konst = format_ident!("{}", leaf.const_name);
        let env_name = &leaf.env_name;
        self.consts.push(quote! { pub const #konst: &str = #env_name; });

        let handle = format_ident!("{}", leaf.handle_name());
        let (method, default) = self.registration(&leaf.default);
        self.registrations
            .push(quote! { let #handle = registry.#method(#konst, #default); });

        let path: Vec<Ident> = leaf.path.iter().map(|segment| ident(segment)).collect();
        let access = quote! { cfg #(.#path)* };
        if let Some(check) = empty_check(leaf.kind(), access) {
            self.validations.push(quote! {
                if #check {
                    return ::core::result::Result::Err(EnvError::empty(#konst));
                }
            });
        }
        self.fields += 1;
        handle
    }

    fn field_type(&self, kind: Kind) -> TokenStream {
        let rt = &self.rt;
        match kind {
            Kind::Int => quote!(i64),
            Kind::Uint => quote!(u64),
            Kind::Float => quote!(f64),
            Kind::Bool => quote!(bool),
            Kind::Duration => quote!(::std::time::Duration),
            Kind::Url => quote!(::core::option::Option<#rt::url::Url>),
            Kind::String => quote!(::std::string::String),
            Kind::StringList => quote!(::std::vec::Vec<::std::string::String>),
        }
    }

    /// Registry method and default literal for a value.
    fn registration(&self, value: &Value) -> (Ident, TokenStream) {
        let rt = &self.rt;
        match value {
            Value::Int(v) => {
                let lit = Literal::u64_unsuffixed(v.unsigned_abs());
                let default = if *v < 0 { quote!(-#lit) } else { quote!(#lit) };
                (format_ident!("int_var"), default)
            }
            Value::Uint(v) => (format_ident!("uint_var"), Literal::u64_unsuffixed(*v).into_token_stream()),
            Value::Float(v) => (format_ident!("float_var"), float_literal(*v)),
            Value::Bool(v) => (format_ident!("bool_var"), quote!(#v)),
            Value::Duration(d) => {
                let secs = Literal::u64_unsuffixed(d.as_secs());
                let default = match d.subsec_nanos() {
                    0 => quote!(::std::time::Duration::from_secs(#secs)),
                    nanos => {
                        let nanos = Literal::u32_unsuffixed(nanos);
                        quote!(::std::time::Duration::new(#secs, #nanos))
                    }
                };
                (format_ident!("duration_var"), default)
            }
            Value::Url(Some(url)) => {
                let text = url.as_str();
                (format_ident!("url_var"), quote!(#rt::url::Url::parse(#text).ok()))
            }
            Value::Url(None) => (format_ident!("url_var"), quote!(::core::option::Option::None)),
            Value::String(s) => (format_ident!("string_var"), quote!(#s)),
            Value::StringList(items) => (
                format_ident!("strings_var"),
                quote!(::std::vec![#(::std::string::String::from(#items)),*]),
            ),
        }
    }
}

fn float_literal(v: f64) -> TokenStream {
    if v.is_nan() {
        quote!(f64::NAN)
    } else if v.is_infinite() {
        if v > 0.0 {
            quote!(f64::INFINITY)
        } else {
            quote!(f64::NEG_INFINITY)
        }
    } else {
        let lit = Literal::f64_unsuffixed(v.abs());
        if v.is_sign_negative() {
            quote!(-#lit)
        } else {
            quote!(#lit)
        }
    }
}

/// Condition that holds when a field still has its kind's empty value.
fn empty_check(kind: Kind, access: TokenStream) -> Option<TokenStream> {
    match kind {
        Kind::Bool => None,
        Kind::Int | Kind::Uint => Some(quote!(#access == 0)),
        Kind::Float => Some(quote!(#access == 0.0)),
        Kind::Duration => Some(quote!(#access.is_zero())),
        Kind::Url => Some(quote!(#access.is_none())),
        Kind::String | Kind::StringList => Some(quote!(#access.is_empty())),
    }
}
